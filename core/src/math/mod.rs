pub mod fft;
pub mod stats;

pub use fft::{fft_shift, FftHelper};
pub use stats::StatsHelper;
