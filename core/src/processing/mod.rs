pub mod buffer_pool;
pub mod correlator;

pub use buffer_pool::BufferPool;
pub use correlator::{CrossCorrelator, PeakEstimate};
