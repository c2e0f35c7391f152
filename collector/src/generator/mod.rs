pub mod profile;

pub use profile::{SyntheticCapturer, SyntheticProfile};
