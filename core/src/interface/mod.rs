pub mod artifact;
pub mod capture;
pub mod record;
pub mod station;

pub use artifact::{deinterleave, interleave, load_channel_pair};
pub use capture::{AcquisitionParams, ArtifactHandle, Capturer};
pub use record::{CorrelationResult, ResultLog};
pub use station::{Frequency, Station};
