//! Correlation core for the dual-channel phase-offset collector.
//!
//! Loads interleaved two-channel captures, cross-correlates the channels in the
//! Fourier domain and appends the phase found at the correlation peak to a
//! durable result log.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{ChannelPair, PhaseError, PhaseResult};
