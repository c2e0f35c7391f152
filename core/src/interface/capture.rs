use crate::interface::station::Station;
use crate::prelude::PhaseResult;
use std::path::{Path, PathBuf};

/// Master rate of the dual tuner before decimation.
pub const BASE_SAMPLE_RATE_HZ: f64 = 2_000_000.0;

/// Acquisition settings passed unchanged to every capture of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionParams {
    /// Seconds the radio runs before samples are kept.
    pub warmup: u32,
    pub decimation: u32,
    pub lna_state: u8,
    /// Requested artifact size, in the capture tool's notation (`1048576`, `10M`).
    pub file_size: String,
}

impl AcquisitionParams {
    pub fn sample_rate(&self) -> f64 {
        BASE_SAMPLE_RATE_HZ / self.decimation.max(1) as f64
    }

    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate()
    }
}

/// Location of a finished capture artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    path: PathBuf,
}

impl ArtifactHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Capability that produces one two-channel capture per station.
///
/// `capture` must block until the artifact is complete; the loader reads it
/// straight after the call returns.
pub trait Capturer {
    /// One-off startup check run before any station is processed.
    fn preflight(&mut self) -> PhaseResult<()> {
        Ok(())
    }

    fn capture(
        &mut self,
        station: &Station,
        params: &AcquisitionParams,
    ) -> PhaseResult<ArtifactHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_follows_decimation() {
        let params = AcquisitionParams {
            warmup: 2,
            decimation: 8,
            lna_state: 4,
            file_size: "1M".into(),
        };
        assert_eq!(params.sample_rate(), 250_000.0);
        assert!((params.sample_period() - 4e-6).abs() < 1e-15);
    }
}
