use num_complex::Complex32;
use std::path::{Path, PathBuf};

/// Common error type for the capture and correlation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PhaseError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("malformed capture: {0}")]
    MalformedCapture(String),
    #[error("malformed result record: {0}")]
    MalformedRecord(String),
    #[error("i/o failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PhaseError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type PhaseResult<T> = Result<T, PhaseError>;

/// Two equal-length, non-empty channels recorded over the same time window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPair {
    channel_a: Vec<Complex32>,
    channel_b: Vec<Complex32>,
}

impl ChannelPair {
    pub fn new(channel_a: Vec<Complex32>, channel_b: Vec<Complex32>) -> PhaseResult<Self> {
        if channel_a.is_empty() || channel_b.is_empty() {
            return Err(PhaseError::MalformedCapture("channel has no samples".into()));
        }
        if channel_a.len() != channel_b.len() {
            return Err(PhaseError::MalformedCapture(format!(
                "channel lengths differ ({} vs {})",
                channel_a.len(),
                channel_b.len()
            )));
        }
        Ok(Self {
            channel_a,
            channel_b,
        })
    }

    pub fn channel_a(&self) -> &[Complex32] {
        &self.channel_a
    }

    pub fn channel_b(&self) -> &[Complex32] {
        &self.channel_b
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channel_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel_a.is_empty()
    }
}
