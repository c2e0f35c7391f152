//! Raw capture artifact codec.
//!
//! The capture tool writes interleaved little-endian complex64 samples with
//! no header: `[Ia Qa][Ib Qb][Ia Qa][Ib Qb]...`, each scalar an `f32`.
//! Sample `k` of the file belongs to channel `k mod 2`.

use crate::prelude::{ChannelPair, PhaseError, PhaseResult};
use log::debug;
use num_complex::Complex32;
use std::fs;
use std::path::Path;

/// One complex sample: 4-byte real followed by 4-byte imaginary.
pub const BYTES_PER_SAMPLE: usize = 8;
/// One sample of each channel.
pub const BYTES_PER_PAIR: usize = 2 * BYTES_PER_SAMPLE;

/// Reads a capture artifact from disk and splits it into its two channels.
pub fn load_channel_pair(path: &Path) -> PhaseResult<ChannelPair> {
    let bytes = fs::read(path).map_err(|err| PhaseError::io(path, err))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    deinterleave(&bytes)
}

/// Splits interleaved two-channel bytes by even/odd sample position.
pub fn deinterleave(bytes: &[u8]) -> PhaseResult<ChannelPair> {
    if bytes.is_empty() {
        return Err(PhaseError::MalformedCapture("capture is empty".into()));
    }
    if bytes.len() % BYTES_PER_PAIR != 0 {
        return Err(PhaseError::MalformedCapture(format!(
            "{} bytes is not a whole number of {}-byte two-channel sample pairs",
            bytes.len(),
            BYTES_PER_PAIR
        )));
    }

    let pairs = bytes.len() / BYTES_PER_PAIR;
    let mut channel_a = Vec::with_capacity(pairs);
    let mut channel_b = Vec::with_capacity(pairs);

    for (k, chunk) in bytes.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
        let re = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let im = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        let sample = Complex32::new(re, im);
        if k % 2 == 0 {
            channel_a.push(sample);
        } else {
            channel_b.push(sample);
        }
    }

    ChannelPair::new(channel_a, channel_b)
}

/// Interleaves a channel pair back into the artifact byte layout.
pub fn interleave(pair: &ChannelPair) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pair.len() * BYTES_PER_PAIR);
    for (a, b) in pair.channel_a().iter().zip(pair.channel_b()) {
        for sample in [a, b] {
            bytes.extend_from_slice(&sample.re.to_le_bytes());
            bytes.extend_from_slice(&sample.im.to_le_bytes());
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_bytes(values: &[(f32, f32)]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|(re, im)| {
                let mut raw = re.to_le_bytes().to_vec();
                raw.extend_from_slice(&im.to_le_bytes());
                raw
            })
            .collect()
    }

    #[test]
    fn deinterleave_assigns_even_and_odd_samples() {
        let bytes = sample_bytes(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)]);
        let pair = deinterleave(&bytes).unwrap();
        assert_eq!(
            pair.channel_a(),
            &[Complex32::new(1.0, 2.0), Complex32::new(5.0, 6.0)]
        );
        assert_eq!(
            pair.channel_b(),
            &[Complex32::new(3.0, 4.0), Complex32::new(7.0, 8.0)]
        );
    }

    #[test]
    fn odd_sample_count_is_malformed() {
        let bytes = sample_bytes(&[(1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        let err = deinterleave(&bytes).unwrap_err();
        assert!(matches!(err, PhaseError::MalformedCapture(_)));
    }

    #[test]
    fn empty_or_ragged_capture_is_malformed() {
        assert!(matches!(
            deinterleave(&[]),
            Err(PhaseError::MalformedCapture(_))
        ));
        assert!(matches!(
            deinterleave(&[0u8; 20]),
            Err(PhaseError::MalformedCapture(_))
        ));
    }

    #[test]
    fn load_reads_artifact_from_disk() {
        let original = ChannelPair::new(
            vec![Complex32::new(0.25, -0.5), Complex32::new(1.5, 2.5)],
            vec![Complex32::new(-1.0, 0.0), Complex32::new(0.0, -3.0)],
        )
        .unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&interleave(&original)).unwrap();

        let loaded = load_channel_pair(file.path()).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_channel_pair(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, PhaseError::Io { .. }));
    }
}
