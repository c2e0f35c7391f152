use crate::workflow::config::parse_size;
use num_complex::Complex32;
use phasecore::interface::artifact::{self, BYTES_PER_PAIR};
use phasecore::interface::{AcquisitionParams, ArtifactHandle, Capturer, Station};
use phasecore::math::StatsHelper;
use phasecore::telemetry::LogManager;
use phasecore::{ChannelPair, PhaseError, PhaseResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

/// Shape of the synthetic two-channel captures used for dry runs.
///
/// Both channels see the same wideband signal. Channel B is rotated by a
/// fixed offset plus the phase a cable delay adds at the station frequency,
/// so the expected result differs from station to station.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    pub phase_offset_deg: f64,
    pub cable_delay_ns: f64,
    /// Peak amplitude of uniform receiver noise, added to each channel independently.
    pub noise: f32,
    pub seed: u64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            phase_offset_deg: 37.0,
            cable_delay_ns: 0.0,
            noise: 0.0,
            seed: 0,
        }
    }
}

impl SyntheticProfile {
    /// Phase of channel B relative to channel A for a station.
    pub fn expected_phase(&self, station: &Station) -> f64 {
        let delay_deg = 360.0 * station.frequency.hz() as f64 * self.cable_delay_ns * 1e-9;
        StatsHelper::wrap_degrees(self.phase_offset_deg + delay_deg)
    }
}

fn uniform(rng: &mut StdRng, amplitude: f32) -> Complex32 {
    if amplitude > 0.0 {
        Complex32::new(
            rng.gen_range(-amplitude..amplitude),
            rng.gen_range(-amplitude..amplitude),
        )
    } else {
        Complex32::new(0.0, 0.0)
    }
}

/// Builds the channel pair a station would produce under `profile`.
pub fn build_channel_pair(
    profile: &SyntheticProfile,
    station: &Station,
    samples: usize,
) -> PhaseResult<ChannelPair> {
    let mut rng = StdRng::seed_from_u64(profile.seed ^ station.frequency.hz());
    let rotation = Complex32::from_polar(1.0, profile.expected_phase(station).to_radians() as f32);
    let noise = profile.noise.abs();

    let mut channel_a = Vec::with_capacity(samples);
    let mut channel_b = Vec::with_capacity(samples);
    for _ in 0..samples {
        let common = uniform(&mut rng, 1.0);
        channel_a.push(common + uniform(&mut rng, noise));
        channel_b.push(common * rotation + uniform(&mut rng, noise));
    }

    ChannelPair::new(channel_a, channel_b)
}

/// Capturer that writes synthetic artifacts instead of driving the radio.
///
/// Artifacts are sized from `file_size` like the real tool's, rounded down to
/// whole two-channel sample pairs.
pub struct SyntheticCapturer {
    profile: SyntheticProfile,
    output: PathBuf,
    captures: usize,
    logger: LogManager,
}

impl SyntheticCapturer {
    pub fn new(profile: SyntheticProfile, output: impl Into<PathBuf>) -> Self {
        Self {
            profile,
            output: output.into(),
            captures: 0,
            logger: LogManager::new("synthetic"),
        }
    }

    #[cfg(test)]
    pub fn captures(&self) -> usize {
        self.captures
    }
}

impl Capturer for SyntheticCapturer {
    fn capture(
        &mut self,
        station: &Station,
        params: &AcquisitionParams,
    ) -> PhaseResult<ArtifactHandle> {
        let samples = parse_size(&params.file_size)? as usize / BYTES_PER_PAIR;
        let pair = build_channel_pair(&self.profile, station, samples)?;
        fs::write(&self.output, artifact::interleave(&pair))
            .map_err(|err| PhaseError::io(&self.output, err))?;
        self.captures += 1;
        self.logger.detail(&format!(
            "synthetic capture #{} for {} ({} samples per channel, expected {:.4} deg)",
            self.captures,
            station,
            pair.len(),
            self.profile.expected_phase(station)
        ));
        Ok(ArtifactHandle::new(&self.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasecore::processing::CrossCorrelator;

    fn station(freq: &str) -> Station {
        Station::new(freq.parse().unwrap(), "TEST")
    }

    fn params(file_size: &str) -> AcquisitionParams {
        AcquisitionParams {
            warmup: 0,
            decimation: 8,
            lna_state: 4,
            file_size: file_size.into(),
        }
    }

    #[test]
    fn generator_builds_requested_sample_count() {
        let pair =
            build_channel_pair(&SyntheticProfile::default(), &station("88.1"), 1024).unwrap();
        assert_eq!(pair.len(), 1024);
    }

    #[test]
    fn generator_is_deterministic_per_station() {
        let profile = SyntheticProfile {
            noise: 0.2,
            seed: 5,
            ..Default::default()
        };
        let first = build_channel_pair(&profile, &station("90.9"), 256).unwrap();
        let again = build_channel_pair(&profile, &station("90.9"), 256).unwrap();
        let other = build_channel_pair(&profile, &station("91.1"), 256).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn cable_delay_shifts_phase_with_frequency() {
        let profile = SyntheticProfile {
            phase_offset_deg: 0.0,
            cable_delay_ns: 1.0,
            ..Default::default()
        };
        // 100 MHz * 1 ns = 0.1 cycle.
        assert!((profile.expected_phase(&station("100")) - 36.0).abs() < 1e-9);
        // 600 MHz * 1 ns = 0.6 cycle, wrapped.
        assert!((profile.expected_phase(&station("600")) + 144.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_capture_still_recovers_phase() {
        let profile = SyntheticProfile {
            phase_offset_deg: -121.0,
            noise: 0.3,
            seed: 42,
            ..Default::default()
        };
        let target = station("94.7");
        let pair = build_channel_pair(&profile, &target, 4096).unwrap();
        let estimate = CrossCorrelator::new().estimate(&pair);
        assert_eq!(estimate.lag, 0);
        assert!((estimate.phase_degrees - profile.expected_phase(&target)).abs() < 2.0);
    }

    #[test]
    fn capturer_overwrites_artifact_at_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("duo.wav");
        fs::write(&output, vec![0u8; 99_999]).unwrap();

        let mut capturer = SyntheticCapturer::new(SyntheticProfile::default(), &output);
        let handle = capturer.capture(&station("101.1"), &params("64k")).unwrap();

        assert_eq!(handle.path(), output.as_path());
        assert_eq!(fs::metadata(&output).unwrap().len(), 65_536);
        assert_eq!(capturer.captures(), 1);
    }

    #[test]
    fn undersized_request_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let mut capturer =
            SyntheticCapturer::new(SyntheticProfile::default(), dir.path().join("duo.wav"));
        let err = capturer.capture(&station("101.1"), &params("8")).unwrap_err();
        assert!(matches!(err, PhaseError::MalformedCapture(_)));
    }
}
