//! Fourier-domain cross-correlation of the two capture channels.
//!
//! ```text
//! c = fftshift( IFFT( conj(FFT(A)) * FFT(B) ) )
//! ```
//!
//! `c[N/2]` is zero lag. The complex value at the magnitude peak carries the
//! phase of channel B relative to channel A; no padding is applied, so the
//! correlation is circular over the capture length.

use crate::math::fft::{fft_shift, FftHelper};
use crate::math::stats::StatsHelper;
use crate::prelude::{ChannelPair, PhaseResult};
use crate::processing::buffer_pool::BufferPool;
use crate::telemetry::log::LogManager;
use num_complex::{Complex32, Complex64};

/// Location and phase of the correlation peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakEstimate {
    /// Index into the centred correlation sequence, in `[0, len)`.
    pub index: usize,
    /// Samples by which channel B trails channel A.
    pub lag: isize,
    pub magnitude: f64,
    /// Phase at the peak in degrees, in (-180, 180].
    pub phase_degrees: f64,
    /// Length of the correlation sequence.
    pub len: usize,
}

impl PeakEstimate {
    pub fn delay_seconds(&self, sample_period: f64) -> f64 {
        self.lag as f64 * sample_period
    }
}

/// Cross-correlation engine. Keeps FFT plans and spectrum buffers between
/// captures of the same length.
pub struct CrossCorrelator {
    fft: FftHelper,
    pool: BufferPool<Complex64>,
    logger: LogManager,
}

impl CrossCorrelator {
    pub fn new() -> Self {
        Self {
            fft: FftHelper::new(),
            pool: BufferPool::with_capacity(2),
            logger: LogManager::new("correlator"),
        }
    }

    /// Centred correlation sequence of the pair; zero lag sits at `len / 2`.
    pub fn correlate(&mut self, pair: &ChannelPair) -> Vec<Complex64> {
        let n = pair.len();

        let mut spectrum_a = self.pool.checkout(n);
        widen_into(pair.channel_a(), &mut spectrum_a);
        self.fft.forward(&mut spectrum_a);

        let mut cross = self.pool.checkout(n);
        widen_into(pair.channel_b(), &mut cross);
        self.fft.forward(&mut cross);

        for (b, a) in cross.iter_mut().zip(&spectrum_a) {
            *b *= a.conj();
        }
        self.pool.release(spectrum_a);

        self.fft.inverse(&mut cross);
        fft_shift(&mut cross);
        cross
    }

    /// Locates the peak-magnitude lag and the phase angle found there.
    pub fn estimate(&mut self, pair: &ChannelPair) -> PeakEstimate {
        let correlation = self.correlate(pair);
        let len = correlation.len();
        let centre = len / 2;

        let (index, magnitude) =
            StatsHelper::peak(&correlation, centre).unwrap_or((centre, 0.0));
        let phase_degrees = StatsHelper::wrap_degrees(correlation[index].arg().to_degrees());
        self.pool.release(correlation);

        let estimate = PeakEstimate {
            index,
            lag: index as isize - centre as isize,
            magnitude,
            phase_degrees,
            len,
        };
        self.logger.detail(&format!(
            "peak index {} lag {} magnitude {:.6e} phase {:.4} deg",
            estimate.index, estimate.lag, estimate.magnitude, estimate.phase_degrees
        ));
        estimate
    }

    /// Rotates channel B back by `phase_degrees` and re-measures the phase.
    ///
    /// A correct estimate leaves a residual close to zero.
    pub fn residual_after_derotation(
        &mut self,
        pair: &ChannelPair,
        phase_degrees: f64,
    ) -> PhaseResult<f64> {
        let rotation = Complex32::from_polar(1.0, -phase_degrees.to_radians() as f32);
        let derotated: Vec<Complex32> = pair.channel_b().iter().map(|b| b * rotation).collect();
        let check = ChannelPair::new(pair.channel_a().to_vec(), derotated)?;
        Ok(self.estimate(&check).phase_degrees)
    }
}

impl Default for CrossCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

fn widen_into(samples: &[Complex32], buffer: &mut [Complex64]) {
    for (slot, sample) in buffer.iter_mut().zip(samples) {
        *slot = Complex64::new(sample.re as f64, sample.im as f64);
    }
}
