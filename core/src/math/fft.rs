use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Helper that wraps the `rustfft` planner for reuse across captures.
///
/// Plans are built lazily and rebuilt only when the transform length changes,
/// so consecutive captures of the same size share one forward/inverse pair.
pub struct FftHelper {
    planner: FftPlanner<f64>,
    forward: Option<Arc<dyn Fft<f64>>>,
    inverse: Option<Arc<dyn Fft<f64>>>,
    scratch: Vec<Complex64>,
}

impl FftHelper {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            forward: None,
            inverse: None,
            scratch: Vec::new(),
        }
    }

    /// Length the cached plans were built for, if any.
    pub fn planned_len(&self) -> Option<usize> {
        self.forward.as_ref().map(|fft| fft.len())
    }

    fn prepare(&mut self, size: usize) {
        if self.planned_len() == Some(size) {
            return;
        }
        let forward = self.planner.plan_fft_forward(size);
        let inverse = self.planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        self.scratch = vec![Complex64::zero(); scratch_len];
        self.forward = Some(forward);
        self.inverse = Some(inverse);
    }

    /// Unnormalised forward transform, in place.
    pub fn forward(&mut self, buffer: &mut [Complex64]) {
        self.prepare(buffer.len());
        if let Some(fft) = &self.forward {
            fft.process_with_scratch(buffer, &mut self.scratch);
        }
    }

    /// Inverse transform scaled by `1/N`, in place.
    pub fn inverse(&mut self, buffer: &mut [Complex64]) {
        self.prepare(buffer.len());
        if let Some(fft) = &self.inverse {
            fft.process_with_scratch(buffer, &mut self.scratch);
        }
        let scale = 1.0 / buffer.len() as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
    }
}

impl Default for FftHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotates `buffer` so that index 0 lands at `len / 2` (zero lag centred).
pub fn fft_shift<T>(buffer: &mut [T]) {
    let mid = buffer.len() / 2;
    buffer.rotate_right(mid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_helper_round_trips_impulse() {
        let mut helper = FftHelper::new();
        let mut buffer = vec![Complex64::zero(); 8];
        buffer[3] = Complex64::new(1.0, 0.0);

        helper.forward(&mut buffer);
        assert!(buffer.iter().all(|c| (c.norm() - 1.0).abs() < 1e-12));

        helper.inverse(&mut buffer);
        assert!((buffer[3].re - 1.0).abs() < 1e-12);
        assert!(buffer[0].norm() < 1e-12);
    }

    #[test]
    fn fft_helper_replans_on_length_change() {
        let mut helper = FftHelper::new();
        assert_eq!(helper.planned_len(), None);
        helper.forward(&mut vec![Complex64::zero(); 16]);
        assert_eq!(helper.planned_len(), Some(16));
        helper.forward(&mut vec![Complex64::zero(); 5]);
        assert_eq!(helper.planned_len(), Some(5));
    }

    #[test]
    fn fft_shift_centres_index_zero() {
        let mut even = vec![0, 1, 2, 3, 4, 5];
        fft_shift(&mut even);
        assert_eq!(even, vec![3, 4, 5, 0, 1, 2]);

        let mut odd = vec![0, 1, 2, 3, 4];
        fft_shift(&mut odd);
        assert_eq!(odd, vec![3, 4, 0, 1, 2]);
    }
}
