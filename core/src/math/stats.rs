use num_complex::Complex64;

/// Magnitudes within this fraction of the maximum count as the same peak.
const PEAK_TOLERANCE: f64 = 1e-6;

pub struct StatsHelper;

impl StatsHelper {
    /// Index and magnitude of the maximum-magnitude value.
    ///
    /// A flat top (a pure tone correlates to equal magnitude at every lag)
    /// resolves to the candidate nearest `centre`; remaining ties go to the
    /// lower index.
    pub fn peak(values: &[Complex64], centre: usize) -> Option<(usize, f64)> {
        let max = values.iter().map(|value| value.norm()).reduce(f64::max)?;
        let floor = max - max * PEAK_TOLERANCE;
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx, value.norm()))
            .filter(|&(_, magnitude)| magnitude >= floor)
            .min_by_key(|&(idx, _)| idx.abs_diff(centre))
    }

    /// Maps an angle in degrees onto (-180, 180].
    pub fn wrap_degrees(angle: f64) -> f64 {
        let wrapped = angle % 360.0;
        if wrapped <= -180.0 {
            wrapped + 360.0
        } else if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }
}
