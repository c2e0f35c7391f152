use std::sync::Mutex;

/// Counters accumulated over one collection run.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub stations_processed: usize,
    pub samples_analyzed: usize,
    pub aborts: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    /// Counts one recorded station and the samples per channel behind it.
    pub fn record_station(&self, samples: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stations_processed += 1;
            metrics.samples_analyzed += samples;
        }
    }

    pub fn record_abort(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.aborts += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
