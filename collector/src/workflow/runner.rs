use crate::workflow::config::Settings;
use anyhow::Context;
use phasecore::interface::{load_channel_pair, Capturer, CorrelationResult, ResultLog, Station};
use phasecore::processing::CrossCorrelator;
use phasecore::telemetry::{LogManager, Metrics, MetricsRecorder};
use phasecore::PhaseResult;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;

/// Largest phase left after derotating channel B before a verify warning.
const RESIDUAL_TOLERANCE_DEG: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Preparing,
    PerStationCapture,
    PerStationAnalyze,
    PerStationRecord,
    Done,
    Aborted,
}

impl RunState {
    fn describe(self) -> &'static str {
        match self {
            RunState::Idle => "startup checks",
            RunState::Preparing => "preparation",
            RunState::PerStationCapture => "capture",
            RunState::PerStationAnalyze => "analysis",
            RunState::PerStationRecord => "recording",
            RunState::Done => "completion",
            RunState::Aborted => "abort",
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// Records appended by this run, in processing order.
    pub results: Vec<CorrelationResult>,
    /// Records the result log already held when the run started.
    pub prior_records: usize,
    pub metrics: Metrics,
}

/// Sequential capture → correlate → record loop over a shuffled station list.
pub struct Runner<C> {
    settings: Settings,
    capturer: C,
    results_path: PathBuf,
    correlator: CrossCorrelator,
    metrics: MetricsRecorder,
    logger: LogManager,
    state: RunState,
}

impl<C: Capturer> Runner<C> {
    pub fn new(settings: Settings, capturer: C, results_path: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            capturer,
            results_path: results_path.into(),
            correlator: CrossCorrelator::new(),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("runner"),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    #[cfg(test)]
    pub fn capturer(&self) -> &C {
        &self.capturer
    }

    /// Processes every station once. The first failure ends the run.
    pub fn execute<R: Rng + ?Sized>(
        &mut self,
        stations: Vec<Station>,
        rng: &mut R,
    ) -> anyhow::Result<RunReport> {
        self.state = RunState::Idle;
        match self.run_stations(stations, rng) {
            Ok(report) => {
                self.state = RunState::Done;
                self.logger.record(&format!(
                    "run complete: {} stations, {} samples per channel analysed",
                    report.metrics.stations_processed, report.metrics.samples_analyzed
                ));
                Ok(report)
            }
            Err(err) => {
                self.state = RunState::Aborted;
                self.metrics.record_abort();
                self.logger.caution(&format!("run aborted: {:#}", err));
                Err(err)
            }
        }
    }

    fn run_stations<R: Rng + ?Sized>(
        &mut self,
        mut stations: Vec<Station>,
        rng: &mut R,
    ) -> anyhow::Result<RunReport> {
        self.capturer
            .preflight()
            .context("checking capture tool before the first station")?;

        self.state = RunState::Preparing;
        stations.shuffle(rng);
        let prior_records = self.prior_records();
        let mut log = ResultLog::open(&self.results_path)
            .with_context(|| format!("opening result log {}", self.results_path.display()))?;
        self.logger.record(&format!(
            "processing {} stations at {:.0} Hz sample rate; {} holds {} earlier records",
            stations.len(),
            self.settings.acquisition.sample_rate(),
            self.results_path.display(),
            prior_records
        ));

        let total = stations.len();
        let mut results = Vec::with_capacity(total);
        for (position, station) in stations.iter().enumerate() {
            let result = self.process_station(station, &mut log).with_context(|| {
                format!(
                    "station {} ({} of {}) failed during {}",
                    station,
                    position + 1,
                    total,
                    self.state.describe()
                )
            })?;
            results.push(result);
        }

        Ok(RunReport {
            results,
            prior_records,
            metrics: self.metrics.snapshot(),
        })
    }

    fn process_station(
        &mut self,
        station: &Station,
        log: &mut ResultLog,
    ) -> PhaseResult<CorrelationResult> {
        self.state = RunState::PerStationCapture;
        let handle = self.capturer.capture(station, &self.settings.acquisition)?;

        self.state = RunState::PerStationAnalyze;
        let pair = load_channel_pair(handle.path())?;
        let estimate = self.correlator.estimate(&pair);
        self.logger.record(&format!(
            "{} -> {:.4} deg (peak lag {} samples, {:.3e} s)",
            station,
            estimate.phase_degrees,
            estimate.lag,
            estimate.delay_seconds(self.settings.acquisition.sample_period())
        ));
        if self.settings.verify {
            let residual = self
                .correlator
                .residual_after_derotation(&pair, estimate.phase_degrees)?;
            if residual.abs() > RESIDUAL_TOLERANCE_DEG {
                self.logger.caution(&format!(
                    "{} residual {:.6} deg after derotation",
                    station, residual
                ));
            } else {
                self.logger
                    .detail(&format!("{} residual {:.6} deg", station, residual));
            }
        }

        self.state = RunState::PerStationRecord;
        let result = CorrelationResult::new(station.frequency.clone(), estimate.phase_degrees);
        log.append(&result)?;
        self.metrics.record_station(pair.len());
        Ok(result)
    }

    fn prior_records(&self) -> usize {
        if !self.results_path.exists() {
            return 0;
        }
        match ResultLog::read(&self.results_path) {
            Ok(records) => records.len(),
            Err(err) => {
                self.logger
                    .caution(&format!("could not count earlier records: {}", err));
                0
            }
        }
    }
}
