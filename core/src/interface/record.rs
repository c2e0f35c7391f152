use crate::interface::station::Frequency;
use crate::math::stats::StatsHelper;
use crate::prelude::{PhaseError, PhaseResult};
use log::debug;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Phase offset measured for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub frequency: Frequency,
    /// Angle of channel B relative to channel A, in (-180, 180].
    pub phase_angle_degrees: f64,
}

impl CorrelationResult {
    pub fn new(frequency: Frequency, phase_angle_degrees: f64) -> Self {
        Self {
            frequency,
            phase_angle_degrees,
        }
    }

    /// Angle as logged: rounded to four decimals, then wrapped, so the text
    /// never reads `-180.0000`.
    pub fn logged_angle(&self) -> f64 {
        let rounded = (self.phase_angle_degrees * 1e4).round() / 1e4;
        StatsHelper::wrap_degrees(rounded)
    }
}

impl fmt::Display for CorrelationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:.4}", self.frequency, self.logged_angle())
    }
}

impl FromStr for CorrelationResult {
    type Err = PhaseError;

    fn from_str(line: &str) -> PhaseResult<Self> {
        let (freq, angle) = line
            .trim()
            .split_once(',')
            .ok_or_else(|| PhaseError::MalformedRecord(format!("no separator in '{}'", line)))?;
        let frequency: Frequency = freq
            .parse()
            .map_err(|err| PhaseError::MalformedRecord(format!("{}", err)))?;
        let phase_angle_degrees: f64 = angle.trim().parse().map_err(|_| {
            PhaseError::MalformedRecord(format!("angle '{}' is not a number", angle.trim()))
        })?;
        Ok(Self {
            frequency,
            phase_angle_degrees,
        })
    }
}

/// Append-only result log, one `<frequency>,<angle>` line per station.
///
/// The file is opened in append mode so earlier sessions are kept, and every
/// record is flushed and synced before `append` returns.
pub struct ResultLog {
    path: PathBuf,
    file: File,
}

impl ResultLog {
    pub fn open<P: AsRef<Path>>(path: P) -> PhaseResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| PhaseError::io(&path, err))?;
        debug!("result log {} opened for append", path.display());
        Ok(Self { path, file })
    }

    pub fn append(&mut self, result: &CorrelationResult) -> PhaseResult<()> {
        let line = format!("{}\n", result);
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data())
            .map_err(|err| PhaseError::io(&self.path, err))
    }

    /// Parses every record of an existing log. Blank lines are ignored.
    pub fn read<P: AsRef<Path>>(path: P) -> PhaseResult<Vec<CorrelationResult>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| PhaseError::io(path, err))?;
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                line.parse::<CorrelationResult>().map_err(|err| {
                    PhaseError::MalformedRecord(format!(
                        "{} line {}: {}",
                        path.display(),
                        idx + 1,
                        err
                    ))
                })
            })
            .collect()
    }
}
