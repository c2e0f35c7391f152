use crate::prelude::{PhaseError, PhaseResult};
use std::fmt;
use std::str::FromStr;

/// Broadcast frequency in MHz, keeping the text it was read from.
///
/// The text is what lands in the result log, so `101.10` stays `101.10`
/// rather than being re-rendered from the float.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    mhz: f64,
    text: String,
}

impl Frequency {
    /// Integer tuning frequency handed to the capture tool.
    pub fn hz(&self) -> u64 {
        (self.mhz * 1e6).round() as u64
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Frequency {
    type Err = PhaseError;

    fn from_str(s: &str) -> PhaseResult<Self> {
        let text = s.trim();
        let mhz: f64 = text.parse().map_err(|_| {
            PhaseError::InvalidConfiguration(format!("frequency '{}' is not a number", text))
        })?;
        if !mhz.is_finite() || mhz <= 0.0 {
            return Err(PhaseError::InvalidConfiguration(format!(
                "frequency '{}' must be positive",
                text
            )));
        }
        Ok(Self {
            mhz,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One entry of the station list. The label is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub frequency: Frequency,
    pub label: String,
}

impl Station {
    pub fn new(frequency: Frequency, label: impl Into<String>) -> Self {
        Self {
            frequency,
            label: label.into(),
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{} MHz", self.frequency)
        } else {
            write!(f, "{} MHz ({})", self.frequency, self.label)
        }
    }
}
