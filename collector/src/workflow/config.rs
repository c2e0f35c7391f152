use anyhow::Context;
use phasecore::interface::AcquisitionParams;
use phasecore::PhaseError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Decimation factors the capture tool accepts.
pub const DECIMATION_FACTORS: [u32; 6] = [1, 2, 4, 8, 16, 32];
/// Highest LNA state (least gain) the capture tool accepts.
pub const MAX_LNA_STATE: u8 = 9;

/// `file_size` may be written as a byte count or with the tool's size suffix.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum FileSize {
    Bytes(u64),
    Text(String),
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSize::Bytes(bytes) => write!(f, "{}", bytes),
            FileSize::Text(text) => f.write_str(text.trim()),
        }
    }
}

/// Settings file as written by the operator. Every acquisition key is
/// required; an absent key is reported by name instead of a serde error.
#[derive(Clone, Debug, Deserialize)]
struct RawSettings {
    duowav_path: Option<PathBuf>,
    decimation: Option<u32>,
    warmup: Option<u32>,
    lna_state: Option<u8>,
    file_size: Option<FileSize>,
    #[serde(default)]
    verify: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub duowav_path: PathBuf,
    pub acquisition: AcquisitionParams,
    /// Re-correlate with channel B derotated to check each estimate.
    pub verify: bool,
}

impl Settings {
    /// Loads settings from JSON, or YAML when the extension is `.yaml`/`.yml`.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(PhaseError::ConfigurationMissing(format!(
                "settings file {} not found",
                path_ref.display()
            ))
            .into());
        }
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading settings {}", path_ref.display()))?;
        let raw: RawSettings = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing settings {}", path_ref.display()))?,
            _ => serde_json::from_str(&contents)
                .with_context(|| format!("parsing settings {}", path_ref.display()))?,
        };
        let settings = Self::from_raw(raw)
            .with_context(|| format!("validating settings {}", path_ref.display()))?;
        Ok(settings)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, PhaseError> {
        let duowav_path = require(raw.duowav_path, "duowav_path")?;
        let decimation = require(raw.decimation, "decimation")?;
        let warmup = require(raw.warmup, "warmup")?;
        let lna_state = require(raw.lna_state, "lna_state")?;
        let file_size = require(raw.file_size, "file_size")?.to_string();

        if !DECIMATION_FACTORS.contains(&decimation) {
            return Err(PhaseError::InvalidConfiguration(format!(
                "decimation {} is not one of {:?}",
                decimation, DECIMATION_FACTORS
            )));
        }
        if lna_state > MAX_LNA_STATE {
            return Err(PhaseError::InvalidConfiguration(format!(
                "lna_state {} is above {}",
                lna_state, MAX_LNA_STATE
            )));
        }
        parse_size(&file_size)?;

        Ok(Self {
            duowav_path,
            acquisition: AcquisitionParams {
                warmup,
                decimation,
                lna_state,
                file_size,
            },
            verify: raw.verify,
        })
    }
}

fn require<T>(value: Option<T>, key: &str) -> Result<T, PhaseError> {
    value.ok_or_else(|| PhaseError::ConfigurationMissing(format!("setting '{}' is required", key)))
}

/// Byte count of a size in the capture tool's notation (`4096`, `10M`, `1.5k`).
pub fn parse_size(text: &str) -> Result<u64, PhaseError> {
    let invalid =
        || PhaseError::InvalidConfiguration(format!("file_size '{}' is not a size", text));
    let trimmed = text.trim();
    let (number, multiplier) = match trimmed.chars().last() {
        Some('k') | Some('K') => (&trimmed[..trimmed.len() - 1], 1u64 << 10),
        Some('m') | Some('M') => (&trimmed[..trimmed.len() - 1], 1u64 << 20),
        Some('g') | Some('G') => (&trimmed[..trimmed.len() - 1], 1u64 << 30),
        Some(_) => (trimmed, 1),
        None => return Err(invalid()),
    };
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok((value * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_settings(suffix: &str, body: &str) -> tempfile::TempPath {
        let mut temp = Builder::new().suffix(suffix).tempfile().unwrap();
        temp.write_all(body.as_bytes()).unwrap();
        temp.into_temp_path()
    }

    fn missing_key(err: &anyhow::Error) -> Option<String> {
        match err.downcast_ref::<PhaseError>() {
            Some(PhaseError::ConfigurationMissing(msg)) => Some(msg.clone()),
            _ => None,
        }
    }

    #[test]
    fn settings_load_reads_json() {
        let path = write_settings(
            ".json",
            r#"{"duowav_path": "/opt/duo/DuoWAV", "decimation": 8, "warmup": 2,
                "lna_state": 4, "file_size": 1048576}"#,
        );
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.duowav_path, PathBuf::from("/opt/duo/DuoWAV"));
        assert_eq!(settings.acquisition.decimation, 8);
        assert_eq!(settings.acquisition.file_size, "1048576");
        assert!(!settings.verify);
    }

    #[test]
    fn settings_load_reads_yaml() {
        let path = write_settings(
            ".yaml",
            "duowav_path: ./DuoWAV\ndecimation: 4\nwarmup: 5\nlna_state: 2\nfile_size: 10M\nverify: true\n",
        );
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.acquisition.warmup, 5);
        assert_eq!(settings.acquisition.file_size, "10M");
        assert!(settings.verify);
    }

    #[test]
    fn absent_key_is_configuration_missing() {
        let path = write_settings(
            ".json",
            r#"{"duowav_path": "DuoWAV", "decimation": 8, "warmup": 2, "file_size": 4096}"#,
        );
        let err = Settings::load(&path).unwrap_err();
        assert!(missing_key(&err).unwrap().contains("lna_state"));
    }

    #[test]
    fn absent_file_is_configuration_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("settings.json")).unwrap_err();
        assert!(missing_key(&err).is_some());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let path = write_settings(
            ".json",
            r#"{"duowav_path": "DuoWAV", "decimation": 3, "warmup": 2,
                "lna_state": 4, "file_size": 4096}"#,
        );
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PhaseError>(),
            Some(PhaseError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn parse_size_understands_suffixes() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("10M").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_size("1.5k").unwrap(), 1536);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("0").is_err());
    }
}
