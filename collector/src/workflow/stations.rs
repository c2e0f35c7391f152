use anyhow::Context;
use phasecore::interface::{Frequency, Station};
use phasecore::PhaseError;
use std::fs;
use std::path::Path;

/// Reads the `frequency_mhz,label` station list.
pub fn load_stations<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Station>> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(PhaseError::ConfigurationMissing(format!(
            "station list {} not found",
            path_ref.display()
        ))
        .into());
    }
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading station list {}", path_ref.display()))?;
    let stations = parse_stations(&contents)
        .with_context(|| format!("parsing station list {}", path_ref.display()))?;
    Ok(stations)
}

/// Parses station rows in file order. Blank lines and `#` comments are skipped.
pub fn parse_stations(contents: &str) -> Result<Vec<Station>, PhaseError> {
    let mut stations = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let (freq, label) = row.split_once(',').unwrap_or((row, ""));
        let frequency: Frequency = freq.parse().map_err(|_| {
            PhaseError::InvalidConfiguration(format!(
                "line {}: '{}' is not a frequency in MHz",
                idx + 1,
                freq.trim()
            ))
        })?;
        stations.push(Station::new(frequency, unquote(label.trim())));
    }
    Ok(stations)
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn stations_parse_in_file_order() {
        let stations = parse_stations("88.1,KAAA\n# comment\n\n101.10,\"K, B\"\n97.3\n").unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].frequency.as_str(), "88.1");
        assert_eq!(stations[0].label, "KAAA");
        assert_eq!(stations[1].frequency.as_str(), "101.10");
        assert_eq!(stations[1].label, "K, B");
        assert_eq!(stations[2].label, "");
    }

    #[test]
    fn bad_frequency_names_line() {
        let err = parse_stations("88.1,KAAA\nninety,KBBB\n").unwrap_err();
        assert!(matches!(err, PhaseError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn load_stations_reads_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"94.7,KCCC\n104.3,KDDD\n").unwrap();
        let stations = load_stations(temp.path()).unwrap();
        assert_eq!(stations[1].frequency.hz(), 104_300_000);
    }

    #[test]
    fn missing_station_list_is_configuration_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_stations(dir.path().join("stations.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PhaseError>(),
            Some(PhaseError::ConfigurationMissing(_))
        ));
    }
}
