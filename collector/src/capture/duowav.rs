use phasecore::interface::{AcquisitionParams, ArtifactHandle, Capturer, Station};
use phasecore::telemetry::LogManager;
use phasecore::{PhaseError, PhaseResult};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

/// Runs the external dual-tuner capture tool once per station.
///
/// The tool is asked for headerless float samples (`-f -o`) so the artifact
/// is raw interleaved complex64 that the loader can read directly.
pub struct DuoWavCapturer {
    binary: PathBuf,
    output: PathBuf,
    logger: LogManager,
}

impl DuoWavCapturer {
    pub fn new(binary: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output: output.into(),
            logger: LogManager::new("capture"),
        }
    }

    /// Command line for one capture, without spawning it.
    pub fn command(&self, station: &Station, params: &AcquisitionParams) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg("-o")
            .arg("-w")
            .arg(params.warmup.to_string())
            .arg("-d")
            .arg(params.decimation.to_string())
            .arg("-l")
            .arg(params.lna_state.to_string())
            .arg(station.frequency.hz().to_string())
            .arg(&params.file_size)
            .arg(&self.output);
        command
    }

    fn remove_stale_artifact(&self) -> PhaseResult<()> {
        match fs::remove_file(&self.output) {
            Ok(()) => {
                self.logger.detail(&format!(
                    "removed stale artifact {}",
                    self.output.display()
                ));
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PhaseError::io(&self.output, err)),
        }
    }
}

impl Capturer for DuoWavCapturer {
    fn preflight(&mut self) -> PhaseResult<()> {
        if !self.binary.is_file() {
            return Err(PhaseError::ConfigurationMissing(format!(
                "capture tool not found at {}",
                self.binary.display()
            )));
        }
        Ok(())
    }

    fn capture(
        &mut self,
        station: &Station,
        params: &AcquisitionParams,
    ) -> PhaseResult<ArtifactHandle> {
        self.remove_stale_artifact()?;

        self.logger.record(&format!(
            "capturing {} at {} Hz (warmup {} s, decimation {}, LNA {}, {} bytes)",
            station,
            station.frequency.hz(),
            params.warmup,
            params.decimation,
            params.lna_state,
            params.file_size
        ));
        let status = self.command(station, params).status().map_err(|err| {
            PhaseError::CaptureFailed(format!(
                "could not launch {}: {}",
                self.binary.display(),
                err
            ))
        })?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("{} exited with status {}", self.binary.display(), code),
                None => format!("{} was terminated by a signal", self.binary.display()),
            };
            return Err(PhaseError::CaptureFailed(reason));
        }
        if !self.output.is_file() {
            return Err(PhaseError::CaptureFailed(format!(
                "{} exited cleanly but wrote no artifact at {}",
                self.binary.display(),
                self.output.display()
            )));
        }

        Ok(ArtifactHandle::new(&self.output))
    }
}
