//! Runs the external part detector and picks up the payload it writes.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::DetectorConfig;
use crate::payload::{self, DetectionPayload, PayloadError};

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("no detector program configured")]
    NotConfigured,
    #[error("failed to start detector {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("detector exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

pub fn command_for(config: &DetectorConfig, image_path: &Path) -> Result<Command, DetectorError> {
    let program = config.program.as_ref().ok_or(DetectorError::NotConfigured)?;
    let mut cmd = Command::new(program);
    cmd.args(&config.args).arg(image_path);
    Ok(cmd)
}

/// Blocks until the detector finishes, then loads `<image stem>.json`.
pub fn run(config: &DetectorConfig, image_path: &Path) -> Result<DetectionPayload, DetectorError> {
    let mut cmd = command_for(config, image_path)?;
    log::info!("running detector on {}", image_path.display());
    let output = cmd.output().map_err(|source| DetectorError::Spawn {
        program: config.program.clone().unwrap_or_default(),
        source,
    })?;
    if !output.status.success() {
        return Err(DetectorError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    log::debug!(
        "detector stdout: {}",
        String::from_utf8_lossy(&output.stdout).trim()
    );
    Ok(payload::load(&payload::detections_path(image_path))?)
}
