//! External OCR process runner (ocrmypdf by default).

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{OcrTool, Result};
use crate::error::OcrError;
use crate::models::config::AcquisitionConfig;

/// Runs an OCR program as `<program> <args..> <input> <output>`.
#[derive(Debug, Clone)]
pub struct OcrMyPdf {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl OcrMyPdf {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(config.ocr_program.clone(), config.ocr_args.clone(), config.ocr_timeout())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for OcrMyPdf {
    fn default() -> Self {
        Self::from_config(&AcquisitionConfig::default())
    }
}

impl OcrTool for OcrMyPdf {
    async fn regenerate(&self, input: &Path, output: &Path) -> Result<()> {
        let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        debug!("Running {} {:?} on {}", self.program, self.args, input.display());

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| OcrError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);

        if !result.status.success() {
            return Err(OcrError::ExitStatus {
                program: self.program.clone(),
                code: result.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        info!("OCR completed for: {}", name);
        if !stdout.trim().is_empty() {
            info!("OCR stdout for {}:\n{}", name, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            // ocrmypdf reports progress on stderr even on success
            warn!("OCR stderr for {}:\n{}", name, stderr.trim_end());
        }

        Ok(())
    }
}
