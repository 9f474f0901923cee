//! Where finished documents go: a file on disk, or a print surface.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{InvoiceError, Result};

fn sanitize_file_stem(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_').to_string();
    if trimmed.is_empty() {
        "invoice".to_string()
    } else {
        trimmed
    }
}

/// Writes `{invoice_number}.pdf` into `dir`, creating the directory if needed.
pub async fn save_to_file(dir: &Path, invoice_number: &str, document: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.pdf", sanitize_file_stem(invoice_number)));
    tokio::fs::write(&path, document).await?;
    info!(path = %path.display(), bytes = document.len(), "invoice saved");
    Ok(path)
}

/// A document handed to a print surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    pub job_name: String,
    /// Temporary copy the print command reads from.
    pub document_path: PathBuf,
    /// How long the temporary copy is kept after submission.
    pub release_after: Duration,
}

#[async_trait]
pub trait PrintSurface: Send + Sync {
    /// Submits `document` for printing. On failure nothing is left behind.
    async fn submit(&self, document: &[u8], job_name: &str) -> Result<PrintJob>;
}

/// Prints through a host command (`lp` by default), which receives the
/// document path as its last argument.
#[derive(Debug, Clone)]
pub struct SystemPrintSurface {
    command: String,
    cleanup: Duration,
}

impl SystemPrintSurface {
    pub fn new(command: impl Into<String>, cleanup: Duration) -> Self {
        Self {
            command: command.into(),
            cleanup,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.print_command.clone(), config.print_cleanup)
    }
}

#[async_trait]
impl PrintSurface for SystemPrintSurface {
    async fn submit(&self, document: &[u8], job_name: &str) -> Result<PrintJob> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| InvoiceError::print("no print command configured"))?;
        let args: Vec<&str> = parts.collect();

        let file = tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize_file_stem(job_name)))
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| InvoiceError::print(format!("cannot create print file: {e}")))?;
        tokio::fs::write(file.path(), document)
            .await
            .map_err(|e| InvoiceError::print(format!("cannot write print file: {e}")))?;

        // Any early return drops `file`, which removes it straight away.
        let output = Command::new(program)
            .args(&args)
            .arg(file.path())
            .output()
            .await
            .map_err(|e| InvoiceError::print(format!("cannot run '{program}': {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InvoiceError::print(format!(
                "'{program}' exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let temp_path = file.into_temp_path();
        let job = PrintJob {
            job_name: job_name.to_string(),
            document_path: temp_path.to_path_buf(),
            release_after: self.cleanup,
        };
        info!(job = %job.job_name, path = %job.document_path.display(), "print job submitted");

        let cleanup = self.cleanup;
        tokio::spawn(async move {
            tokio::time::sleep(cleanup).await;
            let path = temp_path.to_path_buf();
            match temp_path.close() {
                Ok(()) => debug!(path = %path.display(), "print file released"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to release print file"),
            }
        });

        Ok(job)
    }
}
