use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single Terraform CLI invocation.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The executable handed to the client does not exist
    #[error("terraform executable not found at {}", path.display())]
    ExecutableNotFound { path: PathBuf },

    /// The child process could not be started (missing working dir, permissions, ...)
    #[error("failed to run terraform {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Terraform ran and reported failure
    #[error("terraform {command} exited with {status}{}", format_stderr(.stderr))]
    Exit {
        command: &'static str,
        status: String,
        stderr: String,
    },

    /// Terraform was asked to stop and has exited
    #[error("terraform {command} interrupted")]
    Interrupted { command: &'static str },

    #[error("I/O error while streaming terraform output: {0}")]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Errors from resolving and installing a Terraform release.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no Terraform release for platform {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("could not determine a cache directory; pass --install-dir")]
    NoInstallDir,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("download of {url} failed with HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("no checksum listed for {file}")]
    ChecksumMissing { file: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("invalid release archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
