use thiserror::Error;

use crate::config::ConfigError;
use crate::credentials::CredentialError;
use crate::terraform::{InstallError, TerraformError};

/// Startup failures that abort the run before any Terraform stage completes.
///
/// Stage failures are [`crate::orchestrator::ProvisionError`] and are reported,
/// not propagated.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error creating AWS session: {0}")]
    Credentials(#[from] CredentialError),

    #[error("error installing Terraform: {0}")]
    Install(#[from] InstallError),

    #[error("error initializing Terraform: {0}")]
    Client(#[source] TerraformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}
