//! Terraform executable management and invocation.

mod client;
mod error;
mod installer;

pub use client::{OutputSink, TerraformCli};
pub use error::{InstallError, TerraformError};
pub use installer::{Platform, ReleasesInstaller};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use semver::Version;

use crate::interrupt::Interrupt;

/// Version installed when none is given on the command line.
pub const TERRAFORM_VERSION: &str = "1.4.4";

/// Directory holding the Terraform configuration, relative to the invocation.
pub const DEFAULT_WORKING_DIR: &str = "terraform";

/// The three Terraform operations the provisioner drives.
///
/// Idempotence is whatever Terraform's own state gives; implementations do not
/// inspect state.
#[async_trait]
pub trait Terraform: Send + Sync {
    async fn init(&self) -> Result<(), TerraformError>;
    async fn apply(&self) -> Result<(), TerraformError>;
    async fn destroy(&self) -> Result<(), TerraformError>;
}

/// Resolves an exact Terraform version to a local executable.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, version: &Version) -> Result<PathBuf, InstallError>;
}

/// Builds a [`Terraform`] client bound to one executable and working directory.
pub trait ClientFactory: Send + Sync {
    fn connect(
        &self,
        exec_path: PathBuf,
        working_dir: &Path,
    ) -> Result<Box<dyn Terraform>, TerraformError>;
}

/// Connects [`TerraformCli`] clients that forward output to stdout.
#[derive(Debug, Clone)]
pub struct CliClientFactory {
    interrupt: Interrupt,
}

impl CliClientFactory {
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }
}

impl ClientFactory for CliClientFactory {
    fn connect(
        &self,
        exec_path: PathBuf,
        working_dir: &Path,
    ) -> Result<Box<dyn Terraform>, TerraformError> {
        let client =
            TerraformCli::new(exec_path, working_dir)?.with_interrupt(self.interrupt.clone());
        tracing::debug!(?client, "terraform client ready");
        Ok(Box::new(client))
    }
}
