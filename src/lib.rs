//! Provisioner - assume an AWS role and drive Terraform with its credentials.
//!
//! One run: assume role via STS, export the temporary credentials, install a
//! pinned Terraform release, then `init` + `apply` or `init` + `destroy`.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod interrupt;
pub mod orchestrator;
pub mod output;
pub mod terraform;

pub use cli::{Cli, Command};
pub use config::{Config, ConfigError};
pub use credentials::{AssumedCredentials, CredentialError, CredentialSource, EnvironmentPublisher};
pub use dispatcher::{Collaborators, Outcome};
pub use error::ProvisionerError;
pub use interrupt::{Interrupt, InterruptTrigger};
pub use orchestrator::{AwsProvisioner, ProvisionError, Provisioner};
pub use terraform::{ClientFactory, InstallError, Installer, Terraform, TerraformError};
