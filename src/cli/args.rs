use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use semver::Version;

use crate::terraform::{DEFAULT_WORKING_DIR, TERRAFORM_VERSION};

/// Assume an AWS role and run Terraform with its temporary credentials.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(value_enum)]
    pub command: Command,

    /// Dotenv file providing ROLE_ARN
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Directory containing the Terraform configuration
    #[arg(long, default_value = DEFAULT_WORKING_DIR)]
    pub working_dir: PathBuf,

    /// Exact Terraform release to install
    #[arg(long, default_value = TERRAFORM_VERSION)]
    pub terraform_version: Version,

    /// Where Terraform releases are cached (defaults to the user cache dir)
    #[arg(long, env = "PROVISIONER_INSTALL_DIR")]
    pub install_dir: Option<PathBuf>,

    /// Exit non-zero when a Terraform stage fails
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// terraform init + apply
    Apply,
    /// terraform init + destroy
    Destroy,
}
