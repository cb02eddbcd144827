use std::path::{Path, PathBuf};

use semver::Version;
use thiserror::Error;

use crate::cli::Cli;
use crate::credentials::default_session_name;

pub const ROLE_ARN: &str = "ROLE_ARN";
pub const ROLE_SESSION_NAME: &str = "ROLE_SESSION_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading {} file: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("ROLE_ARN can not be empty, please check .env file")]
    MissingRoleArn,
}

/// Settings resolved once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub role_arn: String,
    pub role_session_name: String,
    pub terraform_version: Version,
    pub working_dir: PathBuf,
    pub install_dir: Option<PathBuf>,
}

impl Config {
    /// Loads the dotenv file into the process environment, then reads settings from it.
    ///
    /// Variables already present in the environment are not overridden.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        load_env_file(&cli.env_file)?;
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(cli: &Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let role_arn = lookup(ROLE_ARN)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingRoleArn)?;

        let role_session_name = lookup(ROLE_SESSION_NAME)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_session_name);

        Ok(Self {
            role_arn,
            role_session_name,
            terraform_version: cli.terraform_version.clone(),
            working_dir: cli.working_dir.clone(),
            install_dir: cli.install_dir.clone(),
        })
    }
}

fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "environment file loaded");
    Ok(())
}
