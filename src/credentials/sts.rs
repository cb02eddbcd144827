use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;

use super::{AssumedCredentials, CredentialError, CredentialSource};

/// Session length requested from STS, matching the AWS SDK's assume-role default.
pub const DEFAULT_SESSION_DURATION_SECS: i32 = 15 * 60;

/// Assumes roles through STS using the ambient AWS configuration as base identity.
pub struct StsCredentialSource {
    client: aws_sdk_sts::Client,
    region: Option<String>,
    session_name: String,
}

impl StsCredentialSource {
    /// Loads the default credential and region chain (env vars, profiles, IMDS, ...).
    pub async fn from_env(session_name: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_config(&config, session_name)
    }

    pub fn from_config(config: &SdkConfig, session_name: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
            region: config.region().map(|r| r.to_string()),
            session_name: session_name.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for StsCredentialSource {
    async fn assume_role(&self, role_arn: &str) -> Result<AssumedCredentials, CredentialError> {
        let region = self
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or(CredentialError::MissingRegion)?;

        tracing::debug!(%role_arn, session_name = %self.session_name, "calling sts:AssumeRole");

        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(&self.session_name)
            .duration_seconds(DEFAULT_SESSION_DURATION_SECS)
            .send()
            .await
            .map_err(|e| CredentialError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let creds = output
            .credentials()
            .ok_or_else(|| CredentialError::MissingCredentials {
                role_arn: role_arn.to_string(),
            })?;

        Ok(AssumedCredentials {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            region,
            expiration: SystemTime::try_from(*creds.expiration()).ok(),
        })
    }
}

/// Session name used when `ROLE_SESSION_NAME` is not configured.
pub fn default_session_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("provisioner-{}", secs)
}
