mod env;
mod error;
mod sts;

pub use env::{
    AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN, EnvironmentPublisher,
    ProcessEnvironment, credential_vars,
};
pub use error::CredentialError;
pub use sts::{DEFAULT_SESSION_DURATION_SECS, StsCredentialSource, default_session_name};

use std::time::SystemTime;

use async_trait::async_trait;

/// Temporary credentials obtained from one role assumption.
#[derive(Clone, PartialEq, Eq)]
pub struct AssumedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    /// Not refreshed; a run outliving this fails inside Terraform.
    pub expiration: Option<SystemTime>,
}

impl std::fmt::Debug for AssumedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssumedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("region", &self.region)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Produces concrete credentials for a role, eagerly.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn assume_role(&self, role_arn: &str) -> Result<AssumedCredentials, CredentialError>;
}
