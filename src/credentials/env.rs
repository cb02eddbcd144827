use super::{AssumedCredentials, CredentialError};

pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Hands assumed credentials to whatever runs Terraform.
///
/// Terraform's AWS provider only reads credentials from its own environment, so
/// the default implementation writes them into this process's environment,
/// which every spawned child inherits.
pub trait EnvironmentPublisher: Send + Sync {
    fn publish(&self, credentials: &AssumedCredentials) -> Result<(), CredentialError>;
}

/// Returns the variables to export, rejecting any empty value.
pub fn credential_vars(
    credentials: &AssumedCredentials,
) -> Result<[(&'static str, &str); 4], CredentialError> {
    let vars = [
        (AWS_REGION, credentials.region.as_str()),
        (AWS_ACCESS_KEY_ID, credentials.access_key_id.as_str()),
        (AWS_SECRET_ACCESS_KEY, credentials.secret_access_key.as_str()),
        (AWS_SESSION_TOKEN, credentials.session_token.as_str()),
    ];

    if let Some((key, _)) = vars.iter().find(|(_, value)| value.is_empty()) {
        return Err(CredentialError::EmptyValue { key: *key });
    }

    Ok(vars)
}

/// Publishes into the current process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentPublisher for ProcessEnvironment {
    fn publish(&self, credentials: &AssumedCredentials) -> Result<(), CredentialError> {
        let vars = credential_vars(credentials)?;
        for (key, value) in vars {
            // SAFETY: called once on the single-threaded runtime before any
            // Terraform child is spawned; nothing else reads the environment
            // concurrently.
            unsafe {
                std::env::set_var(key, value);
            }
        }
        tracing::info!(region = %credentials.region, "AWS credentials exported to environment");
        Ok(())
    }
}
