use thiserror::Error;

/// Errors raised while assuming the role or publishing its credentials.
///
/// SECURITY: Error messages must NEVER contain secret keys or session tokens.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No region could be resolved from the ambient AWS configuration
    #[error("no AWS region configured; set AWS_REGION or a region in the active profile")]
    MissingRegion,

    /// STS rejected or failed the AssumeRole call
    #[error("failed to assume role '{role_arn}': {message}")]
    AssumeRole { role_arn: String, message: String },

    /// STS answered without a credentials block
    #[error("STS returned no credentials for role '{role_arn}'")]
    MissingCredentials { role_arn: String },

    /// A credential value that must be exported was empty
    #[error("refusing to publish empty {key}")]
    EmptyValue { key: &'static str },
}
