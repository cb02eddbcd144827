use async_trait::async_trait;
use thiserror::Error;

use crate::terraform::{Terraform, TerraformError};

/// A failed stage of a provisioning run.
///
/// Nothing is rolled back: infrastructure is left as the last successful
/// Terraform step produced it.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to initialize Terraform: {0}")]
    Init(#[source] TerraformError),

    #[error("failed to apply Terraform configuration: {0}")]
    Apply(#[source] TerraformError),

    #[error("failed to destroy Terraform resources: {0}")]
    Destroy(#[source] TerraformError),
}

impl ProvisionError {
    /// The stage stopped because of an interrupt rather than a Terraform failure.
    pub fn is_interrupted(&self) -> bool {
        match self {
            ProvisionError::Init(err) | ProvisionError::Apply(err) | ProvisionError::Destroy(err) => {
                matches!(err, TerraformError::Interrupted { .. })
            }
        }
    }
}

#[async_trait]
pub trait Provisioner: Send + Sync {
    fn name(&self) -> &str;
    async fn provision(&self, tf: &dyn Terraform) -> Result<(), ProvisionError>;
    async fn deprovision(&self, tf: &dyn Terraform) -> Result<(), ProvisionError>;
}

/// Runs the Terraform configuration with the assumed AWS role in the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsProvisioner;

#[async_trait]
impl Provisioner for AwsProvisioner {
    fn name(&self) -> &str {
        "aws"
    }

    async fn provision(&self, tf: &dyn Terraform) -> Result<(), ProvisionError> {
        tf.init().await.map_err(ProvisionError::Init)?;
        tf.apply().await.map_err(ProvisionError::Apply)?;
        tracing::info!("terraform configuration applied");
        Ok(())
    }

    async fn deprovision(&self, tf: &dyn Terraform) -> Result<(), ProvisionError> {
        tf.init().await.map_err(ProvisionError::Init)?;
        tf.destroy().await.map_err(ProvisionError::Destroy)?;
        tracing::info!("terraform resources destroyed");
        Ok(())
    }
}
