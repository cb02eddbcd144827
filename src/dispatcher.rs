//! Wires the bootstrap steps together for one command.

use std::future::Future;
use std::io::Write;
use std::process::ExitCode;

use crate::cli::Command;
use crate::config::Config;
use crate::credentials::{
    CredentialSource, EnvironmentPublisher, ProcessEnvironment, StsCredentialSource,
};
use crate::error::ProvisionerError;
use crate::interrupt::Interrupt;
use crate::orchestrator::{AwsProvisioner, Provisioner};
use crate::output;
use crate::terraform::{CliClientFactory, ClientFactory, Installer, ReleasesInstaller};

/// Everything a run talks to outside this process.
pub struct Collaborators {
    pub credentials: Box<dyn CredentialSource>,
    pub publisher: Box<dyn EnvironmentPublisher>,
    pub installer: Box<dyn Installer>,
    pub clients: Box<dyn ClientFactory>,
    pub provisioner: Box<dyn Provisioner>,
    /// Aborts the bootstrap steps; Terraform stages see it through their client.
    pub interrupt: Interrupt,
}

impl Collaborators {
    /// STS, the process environment, HashiCorp releases and the Terraform CLI.
    pub async fn aws(config: &Config, interrupt: Interrupt) -> Result<Self, ProvisionerError> {
        let installer = match &config.install_dir {
            Some(dir) => ReleasesInstaller::new(dir)?,
            None => ReleasesInstaller::in_user_cache()?,
        };

        Ok(Self {
            credentials: Box::new(StsCredentialSource::from_env(&config.role_session_name).await),
            publisher: Box::new(ProcessEnvironment),
            installer: Box::new(installer),
            clients: Box::new(CliClientFactory::new(interrupt.clone())),
            provisioner: Box::new(AwsProvisioner),
            interrupt,
        })
    }
}

/// How the Terraform stages of a completed run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    StageFailed,
}

impl Outcome {
    /// Stage failures exit 0 unless `fail_on_error` is set.
    pub fn exit_code(self, fail_on_error: bool) -> ExitCode {
        match (self, fail_on_error) {
            (Outcome::StageFailed, true) => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }
}

/// Runs one command end to end and writes the report lines to `out`.
///
/// Credentials are published before the Terraform client exists. Startup
/// failures and interrupts are returned; stage failures are reported and yield
/// [`Outcome::StageFailed`].
pub async fn run<W: Write>(
    command: Command,
    config: &Config,
    deps: &Collaborators,
    out: &mut W,
) -> Result<Outcome, ProvisionerError> {
    let mut interrupt = deps.interrupt.clone();

    tracing::info!(role_arn = %config.role_arn, "assuming role");
    let credentials =
        interruptible(&mut interrupt, deps.credentials.assume_role(&config.role_arn)).await??;
    deps.publisher.publish(&credentials)?;

    tracing::info!(version = %config.terraform_version, "installing terraform");
    let exec_path =
        interruptible(&mut interrupt, deps.installer.install(&config.terraform_version)).await??;

    let tf = deps
        .clients
        .connect(exec_path, &config.working_dir)
        .map_err(ProvisionerError::Client)?;

    tracing::info!(
        ?command,
        provisioner = deps.provisioner.name(),
        "running provisioner"
    );
    let result = match command {
        Command::Apply => deps.provisioner.provision(tf.as_ref()).await,
        Command::Destroy => deps.provisioner.deprovision(tf.as_ref()).await,
    };

    if let Err(err) = &result {
        if err.is_interrupted() {
            return Err(ProvisionerError::Interrupted);
        }
    }

    match command {
        Command::Apply => output::report_provision(out, &result)?,
        Command::Destroy => output::report_deprovision(out, &result)?,
    }

    match result {
        Ok(()) => Ok(Outcome::Succeeded),
        Err(err) => {
            tracing::warn!(error = %err, "terraform stage failed");
            Ok(Outcome::StageFailed)
        }
    }
}

/// Drops `step` if an interrupt arrives first; only used where no child process runs.
async fn interruptible<T>(
    interrupt: &mut Interrupt,
    step: impl Future<Output = T>,
) -> Result<T, ProvisionerError> {
    tokio::select! {
        biased;
        _ = interrupt.wait() => Err(ProvisionerError::Interrupted),
        value = step => Ok(value),
    }
}
