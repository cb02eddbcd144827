#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use semver::Version;

use provisioner::credentials::credential_vars;
use provisioner::{
    AssumedCredentials, AwsProvisioner, ClientFactory, Collaborators, Config, CredentialError,
    CredentialSource, EnvironmentPublisher, InstallError, Installer, Interrupt, InterruptTrigger,
    Terraform, TerraformError,
};

pub const ROLE: &str = "arn:aws:iam::123456789012:role/sandbox";

/// Ordered log of every collaborator call.
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.0.lock().unwrap().iter().any(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

pub fn credentials() -> AssumedCredentials {
    AssumedCredentials {
        access_key_id: "ASIAFAKE".to_string(),
        secret_access_key: "fake-secret".to_string(),
        session_token: "fake-token".to_string(),
        region: "us-east-1".to_string(),
        expiration: None,
    }
}

pub fn exit_error(command: &'static str, stderr: &str) -> TerraformError {
    TerraformError::Exit {
        command,
        status: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
    }
}

pub struct FakeTerraform {
    pub events: Events,
    pub fail_on: Option<&'static str>,
    pub stderr: String,
    /// The failing stage reports an interrupt instead of a non-zero exit.
    pub interrupted: bool,
}

impl FakeTerraform {
    pub fn new(events: Events) -> Self {
        Self {
            events,
            fail_on: None,
            stderr: String::new(),
            interrupted: false,
        }
    }

    pub fn failing(events: Events, stage: &'static str, stderr: &str) -> Self {
        Self {
            events,
            fail_on: Some(stage),
            stderr: stderr.to_string(),
            interrupted: false,
        }
    }

    fn call(&self, stage: &'static str) -> Result<(), TerraformError> {
        self.events.push(stage);
        if self.fail_on == Some(stage) {
            if self.interrupted {
                return Err(TerraformError::Interrupted { command: stage });
            }
            return Err(exit_error(stage, &self.stderr));
        }
        Ok(())
    }
}

#[async_trait]
impl Terraform for FakeTerraform {
    async fn init(&self) -> Result<(), TerraformError> {
        self.call("init")
    }

    async fn apply(&self) -> Result<(), TerraformError> {
        self.call("apply")
    }

    async fn destroy(&self) -> Result<(), TerraformError> {
        self.call("destroy")
    }
}

pub struct FakeCredentials {
    pub events: Events,
    pub credentials: Option<AssumedCredentials>,
}

#[async_trait]
impl CredentialSource for FakeCredentials {
    async fn assume_role(&self, role_arn: &str) -> Result<AssumedCredentials, CredentialError> {
        self.events.push("assume_role");
        self.credentials
            .clone()
            .ok_or_else(|| CredentialError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: "AccessDenied".to_string(),
            })
    }
}

/// Validates like the process publisher but keeps values in memory.
pub struct RecordingPublisher {
    pub events: Events,
    pub published: Arc<Mutex<Vec<(String, String)>>>,
}

impl EnvironmentPublisher for RecordingPublisher {
    fn publish(&self, credentials: &AssumedCredentials) -> Result<(), CredentialError> {
        self.events.push("publish");
        let vars = credential_vars(credentials)?;
        let mut published = self.published.lock().unwrap();
        for (key, value) in vars {
            published.push((key.to_string(), value.to_string()));
        }
        Ok(())
    }
}

pub struct FakeInstaller {
    pub events: Events,
    pub fail: bool,
}

#[async_trait]
impl Installer for FakeInstaller {
    async fn install(&self, version: &Version) -> Result<PathBuf, InstallError> {
        self.events.push("install");
        if self.fail {
            return Err(InstallError::Http {
                url: format!("https://releases.example/terraform/{}", version),
                status: 503,
            });
        }
        Ok(PathBuf::from(format!("/cache/terraform/{}/terraform", version)))
    }
}

/// Hands out [`FakeTerraform`] clients and records what was published at connect time.
pub struct FakeClientFactory {
    pub events: Events,
    pub published: Arc<Mutex<Vec<(String, String)>>>,
    pub published_at_connect: Arc<Mutex<Option<usize>>>,
    pub fail_connect: bool,
    pub fail_on: Option<&'static str>,
    pub stderr: String,
    pub interrupted: bool,
}

impl ClientFactory for FakeClientFactory {
    fn connect(
        &self,
        exec_path: PathBuf,
        working_dir: &Path,
    ) -> Result<Box<dyn Terraform>, TerraformError> {
        self.events.push("connect");
        assert_eq!(exec_path, PathBuf::from("/cache/terraform/1.4.4/terraform"));
        assert_eq!(working_dir, Path::new("terraform"));

        *self.published_at_connect.lock().unwrap() = Some(self.published.lock().unwrap().len());

        if self.fail_connect {
            return Err(TerraformError::ExecutableNotFound { path: exec_path });
        }

        Ok(Box::new(FakeTerraform {
            events: self.events.clone(),
            fail_on: self.fail_on,
            stderr: self.stderr.clone(),
            interrupted: self.interrupted,
        }))
    }
}

/// Knobs for a fully faked run.
#[derive(Default)]
pub struct Scenario {
    pub credentials_fail: bool,
    pub empty_session_token: bool,
    pub install_fail: bool,
    pub connect_fail: bool,
    pub terraform_fail_on: Option<&'static str>,
    pub terraform_stderr: String,
    /// `terraform_fail_on` stops on an interrupt rather than an exit status.
    pub terraform_interrupted: bool,
    /// Ctrl-C already pressed when the run starts.
    pub interrupted_before_start: bool,
}

pub struct Harness {
    pub events: Events,
    pub published: Arc<Mutex<Vec<(String, String)>>>,
    pub published_at_connect: Arc<Mutex<Option<usize>>>,
    pub deps: Collaborators,
    pub trigger: Option<InterruptTrigger>,
}

impl Scenario {
    pub fn build(self) -> Harness {
        let events = Events::default();
        let published = Arc::new(Mutex::new(Vec::new()));
        let published_at_connect = Arc::new(Mutex::new(None));

        let credentials = if self.credentials_fail {
            None
        } else {
            let mut creds = credentials();
            if self.empty_session_token {
                creds.session_token.clear();
            }
            Some(creds)
        };

        let (trigger, interrupt) = if self.interrupted_before_start {
            let (trigger, interrupt) = Interrupt::channel();
            trigger.trigger();
            (Some(trigger), interrupt)
        } else {
            (None, Interrupt::never())
        };

        let deps = Collaborators {
            credentials: Box::new(FakeCredentials {
                events: events.clone(),
                credentials,
            }),
            publisher: Box::new(RecordingPublisher {
                events: events.clone(),
                published: published.clone(),
            }),
            installer: Box::new(FakeInstaller {
                events: events.clone(),
                fail: self.install_fail,
            }),
            clients: Box::new(FakeClientFactory {
                events: events.clone(),
                published: published.clone(),
                published_at_connect: published_at_connect.clone(),
                fail_connect: self.connect_fail,
                fail_on: self.terraform_fail_on,
                stderr: self.terraform_stderr,
                interrupted: self.terraform_interrupted,
            }),
            provisioner: Box::new(AwsProvisioner),
            interrupt,
        };

        Harness {
            events,
            published,
            published_at_connect,
            deps,
            trigger,
        }
    }
}

pub fn config() -> Config {
    Config {
        role_arn: ROLE.to_string(),
        role_session_name: "provisioner-test".to_string(),
        terraform_version: Version::new(1, 4, 4),
        working_dir: PathBuf::from("terraform"),
        install_dir: None,
    }
}
