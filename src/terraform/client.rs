use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use super::{Terraform, TerraformError};
use crate::interrupt::Interrupt;

/// How many trailing stderr lines are attached to an [`TerraformError::Exit`].
const STDERR_TAIL_LINES: usize = 20;

const INIT_ARGS: &[&str] = &["-no-color", "-input=false"];
const APPLY_ARGS: &[&str] = &["-no-color", "-auto-approve", "-input=false"];
const DESTROY_ARGS: &[&str] = &["-no-color", "-auto-approve", "-input=false"];

/// Where child stdout and stderr bytes end up.
pub type OutputSink = Arc<Mutex<dyn Write + Send>>;

/// Runs the Terraform CLI against one working directory.
pub struct TerraformCli {
    exec_path: PathBuf,
    working_dir: PathBuf,
    output: OutputSink,
    interrupt: Interrupt,
}

impl TerraformCli {
    /// The working directory is deliberately not checked here; Terraform reports it.
    pub fn new(
        exec_path: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self, TerraformError> {
        let exec_path = exec_path.into();
        if !exec_path.is_file() {
            return Err(TerraformError::ExecutableNotFound { path: exec_path });
        }

        Ok(Self {
            exec_path,
            working_dir: working_dir.into(),
            output: Arc::new(Mutex::new(std::io::stdout())),
            interrupt: Interrupt::never(),
        })
    }

    /// Sends child output to `output` instead of stdout.
    pub fn with_output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }

    /// Forwards each `interrupt` to the running child as SIGINT.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    async fn run(&self, command: &'static str, args: &[&str]) -> Result<(), TerraformError> {
        tracing::info!(
            command,
            working_dir = %self.working_dir.display(),
            "running terraform"
        );

        let mut cmd = Command::new(&self.exec_path);
        cmd.arg(command)
            .args(args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // only reached if this future is dropped before the child exits
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .map_err(|source| TerraformError::Spawn { command, source })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("terraform stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("terraform stderr was not captured"))?;

        let mut out_reader = BufReader::new(stdout);
        let mut err_reader = BufReader::new(stderr);
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let (mut out_open, mut err_open) = (true, true);
        let mut interrupt = self.interrupt.clone();
        let mut interrupted = false;

        while out_open || err_open {
            tokio::select! {
                read = out_reader.read_until(b'\n', &mut out_buf), if out_open => {
                    if read? == 0 {
                        out_open = false;
                    } else {
                        self.forward(&out_buf)?;
                        out_buf.clear();
                    }
                }
                read = err_reader.read_until(b'\n', &mut err_buf), if err_open => {
                    if read? == 0 {
                        err_open = false;
                    } else {
                        self.forward(&err_buf)?;
                        if stderr_tail.len() == STDERR_TAIL_LINES {
                            stderr_tail.pop_front();
                        }
                        stderr_tail.push_back(String::from_utf8_lossy(&err_buf).into_owned());
                        err_buf.clear();
                    }
                }
                _ = interrupt.wait() => {
                    interrupted = true;
                    interrupt_child(&child, command);
                }
            }
        }

        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                _ = interrupt.wait() => {
                    interrupted = true;
                    interrupt_child(&child, command);
                }
            }
        };

        if interrupted {
            tracing::warn!(command, %status, "terraform stopped after interrupt");
            return Err(TerraformError::Interrupted { command });
        }

        if status.success() {
            tracing::debug!(command, "terraform finished");
            return Ok(());
        }

        let stderr = stderr_tail
            .iter()
            .map(|l| l.trim_end())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Err(TerraformError::Exit {
            command,
            status: status.to_string(),
            stderr,
        })
    }

    fn forward(&self, bytes: &[u8]) -> Result<(), TerraformError> {
        let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(bytes)?;
        out.flush()?;
        Ok(())
    }
}

/// Asks Terraform to stop gracefully; it saves state and unlocks before exiting.
fn interrupt_child(child: &Child, command: &'static str) {
    tracing::warn!(command, "forwarding interrupt to terraform, waiting for it to stop");

    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
                tracing::warn!(command, %err, "failed to forward interrupt");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = child;
}

#[async_trait]
impl Terraform for TerraformCli {
    async fn init(&self) -> Result<(), TerraformError> {
        self.run("init", INIT_ARGS).await
    }

    async fn apply(&self) -> Result<(), TerraformError> {
        self.run("apply", APPLY_ARGS).await
    }

    async fn destroy(&self) -> Result<(), TerraformError> {
        self.run("destroy", DESTROY_ARGS).await
    }
}

impl std::fmt::Debug for TerraformCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerraformCli")
            .field("exec_path", &self.exec_path)
            .field("working_dir", &self.working_dir)
            .finish()
    }
}
