//! Ctrl-C delivery to the running Terraform child.
//!
//! The child runs in its own process group, so the terminal's SIGINT only
//! reaches this process. Each interrupt is forwarded once to the child, which
//! is then waited for so Terraform can persist state and release its lock.

use tokio::sync::watch;

/// Receiving side; cheap to clone, one per listener.
#[derive(Debug, Clone)]
pub struct Interrupt(watch::Receiver<u64>);

/// Sending side, owned by whatever watches for Ctrl-C.
#[derive(Debug)]
pub struct InterruptTrigger(watch::Sender<u64>);

impl Interrupt {
    pub fn channel() -> (InterruptTrigger, Interrupt) {
        let (tx, rx) = watch::channel(0);
        (InterruptTrigger(tx), Interrupt(rx))
    }

    /// An interrupt that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(0);
        Interrupt(rx)
    }

    /// Resolves on the next interrupt not yet seen by this listener.
    pub async fn wait(&mut self) {
        if self.0.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl InterruptTrigger {
    pub fn trigger(&self) {
        self.0.send_modify(|count| *count += 1);
    }
}

/// Triggers on every Ctrl-C for the rest of the process lifetime.
pub fn watch_ctrl_c() -> Interrupt {
    let (trigger, interrupt) = Interrupt::channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received");
            trigger.trigger();
        }
    });
    interrupt
}
