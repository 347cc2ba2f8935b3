//! The built-in logger collaborator.
//!
//! Record ingestion and formatting live outside the control plane; this
//! implementation carries only what the lifecycle contract needs: a
//! destination, an instance id, the two lifecycle callbacks, and a shutdown
//! token shared with the control server.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::Context;
use async_trait::async_trait;
use loghost_core::{InstanceId, LifecycleCallback, LogDestination, LogService};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Logger {
    destination: LogDestination,
    append: bool,
    instance_id: InstanceId,
    on_started: Option<LifecycleCallback>,
    on_stopped: Option<LifecycleCallback>,
    shutdown: CancellationToken,
    writer: Option<Box<dyn Write + Send + Sync>>,
}

impl Logger {
    /// Create a logger wired to `shutdown`. Cancelling the token (from the
    /// control server, a termination signal, or `stop`) ends
    /// `run_to_completion`.
    pub fn new(shutdown: CancellationToken) -> Self {
        Logger {
            destination: LogDestination::default(),
            append: false,
            instance_id: InstanceId::default(),
            on_started: None,
            on_stopped: None,
            shutdown,
            writer: None,
        }
    }

    /// Append to (instead of truncating) a file destination.
    pub fn set_append(&mut self, append: bool) {
        self.append = append;
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn open_destination(&self) -> anyhow::Result<Box<dyn Write + Send + Sync>> {
        match &self.destination {
            LogDestination::Stdout => Ok(Box::new(std::io::stdout())),
            LogDestination::Stderr => Ok(Box::new(std::io::stderr())),
            LogDestination::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(self.append)
                    .truncate(!self.append)
                    .open(path)
                    .with_context(|| format!("failed to open '{}'", path.display()))?;
                Ok(Box::new(file))
            }
        }
    }

    fn write_banner(&mut self, event: &str) -> anyhow::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "[loghost:{}] logger {event}", self.instance_id)?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[async_trait]
impl LogService for Logger {
    fn set_destination(&mut self, destination: LogDestination) {
        self.destination = destination;
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }

    fn set_started_callback(&mut self, callback: LifecycleCallback) {
        self.on_started = Some(callback);
    }

    fn set_stopped_callback(&mut self, callback: LifecycleCallback) {
        self.on_stopped = Some(callback);
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        self.writer = Some(self.open_destination()?);
        self.write_banner("started")?;
        info!(instance_id = %self.instance_id, "logger started");
        if let Some(callback) = &self.on_started {
            callback();
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.shutdown.cancel();
        Ok(())
    }

    async fn run_to_completion(&mut self) -> anyhow::Result<()> {
        self.shutdown.cancelled().await;
        self.write_banner("stopped")?;
        info!(instance_id = %self.instance_id, "logger stopped");
        if let Some(callback) = &self.on_stopped {
            callback();
        }
        Ok(())
    }
}
