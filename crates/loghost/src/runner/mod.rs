//! The lifecycle orchestrator: composes the singleton guard, lifecycle
//! signals, process supervisor and control channel into the four action
//! state machines.

pub mod control_server;
pub mod guard;
pub mod signals;
pub mod stop_client;
pub mod supervisor;

use std::path::Path;

use loghost_core::{Action, ControlError, InstanceNames, LogDestination, LogService, LoggerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::logger::Logger;
use control_server::ControlServer;
use signals::LifecycleSignal;

/// One control-plane invocation: a parsed configuration, the derived
/// instance names, and the optional child command from the split command
/// line. State is per-invocation, never persisted.
pub struct ControlPlane {
    config: LoggerConfig,
    names: InstanceNames,
    child_command: Option<Vec<String>>,
}

impl ControlPlane {
    pub fn new(
        config: LoggerConfig,
        names: InstanceNames,
        child_command: Option<Vec<String>>,
    ) -> Self {
        ControlPlane {
            config,
            names,
            child_command,
        }
    }

    pub async fn run(&self, action: Action) -> Result<(), ControlError> {
        match action {
            Action::Start => self.run_start().await,
            Action::Spawn => self.run_spawn().await,
            Action::Stop => self.run_stop().await,
            Action::Status => Err(ControlError::NotImplemented("status")),
        }
    }

    /// Run a logger instance in the foreground, optionally supervising a
    /// child command behind it.
    async fn run_start(&self) -> Result<(), ControlError> {
        let guard = guard::acquire(&self.names.mutex_path, guard::GUARD_TIMEOUT).await?;

        let start_signal = LifecycleSignal::create(&self.names.start_signal_path)?;
        let stop_signal = LifecycleSignal::create(&self.names.stop_signal_path)?;
        // Markers left by a previous run of this instance. The guard
        // serializes services, so clearing here cannot race a live one.
        start_signal
            .clear()
            .map_err(|source| signal_setup(&self.names.start_signal_path, source))?;
        stop_signal
            .clear()
            .map_err(|source| signal_setup(&self.names.stop_signal_path, source))?;

        let shutdown = CancellationToken::new();
        let mut logger = Logger::new(shutdown.clone());
        logger.set_destination(self.config.destination.clone());
        logger.set_instance_id(self.config.instance_id.clone());
        logger.set_append(self.config.append);

        let started = start_signal.clone();
        logger.set_started_callback(Box::new(move || {
            if let Err(err) = started.set() {
                warn!(error = %err, "failed to set the started signal");
            }
        }));
        let stopped = stop_signal.clone();
        logger.set_stopped_callback(Box::new(move || {
            if let Err(err) = stopped.set() {
                warn!(error = %err, "failed to set the stopped signal");
            }
        }));

        // The names are published to the handler task once, before it is
        // armed, and never written again.
        let stop_names = self.names.clone();
        let termination_task = tokio::spawn(async move {
            wait_for_termination().await;
            if let Err(err) = stop_client::send_stop(&stop_names).await {
                warn!(error = %err, "failed to deliver the termination stop request");
            }
        });

        // The endpoint is bound before the started callback can fire, so a
        // waiter that observes the start signal can reach us for a stop.
        let server = match ControlServer::bind(&self.names.endpoint, logger.shutdown_token()).await {
            Ok(server) => server,
            Err(err) => {
                termination_task.abort();
                return Err(err);
            }
        };

        if let Err(err) = logger.start().await {
            shutdown.cancel();
            server.wait_shutdown().await;
            termination_task.abort();
            return Err(err.into());
        }

        let mut result: Result<(), ControlError> = Ok(());

        if let Some(child_command) = &self.child_command {
            match supervisor::launch_and_wait(child_command, &self.config.instance_id).await {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    warn!(%status, "supervised command exited with failure");
                    result = Err(ControlError::Other(anyhow::anyhow!(
                        "supervised command exited with {status}"
                    )));
                }
                Err(err) => result = Err(err),
            }
            // The logger comes down regardless of how the command fared.
            if let Err(err) = logger.stop().await {
                warn!(error = %err, "failed to stop the logger");
            }
        }

        if let Err(err) = logger.run_to_completion().await {
            if result.is_ok() {
                result = Err(err.into());
            }
        }

        termination_task.abort();
        server.wait_shutdown().await;
        drop(guard);
        result
    }

    /// Launch a logger instance in the background and wait until it is
    /// verifiably ready.
    async fn run_spawn(&self) -> Result<(), ControlError> {
        info!(instance_id = %self.config.instance_id, "launching background logger instance");

        let exe = std::env::current_exe().map_err(|source| ControlError::LaunchFailed {
            command: "current executable".into(),
            source,
        })?;
        let mut argv = vec![exe.to_string_lossy().into_owned()];
        argv.extend(self.service_switches());
        argv.push(Action::Start.keyword().to_string());

        let start_signal = LifecycleSignal::create(&self.names.start_signal_path)?;
        // A stale marker would be observed as instant readiness; clear it
        // before the new instance exists.
        start_signal
            .clear()
            .map_err(|source| signal_setup(&self.names.start_signal_path, source))?;

        let mut child = supervisor::launch_detached(&argv, &self.config.instance_id)?;

        // Wait on both the signal and the process: if the new instance
        // exits before signaling readiness, the spawn failed.
        signals::await_ready(&start_signal, &mut child).await?;
        info!("background logger instance is running");
        Ok(())
    }

    /// Request shutdown of a separately running instance and wait for its
    /// confirmation.
    async fn run_stop(&self) -> Result<(), ControlError> {
        let stop_signal = LifecycleSignal::create(&self.names.stop_signal_path)?;
        // A stopped marker left by a previous run would read as an instant
        // confirmation; clear it before asking.
        stop_signal
            .clear()
            .map_err(|source| signal_setup(&self.names.stop_signal_path, source))?;

        stop_client::send_stop(&self.names).await?;

        // Unbounded by design: the acknowledgement proved a live instance
        // received the request.
        stop_signal.wait().await;
        info!("the logger instance has stopped");
        Ok(())
    }

    /// Rebuild the service's own switches for a spawned `start` invocation.
    fn service_switches(&self) -> Vec<String> {
        let mut switches = Vec::new();
        if !self.config.instance_id.is_empty() {
            switches.push(format!("--instance-id={}", self.config.instance_id));
        }
        match &self.config.destination {
            LogDestination::Stdout => {}
            LogDestination::Stderr => switches.push("--output-file=stderr".into()),
            LogDestination::File(path) => {
                switches.push(format!("--output-file={}", path.display()));
            }
        }
        if self.config.append {
            switches.push("--append".into());
        }
        switches
    }
}

fn signal_setup(path: &Path, source: std::io::Error) -> ControlError {
    ControlError::SignalSetup {
        name: path.display().to_string(),
        source,
    }
}

/// Resolve on SIGINT or SIGTERM. SIGHUP, the logoff analog, is deliberately
/// not handled.
async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to register the SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loghost_core::InstanceId;
    use std::path::PathBuf;

    fn plane(config: LoggerConfig, root: &Path) -> ControlPlane {
        let names = InstanceNames::derive_in(root, &config.instance_id);
        ControlPlane::new(config, names, None)
    }

    #[tokio::test]
    async fn status_is_a_deterministic_not_supported_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = plane(LoggerConfig::default(), dir.path())
            .run(Action::Status)
            .await;
        assert!(matches!(result, Err(ControlError::NotImplemented("status"))));
    }

    #[test]
    fn spawn_switches_reproduce_the_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfig {
            instance_id: "t1".parse::<InstanceId>().unwrap(),
            destination: LogDestination::File(PathBuf::from("/tmp/out.log")),
            append: true,
        };
        let switches = plane(config, dir.path()).service_switches();
        assert_eq!(
            switches,
            vec![
                "--instance-id=t1".to_string(),
                "--output-file=/tmp/out.log".to_string(),
                "--append".to_string(),
            ]
        );
    }

    #[test]
    fn default_configuration_needs_no_switches() {
        let dir = tempfile::tempdir().unwrap();
        let switches = plane(LoggerConfig::default(), dir.path()).service_switches();
        assert!(switches.is_empty());
    }
}
