//! Lifecycle signals: named, manually-reset, cross-process flags.
//!
//! Realized as marker files under the runtime root. Setting an already-set
//! signal is a no-op, and this subsystem never clears a signal on its own;
//! clearing stale markers from a previous run is the owning action's
//! explicit responsibility (under the singleton guard for `start`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use loghost_core::ControlError;
use tokio::process::Child;
use tracing::error;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Handle to a named lifecycle signal. Cheap to clone; both ends of a
/// rendezvous hold one independently.
#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    path: PathBuf,
}

impl LifecycleSignal {
    /// Create or open the named signal. Ensures the runtime root exists but
    /// does not touch the flag itself.
    pub fn create(path: &Path) -> Result<Self, ControlError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ControlError::SignalSetup {
                name: path.display().to_string(),
                source,
            })?;
        }
        Ok(LifecycleSignal {
            path: path.to_path_buf(),
        })
    }

    /// Transition the signal to set. Idempotent.
    pub fn set(&self) -> std::io::Result<()> {
        std::fs::File::create(&self.path)?;
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Remove a stale marker left by a previous run. Callers must hold the
    /// right to do so (the guard, or the initiative in a stop/spawn
    /// handshake).
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Block until the signal is set. Unbounded; bounding is the caller's
    /// choice via `select!` or a timeout wrapper.
    pub async fn wait(&self) {
        loop {
            if self.is_set() {
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Wait for a freshly launched service to become ready: either its start
/// signal fires, or the process exits first. A process exit before
/// readiness means the launch failed, and unblocks the wait instead of
/// hanging it forever.
pub async fn await_ready(start: &LifecycleSignal, child: &mut Child) -> Result<(), ControlError> {
    tokio::select! {
        biased;
        _ = start.wait() => Ok(()),
        status = child.wait() => {
            match status {
                Ok(status) => error!(%status, "the logger exited before signaling readiness"),
                Err(err) => error!(error = %err, "failed waiting on the spawned logger"),
            }
            Err(ControlError::SpawnFailed)
        }
    }
}
