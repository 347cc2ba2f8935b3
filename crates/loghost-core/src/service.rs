use async_trait::async_trait;

use crate::config::{InstanceId, LogDestination};

/// A lifecycle notification hook handed to the logger. Runs on the logger's
/// context, so it must not block.
pub type LifecycleCallback = Box<dyn Fn() + Send + Sync>;

/// The narrow contract the control plane consumes from the logger proper.
///
/// The control plane owns a `LogService` for the duration of the start
/// action only. It wires the readiness and termination signals in through
/// the two callbacks, starts the service, and then either supervises a
/// child command or blocks in `run_to_completion` until a stop arrives.
#[async_trait]
pub trait LogService: Send {
    fn set_destination(&mut self, destination: LogDestination);
    fn set_instance_id(&mut self, id: InstanceId);
    fn set_started_callback(&mut self, callback: LifecycleCallback);
    fn set_stopped_callback(&mut self, callback: LifecycleCallback);

    /// Bring the service up. The on-started callback fires once the service
    /// is accepting control calls.
    async fn start(&mut self) -> anyhow::Result<()>;

    /// Request shutdown. Safe to call at any time after `start`.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Block until the service has fully torn down. Fires the on-stopped
    /// callback as its last act.
    async fn run_to_completion(&mut self) -> anyhow::Result<()>;
}
