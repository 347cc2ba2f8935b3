use thiserror::Error;

/// Error taxonomy for the logger control plane.
///
/// Every variant is fatal to the current action; none are retried
/// automatically. `Usage` is reported with help text instead of a log line.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{0}")]
    Usage(String),

    #[error("another logger instance with this id is already running")]
    AlreadyRunning,

    #[error("failed to acquire the singleton guard: {0}")]
    GuardUnavailable(String),

    #[error("failed to set up lifecycle signal '{name}': {source}")]
    SignalSetup {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("the spawned logger exited before signaling readiness")]
    SpawnFailed,

    #[error("failed to connect to the logger control endpoint: {0}")]
    ConnectionFailed(String),

    #[error("the remote stop call failed: {0}")]
    RemoteCallFailed(String),

    #[error("failed to retrieve the exit code of a launched process: {0}")]
    ExitCodeUnavailable(#[source] std::io::Error),

    #[error("the '{0}' action is not implemented")]
    NotImplemented(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ControlError {
    /// True when the error should be shown as a usage message rather than
    /// logged as a failure.
    pub fn is_usage(&self) -> bool {
        matches!(self, ControlError::Usage(_))
    }
}
