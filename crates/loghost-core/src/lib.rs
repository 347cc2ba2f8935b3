pub mod actions;
pub mod cmdline;
pub mod config;
pub mod error;
pub mod naming;
pub mod protocol;
pub mod service;

pub use actions::{ACTION_TABLE, Action, find_action};
pub use cmdline::SplitCommandLine;
pub use config::{InstanceId, LogDestination, LoggerConfig, MAX_INSTANCE_ID_LEN};
pub use error::ControlError;
pub use naming::InstanceNames;
pub use protocol::{ControlRequest, ControlResponse};
pub use service::{LifecycleCallback, LogService};
