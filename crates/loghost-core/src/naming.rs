//! Derivation of the named rendezvous objects for a logger instance.
//!
//! Two processes that derive names from the same instance identifier (and
//! the same runtime root) arrive at byte-identical paths. This is the sole
//! mechanism by which unrelated processes find each other's guard, signals
//! and control endpoint.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::InstanceId;

/// Environment variable through which the instance identifier is propagated
/// to supervised child and spawned service processes.
pub const INSTANCE_ID_ENV: &str = "LOGHOST_INSTANCE_ID";

/// Environment variable overriding the runtime root directory. Inherited by
/// spawned services, so both ends keep deriving identical names.
pub const RUNTIME_DIR_ENV: &str = "LOGHOST_RUNTIME_DIR";

const MUTEX_ROOT: &str = "loghost-mutex";
const START_SIGNAL_ROOT: &str = "loghost-started";
const STOP_SIGNAL_ROOT: &str = "loghost-stopped";
const ENDPOINT_ROOT: &str = "loghost-rpc";

/// Protocol half of the control-channel binding.
pub const RPC_PROTOCOL: &str = "unix";

/// The derived, immutable name tuple for one logger instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNames {
    pub mutex_path: PathBuf,
    pub start_signal_path: PathBuf,
    pub stop_signal_path: PathBuf,
    pub endpoint: PathBuf,
    pub protocol: &'static str,
}

impl InstanceNames {
    /// Derive the name tuple under an explicit runtime root. Pure and total
    /// for any valid identifier, including the empty default.
    pub fn derive_in(root: &Path, id: &InstanceId) -> Self {
        InstanceNames {
            mutex_path: root.join(format!("{}.lock", instance_string(MUTEX_ROOT, id))),
            start_signal_path: root.join(format!("{}.flag", instance_string(START_SIGNAL_ROOT, id))),
            stop_signal_path: root.join(format!("{}.flag", instance_string(STOP_SIGNAL_ROOT, id))),
            endpoint: root.join(format!("{}.sock", instance_string(ENDPOINT_ROOT, id))),
            protocol: RPC_PROTOCOL,
        }
    }

    /// Derive the name tuple under the ambient runtime root.
    pub fn derive(id: &InstanceId) -> Self {
        Self::derive_in(&runtime_root(), id)
    }
}

/// The directory under which all named objects live: the `RUNTIME_DIR_ENV`
/// override if present, the system temp directory otherwise.
pub fn runtime_root() -> PathBuf {
    env::var_os(RUNTIME_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

fn instance_string(root: &str, id: &InstanceId) -> String {
    if id.is_empty() {
        root.to_string()
    } else {
        format!("{root}-{id}")
    }
}
