//! Wire messages for the control channel.
//!
//! The channel carries exactly one procedure: a parameterless stop request.
//! Messages are single JSON lines; framing beyond that is the transport's
//! business.

use serde::{Deserialize, Serialize};

/// Requests a client may send to a running logger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    /// Ask the instance to shut down. The reply only acknowledges receipt;
    /// completion of the teardown is announced through the stopped signal.
    Stop,
}

/// Replies from the logger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlResponse {
    Ok,
    Error { message: String },
}
