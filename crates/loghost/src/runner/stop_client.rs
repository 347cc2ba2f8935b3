//! Client side of the control channel: the one remote procedure, "stop".

use loghost_core::{ControlError, ControlRequest, ControlResponse, InstanceNames};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::info;

/// Ask the instance behind `names` to shut down.
///
/// A successful return means the request was received, nothing more; the
/// stopped signal is the confirmation channel, because an acknowledgement
/// does not guarantee the service has finished its teardown.
pub async fn send_stop(names: &InstanceNames) -> Result<(), ControlError> {
    info!(
        endpoint = %names.endpoint.display(),
        protocol = names.protocol,
        "stopping logger instance"
    );

    let stream = UnixStream::connect(&names.endpoint)
        .await
        .map_err(|err| ControlError::ConnectionFailed(err.to_string()))?;
    let (reader, mut writer) = stream.into_split();

    let payload = serde_json::to_string(&ControlRequest::Stop)
        .map_err(|err| ControlError::RemoteCallFailed(err.to_string()))?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|err| ControlError::RemoteCallFailed(err.to_string()))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|err| ControlError::RemoteCallFailed(err.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|err| ControlError::RemoteCallFailed(err.to_string()))?;

    let mut lines = BufReader::new(reader).lines();
    let line = lines
        .next_line()
        .await
        .map_err(|err| ControlError::RemoteCallFailed(err.to_string()))?
        .ok_or_else(|| {
            ControlError::RemoteCallFailed("connection closed before a response arrived".into())
        })?;

    match serde_json::from_str(&line) {
        Ok(ControlResponse::Ok) => {
            info!("logger shutdown has been requested");
            Ok(())
        }
        Ok(ControlResponse::Error { message }) => Err(ControlError::RemoteCallFailed(message)),
        Err(err) => Err(ControlError::RemoteCallFailed(err.to_string())),
    }
}
