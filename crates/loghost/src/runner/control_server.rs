//! Server side of the control channel.
//!
//! One Unix-domain listener per running instance, serving the single "stop"
//! procedure. The acknowledgement is flushed back to the caller before the
//! shutdown token is cancelled, so a client never sees the connection drop
//! without a reply.

use std::path::{Path, PathBuf};

use anyhow::Context;
use loghost_core::{ControlError, ControlRequest, ControlResponse};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct ControlServer {
    endpoint: PathBuf,
    task: tokio::task::JoinHandle<()>,
}

impl ControlServer {
    /// Bind the control endpoint and start serving. A stale socket file is
    /// removed first; the caller holds the singleton guard, so nothing live
    /// can be behind it.
    pub async fn bind(endpoint: &Path, shutdown: CancellationToken) -> Result<Self, ControlError> {
        if endpoint.exists() {
            std::fs::remove_file(endpoint)
                .with_context(|| format!("failed to remove stale socket '{}'", endpoint.display()))?;
        }
        let listener = UnixListener::bind(endpoint)
            .with_context(|| format!("failed to bind control endpoint '{}'", endpoint.display()))?;
        info!(endpoint = %endpoint.display(), "control endpoint bound");

        let task = tokio::spawn(Self::serve_loop(listener, shutdown));
        Ok(ControlServer {
            endpoint: endpoint.to_path_buf(),
            task,
        })
    }

    async fn serve_loop(listener: UnixListener, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        if let Err(err) = Self::serve_connection(stream, &shutdown).await {
                            warn!(error = %err, "control connection failed");
                        }
                    }
                    Err(err) => warn!(error = %err, "control accept failed"),
                },
            }
        }
    }

    async fn serve_connection(
        stream: UnixStream,
        shutdown: &CancellationToken,
    ) -> anyhow::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match serde_json::from_str::<ControlRequest>(&line) {
            Ok(ControlRequest::Stop) => {
                let payload = serde_json::to_string(&ControlResponse::Ok)?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                info!("stop requested over the control channel");
                shutdown.cancel();
            }
            Err(err) => {
                let payload = serde_json::to_string(&ControlResponse::Error {
                    message: format!("malformed control request: {err}"),
                })?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }

    /// Wait for the serve loop to wind down (it exits when the shared token
    /// is cancelled) and remove the socket file.
    pub async fn wait_shutdown(self) {
        if let Err(err) = self.task.await {
            warn!(error = %err, "control server task ended abnormally");
        }
        if let Err(err) = std::fs::remove_file(&self.endpoint) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, "failed to remove control socket");
            }
        }
    }
}
