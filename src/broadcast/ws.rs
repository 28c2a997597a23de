// src/broadcast/ws.rs
//! WebSocket transport for the status feed
//!
//! Accepts persistent subscriber connections and forwards them the
//! snapshots their broadcaster channel delivers, each as one JSON text
//! frame. The connection task owns the channel receiver, so a closed
//! socket deregisters the observer on the broadcaster's next push.

use crate::broadcast::feed::Broadcaster;
use crate::types::MiningStatus;
use crate::utils::error::SupervisorError;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tungstenite::protocol::Message;

/// Runs the WebSocket status feed listener
///
/// Each accepted connection becomes a registered observer that receives an
/// immediate snapshot and the periodic ones thereafter until it
/// disconnects.
///
/// # Arguments
/// * `addr` - Address to listen on
/// * `broadcaster` - Broadcaster to register each connection with
///
/// # Errors
/// Returns `SupervisorError` if the listener socket cannot be bound;
/// failures on individual accepts and connections are logged, never
/// propagated, so one bad peer cannot take the feed down.
pub async fn run_feed_listener(
    addr: SocketAddr,
    broadcaster: Arc<Broadcaster>,
) -> Result<(), SupervisorError> {
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        log::error!("Failed to bind status feed on {}: {}", addr, e);
        SupervisorError::IoError(e)
    })?;
    log::info!("Status feed listening on ws://{}", addr);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("Failed to accept feed connection: {}", e);
                continue;
            }
        };
        let receiver = broadcaster.subscribe().await;
        tokio::spawn(async move {
            log::info!("Observer connected from {}", peer);
            if let Err(e) = serve_observer(stream, receiver).await {
                log::debug!("Observer {} dropped: {}", peer, e);
            }
            log::info!("Observer {} disconnected", peer);
        });
    }
}

/// Forwards snapshots to one observer until either side closes
///
/// # Errors
/// Returns `SupervisorError` on handshake or send failures; the caller
/// only logs these, since one observer failing is not a feed failure.
async fn serve_observer(
    stream: TcpStream,
    mut receiver: UnboundedReceiver<MiningStatus>,
) -> Result<(), SupervisorError> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;

    loop {
        tokio::select! {
            snapshot = receiver.recv() => {
                match snapshot {
                    Some(status) => {
                        let text = serde_json::to_string(&status)?;
                        ws.send(Message::Text(text.into())).await?;
                    }
                    // Broadcaster went away; close out cleanly.
                    None => break,
                }
            }
            incoming = ws.next() => {
                match incoming {
                    None | Some(Ok(Message::Close(_))) => break,
                    Some(Err(e)) => return Err(e.into()),
                    // Subscribers have nothing to say; ignore pings etc.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusStore;
    use std::time::Duration;

    /// A feed address that cannot be bound must surface as an error to the
    /// caller instead of vanishing inside a detached task.
    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let store = Arc::new(StatusStore::new());
        let broadcaster = Arc::new(Broadcaster::new(store, Duration::from_secs(2)));

        let result = run_feed_listener(addr, broadcaster).await;
        assert!(matches!(result, Err(SupervisorError::IoError(_))));
    }
}
