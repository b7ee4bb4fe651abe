//! FILENAME: core/recorder/src/client.rs
//! PURPOSE: Authenticated WebSocket connection to Home Assistant.
//! CONTEXT: One connection serves every request. Commands carry increasing
//! ids; a reader task hands each `result` frame to the caller waiting on that
//! id, so concurrent requests share the socket. A writer task owns the sink.

use crate::messages::{AuthMessage, Command, RemoteError, ServerMessage};
use crate::RecorderError;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Reply = Result<Value, RecorderError>;

// ============================================================================
// PENDING REQUESTS
// ============================================================================

#[derive(Default)]
struct Pending {
    waiters: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    closed: AtomicBool,
}

impl Pending {
    fn insert(&self, id: u64, tx: oneshot::Sender<Reply>) {
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
    }

    fn take(&self, id: u64) -> Option<oneshot::Sender<Reply>> {
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Marks the connection closed and fails every waiter.
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let drained: Vec<_> = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        for (_, tx) in drained {
            let _ = tx.send(Err(RecorderError::Closed));
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn len(&self) -> usize {
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Removes a waiter when its call future is dropped before the reply.
struct PendingGuard<'a> {
    pending: &'a Pending,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.take(self.id);
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct RecorderClient {
    next_id: AtomicU64,
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Arc<Pending>,
    ha_version: Option<String>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl RecorderClient {
    /// Connects to `url` (e.g. `ws://supervisor/core/websocket`) and
    /// authenticates with `access_token`.
    pub async fn connect(url: &str, access_token: &str) -> Result<Self, RecorderError> {
        let (mut socket, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|source| RecorderError::Connect {
                url: url.to_string(),
                source,
            })?;

        let ha_version = authenticate(&mut socket, access_token).await?;
        log::info!(
            target: "RECORDER",
            "connected url={} ha_version={}",
            url,
            ha_version.as_deref().unwrap_or("unknown")
        );

        let (mut sink, mut stream) = socket.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let pending = Arc::new(Pending::default());

        let writer = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    log::warn!(target: "RECORDER", "send failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_pending = Arc::clone(&pending);
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => dispatch(&reader_pending, text.as_str()),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!(target: "RECORDER", "receive failed: {}", e);
                        break;
                    }
                }
            }
            log::warn!(target: "RECORDER", "connection closed");
            reader_pending.close();
        });

        Ok(RecorderClient {
            next_id: AtomicU64::new(1),
            outgoing,
            pending,
            ha_version,
            reader,
            writer,
        })
    }

    pub fn ha_version(&self) -> Option<&str> {
        self.ha_version.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        !self.pending.is_closed()
    }

    /// Calls still waiting for their result frame.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Sends a command and waits for its result payload.
    pub async fn call(&self, command: &Command) -> Result<Value, RecorderError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = command.encode(id)?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        let _guard = PendingGuard {
            pending: &self.pending,
            id,
        };
        if self.pending.is_closed() {
            return Err(RecorderError::Closed);
        }

        log::debug!(target: "RECORDER", "send id={} type={}", id, command.name());
        self.outgoing
            .send(Message::text(frame))
            .map_err(|_| RecorderError::Closed)?;

        rx.await.map_err(|_| RecorderError::Closed)?
    }
}

impl Drop for RecorderClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn authenticate(socket: &mut Socket, access_token: &str) -> Result<Option<String>, RecorderError> {
    while let Some(frame) = socket.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match serde_json::from_str::<ServerMessage>(text.as_str())? {
            ServerMessage::AuthRequired { .. } => {
                let auth = serde_json::to_string(&AuthMessage::new(access_token))?;
                socket.send(Message::text(auth)).await?;
            }
            ServerMessage::AuthOk { ha_version } => return Ok(ha_version),
            ServerMessage::AuthInvalid { message } => {
                return Err(RecorderError::Auth(
                    message.unwrap_or_else(|| "invalid access token".to_string()),
                ));
            }
            _ => {}
        }
    }
    Err(RecorderError::Closed)
}

fn dispatch(pending: &Pending, text: &str) {
    let result = match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Result(result)) => result,
        Ok(_) => return,
        Err(e) => {
            log::warn!(target: "RECORDER", "ignoring undecodable frame: {}", e);
            return;
        }
    };

    let Some(tx) = pending.take(result.id) else {
        log::debug!(target: "RECORDER", "no waiter for id={}", result.id);
        return;
    };

    let reply = if result.success {
        Ok(result.result)
    } else {
        let error = result.error.unwrap_or_else(|| RemoteError {
            code: Value::Null,
            message: String::new(),
        });
        Err(RecorderError::Remote {
            code: error.code_text(),
            message: error.message,
        })
    };
    let _ = tx.send(reply);
}
