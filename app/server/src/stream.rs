//! FILENAME: app/server/src/stream.rs
// PURPOSE: Streams serializer output into an HTTP response body.
// CONTEXT: Serializers write synchronously, so they run on a blocking thread
// and push fixed-size chunks through a bounded channel. A full channel
// blocks the serializer until the client catches up.

use crate::error::ExportError;
use crate::export::PreparedExport;
use axum::body::{Body, Bytes};
use persistence::{PersistenceError, TableSerializer};
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks in flight between the serializer and the response body.
pub const CHANNEL_DEPTH: usize = 4;

pub type Chunk = io::Result<Bytes>;

// ============================================================================
// CHANNEL WRITER
// ============================================================================

/// `Write` adapter that forwards `CHUNK_SIZE` blocks to a channel.
///
/// Must be used outside the async runtime (e.g. inside `spawn_blocking`).
/// Writes fail with `BrokenPipe` once the receiving side is gone.
pub struct ChannelWriter {
    tx: mpsc::Sender<Chunk>,
    buf: Vec<u8>,
    sent: usize,
}

impl ChannelWriter {
    pub fn new(tx: mpsc::Sender<Chunk>) -> Self {
        ChannelWriter {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
            sent: 0,
        }
    }

    /// Bytes handed to the channel so far.
    pub fn bytes_sent(&self) -> usize {
        self.sent
    }

    fn send_buffer(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE));
        let len = chunk.len();
        self.tx
            .blocking_send(Ok(Bytes::from(chunk)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))?;
        self.sent += len;
        Ok(())
    }

    /// Sends an error in place of the remaining output so the body aborts.
    pub fn fail(&mut self, message: String) {
        self.buf.clear();
        let _ = self.tx.blocking_send(Err(io::Error::other(message)));
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let room = CHUNK_SIZE - self.buf.len();
        let n = data.len().min(room);
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffer()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffer()
    }
}

// ============================================================================
// RESPONSE BODY
// ============================================================================

/// Starts serializing `export` with `serializer` on a blocking thread and
/// returns the receiving end of its chunk channel.
pub fn spawn_serializer(
    serializer: Box<dyn TableSerializer>,
    export: PreparedExport,
) -> mpsc::Receiver<Chunk> {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let mut writer = ChannelWriter::new(tx);
        let result = serializer
            .serialize(&export.table, &export.columns, &mut writer)
            .and_then(|()| writer.flush().map_err(PersistenceError::from));

        match result {
            Ok(()) => {
                log::debug!(
                    target: "EXPORT",
                    "streamed format={} bytes={}",
                    serializer.format().extension(),
                    writer.bytes_sent()
                );
            }
            Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::warn!(target: "EXPORT", "client went away after {} bytes", writer.bytes_sent());
            }
            Err(e) => {
                log::error!(target: "EXPORT", "serialization failed: {}", e);
                writer.fail(e.to_string());
            }
        }
    });

    rx
}

/// Serializes `export` in its own format into a streaming body.
pub async fn stream_export(export: PreparedExport) -> Result<Body, ExportError> {
    let serializer = export.format.serializer();
    stream_with(serializer, export).await
}

/// Waits for the first chunk so that failures before any byte is produced
/// are returned as an error response. Later failures abort the body.
pub async fn stream_with(
    serializer: Box<dyn TableSerializer>,
    export: PreparedExport,
) -> Result<Body, ExportError> {
    let mut rx = spawn_serializer(serializer, export);

    let first = match rx.recv().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(e)) => return Err(ExportError::Serialization(PersistenceError::Io(e))),
        None => Bytes::new(),
    };

    let rest = ReceiverStream::new(rx);
    let body = tokio_stream::once(Ok(first)).chain(rest);
    Ok(Body::from_stream(body))
}
