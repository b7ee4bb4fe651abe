//! FILENAME: core/recorder/src/error.rs

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("recorder returned {code}: {message}")]
    Remote { code: String, message: String },

    #[error("malformed recorder message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("connection to the recorder is closed")]
    Closed,
}
