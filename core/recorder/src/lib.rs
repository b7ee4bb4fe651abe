//! FILENAME: core/recorder/src/lib.rs
//! Home Assistant Recorder Access
//!
//! A WebSocket client for the Home Assistant API plus the two queries the
//! exporter needs: statistics during a period and the list of entity ids.
//! Callers depend on the `RecorderApi` trait, not on the client.

mod client;
mod error;
pub mod messages;
mod statistics;

pub use client::RecorderClient;
pub use error::RecorderError;
pub use statistics::{exportable_entity_ids, RecorderApi, DISALLOWED_DOMAINS};
