//! FILENAME: core/recorder/src/messages.rs
//! PURPOSE: Wire messages of the Home Assistant WebSocket API.
//! CONTEXT: Only the frames the exporter sends or reacts to are modelled.
//! Any other incoming frame decodes as `ServerMessage::Other`.

use engine::{Period, StatisticKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// OUTGOING
// ============================================================================

/// First frame the client sends after `auth_required`.
#[derive(Debug, Serialize)]
pub struct AuthMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub access_token: &'a str,
}

impl<'a> AuthMessage<'a> {
    pub fn new(access_token: &'a str) -> Self {
        AuthMessage {
            kind: "auth",
            access_token,
        }
    }
}

/// Commands the exporter issues. The numeric `id` is added on encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "recorder/statistics_during_period")]
    StatisticsDuringPeriod {
        start_time: String,
        end_time: String,
        period: Period,
        statistic_ids: Vec<String>,
        types: Vec<StatisticKind>,
    },
    #[serde(rename = "get_states")]
    GetStates,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StatisticsDuringPeriod { .. } => "recorder/statistics_during_period",
            Command::GetStates => "get_states",
        }
    }

    /// Encodes the command as a JSON frame carrying `id`.
    pub fn encode(&self, id: u64) -> Result<String, serde_json::Error> {
        let mut frame = serde_json::to_value(self)?;
        if let Some(object) = frame.as_object_mut() {
            object.insert("id".to_string(), Value::from(id));
        }
        serde_json::to_string(&frame)
    }
}

// ============================================================================
// INCOMING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthRequired {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthOk {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthInvalid {
        #[serde(default)]
        message: Option<String>,
    },
    Result(CommandResult),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandResult {
    pub id: u64,
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub message: String,
}

impl RemoteError {
    pub fn code_text(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            Value::Null => "unknown_error".to_string(),
            other => other.to_string(),
        }
    }
}

/// One entry of a `get_states` result; other state fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
}
