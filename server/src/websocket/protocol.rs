//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded and tagged by `type` in snake_case.
//! Payloads borrowed from the engine keep their camelCase fields.

use fieldcheck_engine::{Inspection, Notification, SessionView, SyncRequest};
use serde::{Deserialize, Serialize};

use crate::handlers::{ConnectivityResponse, SaveResponse};

/// Messages sent from client to server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the full session state.
    GetState {
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Save a new or edited inspection.
    SaveInspection {
        inspection: Inspection,
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Sync everything pending.
    Sync {
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Flip the connectivity flag.
    ToggleOnline {
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to `get_state`; also sent once on connect.
    State {
        state: SessionView,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Response to `save_inspection`.
    SaveResponse {
        #[serde(flatten)]
        result: SaveResponse,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Response to `sync`.
    SyncResponse {
        result: SyncRequest,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Response to `toggle_online`.
    ConnectivityResponse {
        #[serde(flatten)]
        result: ConnectivityResponse,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Pushed to every client when a notification is added to the feed.
    Notification { notification: Notification },

    /// Pushed to every client after any change to the session.
    StateChanged { state: SessionView },

    /// Response to ping.
    Pong,

    /// Error message.
    Error {
        /// Error description
        message: String,
        /// Request ID from the original request (if applicable)
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerMessage {
    /// Create an error message.
    pub fn error(message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialization() {
        let json = r#"{"type": "sync", "request_id": "req-7"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Sync { request_id } => {
                assert_eq!(request_id, Some("req-7".to_string()));
            }
            _ => panic!("Expected Sync message"),
        }

        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));

        let json = r#"{"type": "toggle_online"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::ToggleOnline { request_id: None }));
    }

    #[test]
    fn test_save_inspection_accepts_form_input() {
        let json = r#"{
            "type": "save_inspection",
            "inspection": {
                "id": 1732000000000, "site": "Well Pad A-12", "inspector": "Current User",
                "date": "2025-11-19", "status": "pending", "pressure": "120",
                "temperature": "", "leaks": "none", "notes": ""
            }
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::SaveInspection { inspection, .. } => {
                assert_eq!(inspection.id, 1_732_000_000_000);
                assert_eq!(inspection.pressure, Some(120.0));
                assert_eq!(inspection.temperature, None);
            }
            _ => panic!("Expected SaveInspection message"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"type": "pull", "since": null}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialization() {
        let msg = ServerMessage::Pong;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);

        let msg = ServerMessage::error("test error", Some("req-1".to_string()));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""message":"test error""#));
        assert!(json.contains(r#""request_id":"req-1""#));

        let msg = ServerMessage::SyncResponse {
            result: SyncRequest::NothingToSync,
            request_id: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"sync_response","result":{"outcome":"nothing_to_sync"}}"#
        );
    }

    #[test]
    fn test_connectivity_response_is_flattened() {
        let msg = ServerMessage::ConnectivityResponse {
            result: ConnectivityResponse {
                online: false,
                changed: true,
                auto_sync_at: None,
                cancelled_sync: Some(3),
            },
            request_id: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "connectivity_response");
        assert_eq!(value["online"], false);
        assert_eq!(value["cancelledSync"], 3);
    }
}
