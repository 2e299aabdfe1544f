//! WebSocket message DTOs for the collaboration protocol.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Inbound client messages, dispatched by the `type` field.
///
/// The set of kinds is closed: anything else fails to deserialize and is
/// handled by the protocol-error branch of the connection handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Admission request; must be the first message on a connection
    Join {
        user_id: String,
        username: String,
        join_link: String,
    },
    /// Last-writer-wins content update
    CodeUpdate {
        code: String,
        #[serde(default)]
        file_path: Option<String>,
    },
    /// Cursor position update
    CursorUpdate { line: u32, column: u32 },
    /// Observation-mode request; empty/absent target clears the mode
    Observe {
        #[serde(default)]
        target_id: Option<String>,
    },
    /// Liveness probe
    Ping,
}

/// Server-to-client event type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    UserJoined,
    UserLeft,
    Init,
    CodeUpdate,
    CursorUpdate,
    ObservationChanged,
    Pong,
    Error,
}

/// Presence record as seen on the wire. Never carries the join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    /// Unix timestamp (milliseconds since epoch, UTC)
    pub joined_at: i64,
    pub is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observing: Option<String>,
}

/// Shared document state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedStateDto {
    pub code: String,
    pub files: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_file: Option<String>,
}

/// Cursor position of one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorDto {
    pub user_id: String,
    pub line: u32,
    pub column: u32,
}

/// Sent to existing members when someone joins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJoinedMessage {
    pub r#type: MessageType,
    pub user: UserDto,
    pub total_users: usize,
}

/// Sent to remaining members when someone leaves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLeftMessage {
    pub r#type: MessageType,
    pub user_id: String,
    pub total_users: usize,
}

/// Full state snapshot sent to a newly admitted member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub users: Vec<UserDto>,
    pub shared_state: SharedStateDto,
    pub cursors: HashMap<String, CursorDto>,
}

/// Content update fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeUpdateMessage {
    pub r#type: MessageType,
    pub user_id: String,
    pub username: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Unix timestamp (milliseconds since epoch, UTC)
    pub timestamp: i64,
}

/// Cursor update fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorUpdateMessage {
    pub r#type: MessageType,
    pub cursor: CursorDto,
}

/// Observation-mode change fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationChangedMessage {
    pub r#type: MessageType,
    pub observer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub r#type: MessageType,
}

impl PongMessage {
    pub fn new() -> Self {
        Self {
            r#type: MessageType::Pong,
        }
    }
}

impl Default for PongMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// Error frame sent before closing a connection or dropping a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_join_deserialize() {
        // テスト項目: join メッセージをデシリアライズできる
        // given (前提条件):
        let json = r#"{"type":"join","user_id":"alice","username":"Alice","join_link":"/collab/tok"}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        match msg {
            ClientMessage::Join {
                user_id,
                username,
                join_link,
            } => {
                assert_eq!(user_id, "alice");
                assert_eq!(username, "Alice");
                assert_eq!(join_link, "/collab/tok");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_client_message_code_update_without_file_path() {
        // テスト項目: file_path 省略の code_update をデシリアライズできる
        // given (前提条件):
        let json = r#"{"type":"code_update","code":"fn main() {}"}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        match msg {
            ClientMessage::CodeUpdate { code, file_path } => {
                assert_eq!(code, "fn main() {}");
                assert_eq!(file_path, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_client_message_unknown_type_fails() {
        // テスト項目: 未知の type はデシリアライズエラーになる（閉じた enum）
        // given (前提条件):
        let json = r#"{"type":"shutdown_server"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_message_type_serializes_snake_case() {
        // テスト項目: イベント type が snake_case で出力される
        // when (操作):
        let json = serde_json::to_string(&PongMessage::new()).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_code_update_message_omits_absent_file_path() {
        // テスト項目: file_path が None のとき出力に含まれない
        // given (前提条件):
        let msg = CodeUpdateMessage {
            r#type: MessageType::CodeUpdate,
            user_id: "alice".to_string(),
            username: "Alice".to_string(),
            code: "x".to_string(),
            file_path: None,
            timestamp: 0,
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert!(!json.contains("file_path"));
        assert!(json.contains(r#""type":"code_update""#));
    }
}
