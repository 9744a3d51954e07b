//! Sync envelope and server session models

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Note, NoteId};

/// Payload posted to the sync endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Every active local note
    pub notes: Vec<Note>,
    /// Tombstoned note ids the server has not been told about yet
    #[serde(default)]
    pub deleted_ids: Vec<NoteId>,
}

/// Sync endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// The server's authoritative collection; `None` when omitted
    #[serde(default)]
    pub notes: Option<Vec<Note>>,
}

/// Server-issued session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_response_tolerates_missing_notes() {
        let response: SyncResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(response.success);
        assert!(response.notes.is_none());
        assert!(response.message.is_none());
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = AuthSession {
            token: "secret-bearer".to_string(),
            user_id: "u1".to_string(),
            username: "hubble".to_string(),
            email: None,
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-bearer"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
