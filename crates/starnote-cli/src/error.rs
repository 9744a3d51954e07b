use std::io;

use starnote_core::auth::AccountError;
use starnote_core::sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] starnote_core::Error),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Edited note cannot be empty")]
    EmptyEditedContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Invalid time '{0}': use RFC 3339, YYYY-MM-DD, or Unix milliseconds")]
    InvalidTime(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Not signed in to a local account")]
    NoCurrentUser,
    #[error("Configuration error: {0}")]
    Config(String),
}
