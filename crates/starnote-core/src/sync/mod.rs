//! Whole-list note synchronization.
//!
//! A sync posts every active local note (plus the tombstone set) and then
//! replaces the local collection with whatever the server answers. There is
//! no per-note merge: the server's list wins outright.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::NotesApi;
use crate::models::{NoteId, SyncRequest};
use crate::store::{NoteRepository, SessionPersistence};
use crate::util::unix_timestamp_ms;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not signed in. Log in to an account before syncing.")]
    Unauthenticated,
    #[error("Sync server is not configured. Set STARNOTE_API_URL or api_base_url.")]
    NotConfigured,
    /// Transport failure, non-success status, or a rejected sync
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Storage(#[from] crate::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// What a finished sync did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Active notes sent
    pub sent: usize,
    /// Tombstones sent
    pub deleted_sent: usize,
    /// Notes the server returned; `None` when the response had no list
    pub received: Option<usize>,
    pub message: Option<String>,
    pub synced_at: i64,
}

pub struct SyncCoordinator<A: NotesApi> {
    api: A,
    notes: Arc<dyn NoteRepository>,
    session: Arc<dyn SessionPersistence>,
    in_flight: Mutex<()>,
}

impl<A: NotesApi> SyncCoordinator<A> {
    pub fn new(
        api: A,
        notes: Arc<dyn NoteRepository>,
        session: Arc<dyn SessionPersistence>,
    ) -> Self {
        Self {
            api,
            notes,
            session,
            in_flight: Mutex::new(()),
        }
    }

    fn require_token(&self) -> SyncResult<String> {
        self.session.token()?.ok_or(SyncError::Unauthenticated)
    }

    /// Push the local collection and adopt the server's answer
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        let token = self.require_token()?;
        let _in_flight = self.in_flight.lock().await;

        let request = SyncRequest {
            notes: self.notes.list()?,
            deleted_ids: self.notes.deleted_ids()?,
        };
        tracing::info!(
            "Syncing {} notes and {} deletions",
            request.notes.len(),
            request.deleted_ids.len()
        );

        let response = self
            .api
            .sync_notes(&token, &request)
            .await
            .map_err(|error| SyncError::Failed(error.to_string()))?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Sync was rejected by the server".to_string());
            tracing::warn!("Sync rejected: {}", message);
            return Err(SyncError::Failed(message));
        }

        let received = response.notes.as_ref().map(Vec::len);
        let synced_at = unix_timestamp_ms();
        self.notes
            .replace_from_server(response.notes, &request.deleted_ids, synced_at)?;

        tracing::info!(
            "Sync completed; server returned {} notes",
            received.map_or_else(|| "no".to_string(), |count| count.to_string())
        );
        Ok(SyncReport {
            sent: request.notes.len(),
            deleted_sent: request.deleted_ids.len(),
            received,
            message: response.message,
            synced_at,
        })
    }

    /// Send one active note to the server
    pub async fn push_note(&self, id: &NoteId) -> SyncResult<()> {
        let token = self.require_token()?;
        let note = self
            .notes
            .get(id)?
            .ok_or_else(|| crate::Error::NotFound(id.to_string()))?;
        self.api
            .upsert_note(&token, &note)
            .await
            .map_err(|error| SyncError::Failed(error.to_string()))?;
        tracing::info!("Pushed note {}", id);
        Ok(())
    }

    /// Delete one note on the server; local state is left alone
    pub async fn delete_remote_note(&self, id: &NoteId) -> SyncResult<()> {
        let token = self.require_token()?;
        self.api
            .delete_note(&token, id)
            .await
            .map_err(|error| SyncError::Failed(error.to_string()))?;
        tracing::info!("Deleted note {} on server", id);
        Ok(())
    }

    pub fn last_synced_at(&self) -> SyncResult<Option<i64>> {
        Ok(self.notes.last_synced_at()?)
    }
}
