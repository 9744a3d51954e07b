//! Explicitly constructed application context.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{AccountError, AccountResult, AccountService};
use crate::config::AppConfig;
use crate::constellations::ConstellationLog;
use crate::error::{Error, Result};
use crate::models::{AuthSession, NoteId};
use crate::prefs::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use crate::store::{
    NoteRepository, PreferenceNoteRepository, PreferenceSessionStore, PreferenceUserRepository,
    SessionPersistence, UserRepository,
};
use crate::sync::{SyncCoordinator, SyncError, SyncReport, SyncResult};

/// Owns every store and service a front end needs
///
/// Built once at startup and passed by reference. Dropping it releases
/// everything; there is no other global state.
pub struct AppContext {
    config: AppConfig,
    data_dir: Option<PathBuf>,
    notes: Arc<dyn NoteRepository>,
    users: Arc<dyn UserRepository>,
    session: Arc<dyn SessionPersistence>,
    constellations: ConstellationLog,
    sync: Option<SyncCoordinator<ApiClient>>,
    accounts: Option<AccountService<ApiClient>>,
}

impl AppContext {
    /// Open file-backed stores under the configured data directory
    pub fn open(config: AppConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let store = FilePreferenceStore::open(&data_dir)?;
        tracing::debug!("Opened preference store at {}", data_dir.display());

        let api = match config.api_base_url.as_deref() {
            Some(url) => Some(
                ApiClient::new(url, config.http_timeouts())
                    .map_err(|error| Error::Config(error.to_string()))?,
            ),
            None => None,
        };

        let mut context = Self::assemble(config, Arc::new(store), api);
        context.data_dir = Some(data_dir);
        Ok(context)
    }

    /// Memory-backed context with no server
    pub fn open_in_memory() -> Self {
        Self::assemble(
            AppConfig::default(),
            Arc::new(MemoryPreferenceStore::new()),
            None,
        )
    }

    /// Wire stores over `store`; `api` enables sync and remote accounts
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn PreferenceStore>,
        api: Option<ApiClient>,
    ) -> Self {
        Self::assemble(config, store, api)
    }

    fn assemble(config: AppConfig, store: Arc<dyn PreferenceStore>, api: Option<ApiClient>) -> Self {
        let notes: Arc<dyn NoteRepository> = Arc::new(PreferenceNoteRepository::new(store.clone()));
        let users: Arc<dyn UserRepository> = Arc::new(PreferenceUserRepository::new(store.clone()));
        let session: Arc<dyn SessionPersistence> =
            Arc::new(PreferenceSessionStore::new(store.clone()));
        let constellations = ConstellationLog::new(store);

        let (sync, accounts) = match api {
            Some(api) => (
                Some(SyncCoordinator::new(
                    api.clone(),
                    notes.clone(),
                    session.clone(),
                )),
                Some(AccountService::new(api, session.clone())),
            ),
            None => (None, None),
        };

        Self {
            config,
            data_dir: None,
            notes,
            users,
            session,
            constellations,
            sync,
            accounts,
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `None` for memory-backed contexts
    pub fn data_dir(&self) -> Option<&std::path::Path> {
        self.data_dir.as_deref()
    }

    pub fn notes(&self) -> &dyn NoteRepository {
        self.notes.as_ref()
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    pub fn session(&self) -> &dyn SessionPersistence {
        self.session.as_ref()
    }

    pub const fn constellations(&self) -> &ConstellationLog {
        &self.constellations
    }

    pub const fn is_remote_configured(&self) -> bool {
        self.sync.is_some()
    }

    fn sync_coordinator(&self) -> SyncResult<&SyncCoordinator<ApiClient>> {
        match &self.sync {
            Some(coordinator) => Ok(coordinator),
            None if self.session.token()?.is_none() => Err(SyncError::Unauthenticated),
            None => Err(SyncError::NotConfigured),
        }
    }

    /// Remote account service, if a server is configured
    pub fn accounts(&self) -> AccountResult<&AccountService<ApiClient>> {
        self.accounts.as_ref().ok_or(AccountError::NotConfigured)
    }

    /// Stored server session, whether or not a server is configured
    pub fn current_session(&self) -> Result<Option<AuthSession>> {
        self.session.load_session()
    }

    /// Forget the server session; returns false if there was none
    ///
    /// Works without a configured server, since no remote state is revoked.
    pub fn logout(&self) -> Result<bool> {
        let signed_in = self.session.load_session()?.is_some();
        self.session.clear_session()?;
        if signed_in {
            tracing::info!("Signed out of the sync server");
        }
        Ok(signed_in)
    }

    pub async fn sync(&self) -> SyncResult<SyncReport> {
        self.sync_coordinator()?.sync().await
    }

    pub async fn push_note(&self, id: &NoteId) -> SyncResult<()> {
        self.sync_coordinator()?.push_note(id).await
    }

    pub async fn delete_remote_note(&self, id: &NoteId) -> SyncResult<()> {
        self.sync_coordinator()?.delete_remote_note(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoteDraft;
    use tempfile::tempdir;

    fn signed_in(context: &AppContext) {
        context
            .session()
            .save_session(&AuthSession {
                token: "tok".to_string(),
                user_id: "u1".to_string(),
                username: "ada".to_string(),
                email: None,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn sync_without_server_reports_auth_before_configuration() {
        let context = AppContext::open_in_memory();
        assert!(matches!(
            context.sync().await,
            Err(SyncError::Unauthenticated)
        ));

        signed_in(&context);
        assert!(matches!(context.sync().await, Err(SyncError::NotConfigured)));
        assert!(matches!(context.accounts(), Err(AccountError::NotConfigured)));
    }

    #[test]
    fn logout_works_without_server() {
        let context = AppContext::open_in_memory();
        assert!(!context.logout().unwrap());

        signed_in(&context);
        assert_eq!(context.current_session().unwrap().unwrap().username, "ada");
        assert!(context.logout().unwrap());
        assert!(context.current_session().unwrap().is_none());
        assert!(matches!(
            context.accounts(),
            Err(AccountError::NotConfigured)
        ));
    }

    #[test]
    fn file_backed_context_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };

        let created = {
            let context = AppContext::open(config.clone()).unwrap();
            assert_eq!(context.data_dir(), Some(dir.path()));
            context.constellations().mark("Orion").unwrap();
            context
                .notes()
                .create(NoteDraft {
                    name: "First light".to_string(),
                    ..NoteDraft::default()
                })
                .unwrap()
        };

        let reopened = AppContext::open(config).unwrap();
        let notes = reopened.notes().list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, created.id);
        assert_eq!(reopened.constellations().progress().unwrap().observed, 1);
    }

    #[test]
    fn configured_server_enables_remote_services() {
        let dir = tempdir().unwrap();
        let context = AppContext::open(AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            api_base_url: Some("http://localhost:9".to_string()),
            ..AppConfig::default()
        })
        .unwrap();

        assert!(context.is_remote_configured());
        assert!(context.accounts().is_ok());
    }

    #[test]
    fn invalid_server_url_is_a_config_error() {
        let dir = tempdir().unwrap();
        let result = AppContext::open(AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            api_base_url: Some("localhost".to_string()),
            ..AppConfig::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
