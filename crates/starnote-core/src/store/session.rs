//! Server session persistence over the `auth` preference file

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::AuthSession;
use crate::prefs::PreferenceStore;

const AUTH_FILE: &str = "auth";
const KEY_TOKEN: &str = "token";
const KEY_USER_ID: &str = "user_id";
const KEY_SESSION: &str = "session";

/// Display fields kept next to the token; never the token itself
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionProfile {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: Option<String>,
}

pub trait SessionPersistence: Send + Sync {
    fn load_session(&self) -> Result<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> Result<()>;
    fn clear_session(&self) -> Result<()>;

    /// Bearer token of the stored session, if any
    fn token(&self) -> Result<Option<String>> {
        Ok(self.load_session()?.map(|session| session.token))
    }
}

#[derive(Clone)]
pub struct PreferenceSessionStore {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceSessionStore {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }
}

impl SessionPersistence for PreferenceSessionStore {
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let prefs = self.store.load(AUTH_FILE)?;
        let Some(token) = prefs
            .get_string(KEY_TOKEN)
            .map(str::trim)
            .filter(|token| !token.is_empty())
        else {
            return Ok(None);
        };

        // Token and user id are the source of truth; the profile blob is extra.
        let user_id = prefs.get_string(KEY_USER_ID).unwrap_or_default().to_string();
        let profile = prefs
            .get_json::<SessionProfile>(KEY_SESSION)
            .unwrap_or_default();
        Ok(Some(AuthSession {
            token: token.to_string(),
            user_id,
            username: profile.username,
            email: profile.email,
        }))
    }

    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let mut prefs = self.store.load(AUTH_FILE)?;
        prefs.put_string(KEY_TOKEN, session.token.clone());
        prefs.put_string(KEY_USER_ID, session.user_id.clone());
        prefs.put_json(
            KEY_SESSION,
            &SessionProfile {
                username: session.username.clone(),
                email: session.email.clone(),
            },
        )?;
        self.store.commit(&prefs)?;
        tracing::debug!("Stored session for user {}", session.user_id);
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut prefs = self.store.load(AUTH_FILE)?;
        let removed = [KEY_TOKEN, KEY_USER_ID, KEY_SESSION]
            .into_iter()
            .fold(false, |removed, key| prefs.remove(key) || removed);
        if removed {
            self.store.commit(&prefs)?;
        }
        Ok(())
    }
}
