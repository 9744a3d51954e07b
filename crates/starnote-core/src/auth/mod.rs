//! Server-backed accounts: register, login, logout, profile updates.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{AccountApi, ApiError, LoginRequest, ProfileUpdate, RegisterRequest, RemoteUser};
use crate::models::{is_plausible_email, AuthSession};
use crate::store::SessionPersistence;
use crate::util::non_blank;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Not signed in.")]
    Unauthenticated,
    #[error("Account server is not configured. Set STARNOTE_API_URL or api_base_url.")]
    NotConfigured,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] crate::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;

pub struct AccountService<A: AccountApi> {
    api: A,
    session: Arc<dyn SessionPersistence>,
}

impl<A: AccountApi> AccountService<A> {
    pub fn new(api: A, session: Arc<dyn SessionPersistence>) -> Self {
        Self { api, session }
    }

    pub async fn register(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> AccountResult<AuthSession> {
        let username = username.trim();
        validate_credentials(username, password)?;
        let email = email.map(str::trim).filter(|email| !email.is_empty());
        if email.is_some_and(|email| !is_plausible_email(email)) {
            return Err(AccountError::Validation("Email address is not valid"));
        }

        let session = self
            .api
            .register(&RegisterRequest {
                username,
                email,
                password,
            })
            .await?;
        self.session.save_session(&session)?;
        tracing::info!("Registered account '{}'", session.username);
        Ok(session)
    }

    pub async fn login(&self, username: &str, password: &str) -> AccountResult<AuthSession> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let session = self
            .api
            .login(&LoginRequest { username, password })
            .await?;
        self.session.save_session(&session)?;
        tracing::info!("Signed in as '{}'", session.username);
        Ok(session)
    }

    /// Change username and/or email on the server and refresh the stored
    /// session profile
    pub async fn update_profile(
        &self,
        username: Option<String>,
        email: Option<String>,
    ) -> AccountResult<RemoteUser> {
        let update = ProfileUpdate {
            username: non_blank(username),
            email: non_blank(email),
        };
        if update.username.is_none() && update.email.is_none() {
            return Err(AccountError::Validation("Nothing to update"));
        }
        if update
            .email
            .as_deref()
            .is_some_and(|email| !is_plausible_email(email))
        {
            return Err(AccountError::Validation("Email address is not valid"));
        }

        let Some(mut session) = self.session.load_session()? else {
            return Err(AccountError::Unauthenticated);
        };

        let user = self
            .api
            .update_profile(&session.token, &session.user_id, &update)
            .await?;
        session.username.clone_from(&user.username);
        session.email.clone_from(&user.email);
        self.session.save_session(&session)?;
        Ok(user)
    }
}

fn validate_credentials(username: &str, password: &str) -> AccountResult<()> {
    if username.is_empty() {
        return Err(AccountError::Validation("Username is required"));
    }
    if password.is_empty() {
        return Err(AccountError::Validation("Password is required"));
    }
    Ok(())
}
