//! Local account registry over the `users` preference file

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::{is_plausible_email, User};
use crate::prefs::{PreferenceStore, Preferences};
use crate::util::non_blank;

const USERS_FILE: &str = "users";
const KEY_USERS: &str = "users";
const KEY_CURRENT_USER: &str = "current_user";

/// How passwords are stored and checked
///
/// Every call site goes through this trait, so a hashing policy can replace
/// `PlaintextCredentials` without touching the repository.
pub trait CredentialPolicy: Send + Sync {
    /// Produce the stored form of `password`
    fn seal(&self, password: &str) -> String;

    /// Check `candidate` against a stored credential
    fn verify(&self, sealed: &str, candidate: &str) -> bool;
}

/// Stores passwords as given and compares them exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCredentials;

impl CredentialPolicy for PlaintextCredentials {
    fn seal(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, sealed: &str, candidate: &str) -> bool {
        sealed == candidate
    }
}

/// Trait for local account operations
pub trait UserRepository: Send + Sync {
    /// Register a new account; username and email must be unique ignoring case
    fn register(&self, username: &str, email: Option<&str>, password: &str) -> Result<User>;

    /// Check credentials and make the account current
    fn login(&self, username: &str, password: &str) -> Result<User>;

    fn current_user(&self) -> Result<Option<User>>;

    fn set_current_user(&self, user: &User) -> Result<()>;

    fn clear_current_user(&self) -> Result<()>;

    /// Replace a password after checking the old one
    fn update_password(&self, username: &str, old_password: &str, new_password: &str)
        -> Result<()>;

    /// Remove an account, clearing the current user if it is the one removed
    fn delete(&self, username: &str) -> Result<()>;

    fn find(&self, username: &str) -> Result<Option<User>>;

    fn list(&self) -> Result<Vec<User>>;
}

/// `PreferenceStore`-backed implementation of `UserRepository`
pub struct PreferenceUserRepository<C: CredentialPolicy = PlaintextCredentials> {
    store: Arc<dyn PreferenceStore>,
    credentials: C,
    write_lock: Mutex<()>,
}

impl PreferenceUserRepository<PlaintextCredentials> {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self::with_credentials(store, PlaintextCredentials)
    }
}

impl<C: CredentialPolicy> PreferenceUserRepository<C> {
    pub fn with_credentials(store: Arc<dyn PreferenceStore>, credentials: C) -> Self {
        Self {
            store,
            credentials,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))
    }

    fn load(&self) -> Result<(Preferences, Vec<User>)> {
        let prefs = self.store.load(USERS_FILE)?;
        let users = prefs.get_json::<Vec<User>>(KEY_USERS).unwrap_or_default();
        Ok((prefs, users))
    }

    fn save(&self, mut prefs: Preferences, users: &[User]) -> Result<()> {
        prefs.put_json(KEY_USERS, users)?;
        self.store.commit(&prefs)
    }
}

fn require(value: &str, field: &str) -> Result<String> {
    non_blank(Some(value.to_string()))
        .ok_or_else(|| Error::InvalidInput(format!("{field} is required")))
}

fn require_password(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

impl<C: CredentialPolicy> UserRepository for PreferenceUserRepository<C> {
    fn register(&self, username: &str, email: Option<&str>, password: &str) -> Result<User> {
        let username = require(username, "Username")?;
        require_password(password, "Password")?;
        let email = non_blank(email.map(ToString::to_string));
        if let Some(email) = email.as_deref() {
            if !is_plausible_email(email) {
                return Err(Error::InvalidInput(format!("'{email}' is not an email")));
            }
        }

        let _guard = self.lock()?;
        let (prefs, mut users) = self.load()?;

        if users.iter().any(|user| user.username_matches(&username)) {
            return Err(Error::DuplicateUsername(username));
        }
        if let Some(email) = email.as_deref() {
            if users.iter().any(|user| user.email_matches(email)) {
                return Err(Error::DuplicateEmail(email.to_string()));
            }
        }

        let user = User::new(username, email, self.credentials.seal(password));
        users.push(user.clone());
        self.save(prefs, &users)?;

        tracing::info!("Registered local user '{}'", user.username);
        Ok(user)
    }

    fn login(&self, username: &str, password: &str) -> Result<User> {
        let username = require(username, "Username")?;
        require_password(password, "Password")?;

        let (_, users) = self.load()?;
        let user = users
            .into_iter()
            .find(|user| {
                user.username == username && self.credentials.verify(&user.password, password)
            })
            .ok_or(Error::InvalidCredentials)?;

        self.set_current_user(&user)?;
        tracing::info!("Local user '{}' signed in", user.username);
        Ok(user)
    }

    fn current_user(&self) -> Result<Option<User>> {
        Ok(self.store.load(USERS_FILE)?.get_json(KEY_CURRENT_USER))
    }

    fn set_current_user(&self, user: &User) -> Result<()> {
        let _guard = self.lock()?;
        let mut prefs = self.store.load(USERS_FILE)?;
        prefs.put_json(KEY_CURRENT_USER, user)?;
        self.store.commit(&prefs)
    }

    fn clear_current_user(&self) -> Result<()> {
        let _guard = self.lock()?;
        let mut prefs = self.store.load(USERS_FILE)?;
        if prefs.remove(KEY_CURRENT_USER) {
            self.store.commit(&prefs)?;
        }
        Ok(())
    }

    fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        require_password(new_password, "New password")?;

        let _guard = self.lock()?;
        let (mut prefs, mut users) = self.load()?;
        let user = users
            .iter_mut()
            .find(|user| user.username_matches(username))
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;
        if !self.credentials.verify(&user.password, old_password) {
            return Err(Error::InvalidCredentials);
        }
        user.password = self.credentials.seal(new_password);
        let updated = user.clone();

        let current = prefs.get_json::<User>(KEY_CURRENT_USER);
        if current.is_some_and(|current| current.id == updated.id) {
            prefs.put_json(KEY_CURRENT_USER, &updated)?;
        }
        self.save(prefs, &users)?;

        tracing::info!("Updated password for local user '{}'", updated.username);
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<()> {
        let _guard = self.lock()?;
        let (mut prefs, mut users) = self.load()?;
        let index = users
            .iter()
            .position(|user| user.username_matches(username))
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;
        let removed = users.remove(index);

        let current = prefs.get_json::<User>(KEY_CURRENT_USER);
        if current.is_some_and(|current| current.id == removed.id) {
            prefs.remove(KEY_CURRENT_USER);
        }
        self.save(prefs, &users)?;

        tracing::info!("Deleted local user '{}'", removed.username);
        Ok(())
    }

    fn find(&self, username: &str) -> Result<Option<User>> {
        let (_, users) = self.load()?;
        Ok(users.into_iter().find(|user| user.username_matches(username)))
    }

    fn list(&self) -> Result<Vec<User>> {
        Ok(self.load()?.1)
    }
}
