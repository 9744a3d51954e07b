//! Local user account model

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A locally registered account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Username, unique ignoring case
    pub username: String,
    /// Optional email, unique ignoring case when present
    #[serde(default)]
    pub email: Option<String>,
    /// Stored credential, as produced by the active `CredentialPolicy`
    pub password: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl User {
    /// Create a new user with a stored credential
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: Option<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            username: username.into(),
            email,
            password: password.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub fn username_matches(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.trim().to_lowercase()
    }

    #[must_use]
    pub fn email_matches(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == email.trim().to_lowercase())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Loose shape check: something@something.tld without whitespace
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"))
        .is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_matches_ignores_case() {
        let user = User::new("Galileo", None, "pw");
        assert!(user.username_matches("galileo"));
        assert!(user.username_matches(" GALILEO "));
        assert!(!user.username_matches("kepler"));
    }

    #[test]
    fn test_email_matches_requires_email() {
        let without = User::new("a", None, "pw");
        assert!(!without.email_matches("a@example.com"));

        let with = User::new("b", Some("B@Example.com".to_string()), "pw");
        assert!(with.email_matches("b@example.com"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let user = User::new("tycho", None, "hunter2");
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("halley@comet.org"));
        assert!(!is_plausible_email("halley"));
        assert!(!is_plausible_email("hal ley@comet.org"));
    }
}
