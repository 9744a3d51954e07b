//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// An opaque note identifier.
///
/// Locally created notes get a UUID v7 (time-sortable), but identifiers handed
/// back by the sync server are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Note ID cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A diary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, never reassigned
    pub id: NoteId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-text body
    #[serde(default)]
    pub content: String,
    /// Creation/modification timestamp (Unix ms)
    pub timestamp: i64,
    /// Ordered tag labels
    #[serde(default)]
    pub tags: Vec<String>,
    /// Soft delete flag
    #[serde(default)]
    pub is_deleted: bool,
}

impl Note {
    /// Create a new note stamped with the current time
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            name: name.into().trim().to_string(),
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            tags: Vec::new(),
            is_deleted: false,
        }
    }

    /// Replace the tag list, normalizing and deduplicating labels
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Override the timestamp
    #[must_use]
    pub const fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Name when present, otherwise the first line of the body, truncated to
    /// `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let source = if self.name.trim().is_empty() {
            self.content.lines().next().unwrap_or("")
        } else {
            self.name.as_str()
        };
        source.trim().chars().take(max_len).collect()
    }

    /// A note with neither a name nor a body counts as empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.content.trim().is_empty()
    }

    #[must_use]
    pub fn has_tag(&self, label: &str) -> bool {
        self.tags.iter().any(|tag| tag == label)
    }

    /// `start <= timestamp < end`
    #[must_use]
    pub const fn is_within(&self, start: i64, end: i64) -> bool {
        self.timestamp >= start && self.timestamp < end
    }

    /// Case-insensitive substring match on name and body
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }
}

/// Trim a tag label, rejecting empty ones
#[must_use]
pub fn normalize_tag(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize tag labels, keeping first-seen order and dropping duplicates
///
/// # Examples
///
/// ```
/// use starnote_core::models::normalize_tags;
///
/// let tags = normalize_tags([" orion ", "", "moon", "orion"]);
/// assert_eq!(tags, vec!["orion", "moon"]);
/// ```
#[must_use]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(tag) = normalize_tag(tag.as_ref()) {
            if !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }
    }
    normalized
}
