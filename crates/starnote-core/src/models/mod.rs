//! Data models for Starnote

mod note;
mod sync;
mod user;

pub use note::{normalize_tag, normalize_tags, Note, NoteId};
pub use sync::{AuthSession, SyncRequest, SyncResponse};
pub use user::{is_plausible_email, User};
