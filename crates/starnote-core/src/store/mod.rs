//! Repositories layered on the preference store

mod notes;
mod session;
mod users;

pub use notes::{NoteDraft, NoteRepository, PreferenceNoteRepository};
pub use session::{PreferenceSessionStore, SessionPersistence};
pub use users::{CredentialPolicy, PlaintextCredentials, PreferenceUserRepository, UserRepository};
