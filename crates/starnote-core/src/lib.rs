//! starnote-core - Core library for Starnote
//!
//! This crate contains the shared models, preference-backed stores, REST
//! client, and sync logic used by every Starnote front end.

pub mod api;
pub mod auth;
pub mod config;
pub mod constellations;
pub mod error;
pub mod export;
pub mod models;
pub mod prefs;
pub mod services;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Note, NoteId, User};
pub use services::AppContext;
