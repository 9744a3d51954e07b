pub mod account;
pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod search;
pub mod show;
pub mod sky;
pub mod sync;
pub mod tags;
pub mod user;
