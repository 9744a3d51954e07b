//! Application wiring shared by front ends.

mod context;

pub use context::AppContext;
