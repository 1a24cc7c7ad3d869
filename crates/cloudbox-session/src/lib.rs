//! # cloudbox-session
//!
//! Process-wide session state for the CloudBox client: the bearer token and
//! the current user profile, held in an explicit container with a defined
//! lifecycle (hydrate on start, write on login, clear on logout) instead of
//! ambient global mutable memory.

pub mod persistence;
pub mod store;

pub use persistence::{JsonFileSession, MemorySession, PersistedSession, SessionPersistence};
pub use store::SessionStore;
