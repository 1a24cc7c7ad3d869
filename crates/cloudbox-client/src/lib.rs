//! # cloudbox-client
//!
//! The entry repository client: the abstract contract the state core talks
//! to ([`EntryRepository`]) plus its HTTP implementation against the
//! CloudBox API gateway, with bearer-token injection from the session store.

pub mod auth;
pub mod http;
pub mod repository;
mod transport;
mod wire;

pub use auth::{AuthApi, RegisterRequest};
pub use http::HttpEntryRepository;
pub use repository::{EntryRepository, FileUpload};
