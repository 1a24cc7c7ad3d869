//! # cloudbox-entity
//!
//! Domain entity models for the CloudBox client: the file/folder entry
//! union, per-file version snapshots, and the session profile.

pub mod entry;
pub mod profile;
pub mod version;

pub use entry::{Entry, FileEntry, FolderEntry};
pub use profile::SessionProfile;
pub use version::Version;
