//! # cloudbox-core
//!
//! Core crate for the CloudBox client. Contains the unified error system,
//! typed identifiers, configuration schemas, and the traits that connect
//! the state-synchronization core to its external collaborators.
//!
//! This crate has **no** internal dependencies on other CloudBox crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
