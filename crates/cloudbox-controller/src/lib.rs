//! # cloudbox-controller
//!
//! The state-synchronization core of the CloudBox client: keeps the
//! client-side view of the server-owned file tree and per-file version
//! chains consistent across navigation, mutation, and overlapping
//! asynchronous operations.
//!
//! Controllers are cheap cloneable handles over shared state. All
//! repository calls are non-blocking; locks are never held across an
//! await. Stale completions are discarded at apply time by sequence
//! tagging, so a slow reload for one folder can never overwrite the list
//! of another.

pub mod entries;
pub mod navigation;
pub mod pending;
pub mod upload;
pub mod versions;

#[cfg(test)]
pub(crate) mod testing;

pub use entries::{EntryAction, EntryList};
pub use navigation::{Crumb, FolderNavigator, ROOT_LABEL};
pub use pending::{ActionKind, ActionTarget, PendingAction};
pub use upload::{StagedUpload, UploadOrchestrator, MAX_UPLOAD_BYTES};
pub use versions::{ConfirmationGate, GateKind, TargetFile, VersionController};
