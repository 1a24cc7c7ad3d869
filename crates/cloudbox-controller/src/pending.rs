//! In-flight action markers.
//!
//! A [`PendingAction`] is a transient, structured marker created when an
//! action starts and destroyed when it completes or fails. It is the only
//! mutual-exclusion device in the core: two actions on the same target can
//! never be in flight at once. Targets are compared by structural
//! equality, not by concatenated string keys.

use cloudbox_core::types::EntryId;

/// What an in-flight action is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Fetching content for delivery to the download sink.
    Download,
    /// Making an older version current.
    Restore,
    /// Deleting an entry or a version.
    Delete,
    /// Uploading a staged file.
    Upload,
    /// Creating a folder.
    Create,
}

/// What an in-flight action is operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTarget {
    /// A file or folder entry.
    Entry(EntryId),
    /// One version of a file.
    Version {
        /// The owning file.
        file_id: EntryId,
        /// The version number within that file.
        number: i32,
    },
    /// A folder as an upload/creation destination (`None` = root).
    Destination(Option<EntryId>),
}

/// A transient marker for one in-flight action. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingAction {
    /// The verb.
    pub kind: ActionKind,
    /// The object.
    pub target: ActionTarget,
}

impl PendingAction {
    /// Construct a marker.
    pub fn new(kind: ActionKind, target: ActionTarget) -> Self {
        Self { kind, target }
    }

    /// Whether this action operates on the given target, regardless of kind.
    pub fn is_on(&self, target: &ActionTarget) -> bool {
        self.target == *target
    }
}
