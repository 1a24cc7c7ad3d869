//! Session profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudbox_core::types::UserId;

/// The authenticated user's profile as the session store holds it.
///
/// The core only reads this for quota display; profile mutation flows
/// through the external profile-update collaborator, never through the
/// navigation or version controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    /// The user's identifier.
    pub id: UserId,
    /// Login/display name.
    pub username: String,
    /// E-mail address.
    pub email: String,
    /// Bytes of storage currently used.
    pub storage_used: i64,
    /// Storage quota in bytes.
    pub storage_limit: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl SessionProfile {
    /// Bytes of storage still available under the quota.
    pub fn storage_remaining(&self) -> i64 {
        (self.storage_limit - self.storage_used).max(0)
    }
}
