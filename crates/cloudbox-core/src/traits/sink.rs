//! Download delivery trait.
//!
//! The core never decides *where* downloaded bytes end up. In a browser
//! that is the anchor-click save mechanism; in the terminal client it is
//! the filesystem. Controllers hand fetched content to a [`DownloadSink`]
//! and stay agnostic of the destination.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Receives downloaded file content under a suggested name.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Deliver `content` to the user under the suggested `name`.
    async fn save(&self, name: &str, content: Bytes) -> AppResult<()>;
}
