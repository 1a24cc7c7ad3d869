//! Local session persistence configuration.

use serde::{Deserialize, Serialize};

/// Settings for the persisted session (token + profile).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the JSON file the session is persisted to.
    #[serde(default = "default_session_file")]
    pub file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

fn default_session_file() -> String {
    ".cloudbox/session.json".to_string()
}
