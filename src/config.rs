//! Configuration for the board synchronizer.

use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::path::Path;

/// Synchronizer behaviour switches
///
/// # Examples
///
/// ```
/// use kanban_sync::SyncConfig;
///
/// let config = SyncConfig::from_toml_str("serialize_per_board = false").unwrap();
/// assert!(!config.serialize_per_board);
/// assert!(config.select_created_board);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Queue operations that target the same board so their reloads land in order.
    /// When off, overlapping operations race and the last reload wins.
    /// Default: true
    #[serde(default = "default_true")]
    pub serialize_per_board: bool,

    /// Make a newly created board the current one
    /// Default: true
    #[serde(default = "default_true")]
    pub select_created_board: bool,

    /// Check card/column consistency of every fetched board before committing it
    /// Default: true
    #[serde(default = "default_true")]
    pub verify_reloaded_boards: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            serialize_per_board: true,
            select_created_board: true,
            verify_reloaded_boards: true,
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Loads configuration from a TOML file, falling back to defaults when it is absent
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}
