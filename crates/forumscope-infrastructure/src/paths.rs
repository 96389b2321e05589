//! Path management for forumscope configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/forumscope/
//! └── config.toml              # Client and search settings
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

const APP_DIR: &str = "forumscope";

/// Resolves forumscope's well-known paths.
pub struct ForumscopePaths;

impl ForumscopePaths {
    /// Returns the configuration directory (`~/.config/forumscope/`).
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join(APP_DIR))
    }

    /// Returns the path to the settings file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
