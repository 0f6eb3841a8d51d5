use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::User;

/// Well-known key the current user is cached under.
pub const SESSION_KEY: &str = "currentUser";

/// JSON file cache of the authenticated user: `<dir>/currentUser.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<User>, AppError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(
                    AppError::new("SESSION_READ_FAILED", "Failed to read stored session")
                        .with_details(format!("path={}; err={e}", self.path.display())),
                )
            }
        };
        let user = serde_json::from_str(&text).map_err(|e| {
            AppError::new("SESSION_READ_FAILED", "Stored session is not valid JSON")
                .with_details(format!("path={}; err={e}", self.path.display()))
        })?;
        Ok(Some(user))
    }

    pub fn save(&self, user: &User) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new("SESSION_WRITE_FAILED", "Failed to create session directory")
                    .with_details(format!("path={}; err={e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(user).map_err(|e| {
            AppError::new("SESSION_WRITE_FAILED", "Failed to encode session")
                .with_details(e.to_string())
        })?;
        fs::write(&self.path, json).map_err(|e| {
            AppError::new("SESSION_WRITE_FAILED", "Failed to write session")
                .with_details(format!("path={}; err={e}", self.path.display()))
        })
    }

    /// Remove the cached user. Missing files are fine.
    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(
                AppError::new("SESSION_WRITE_FAILED", "Failed to clear stored session")
                    .with_details(format!("path={}; err={e}", self.path.display())),
            ),
        }
    }
}
