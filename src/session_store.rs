//! Logged session persistence
//!
//! Each CLI invocation is a separate process, so the session obtained by
//! `login` is kept in a small JSON file for the commands that follow.

use std::io;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::azkaban::LoggedSession;

/// JSON file holding the last logged session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; a missing file means logged out
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<Option<LoggedSession>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `session`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, session: &LoggedSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;

        // The session id is a bearer credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.path.display(), "saved session");
        Ok(())
    }

    /// Remove the stored session
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Default session file: `~/.local/share/azkaban/session.json` on Linux
pub fn default_session_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.data_dir().join("azkaban").join("session.json"))
}
