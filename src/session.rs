//! On-disk session persistence
//!
//! Provides a `SessionStore` that keeps the bearer token and signed-in user
//! in a JSON file under the XDG data directory. A session is valid for 24
//! hours from login; an older file is treated as absent and removed.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::User;

/// How long a saved session stays usable
pub const SESSION_LIFETIME_HOURS: i64 = 24;

const SESSION_FILE: &str = "session.json";

/// Errors that can occur when saving or clearing a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// No home directory to derive the data directory from
    #[error("Could not determine a data directory for the session file")]
    NoDataDir,

    /// Reading, writing or removing the session file failed
    #[error("Session file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The session could not be encoded
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A saved login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// User the token belongs to
    pub user: User,
    /// When the login happened
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            user,
            issued_at: Utc::now(),
        }
    }

    /// Whether the session has outlived `SESSION_LIFETIME_HOURS` at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::hours(SESSION_LIFETIME_HOURS)
    }
}

/// Reads and writes the session file
///
/// The store lives in `~/.local/share/provider-console/` on Linux, or the
/// equivalent data directory on other platforms.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Creates a store in the platform data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "provider-console")?;
        Some(Self {
            dir: project_dirs.data_dir().to_path_buf(),
        })
    }

    /// Creates a store in a specific directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the session file
    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Writes `session`, replacing any previous one
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(session)?;
        fs::write(self.path(), json)?;
        debug!(path = %self.path().display(), "session saved");
        Ok(())
    }

    /// Loads the saved session if one exists and is still valid
    ///
    /// # Returns
    /// * `Some(Session)` for a readable session younger than 24 hours
    /// * `None` if there is no file, it cannot be parsed, or it has expired
    pub fn load(&self) -> Option<Session> {
        self.load_at(Utc::now())
    }

    fn load_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let content = fs::read_to_string(self.path()).ok()?;
        let session: Session = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session file");
                return None;
            }
        };

        if session.is_expired_at(now) {
            debug!(issued_at = %session.issued_at, "session expired");
            if let Err(err) = self.clear() {
                warn!(error = %err, "could not remove expired session");
            }
            return None;
        }

        Some(session)
    }

    /// Removes the session file; succeeds if there is none
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
