//! Persisted UI session state.
//!
//! The only session datum is the current organization slug. It lives in a
//! small JSON file in the platform data directory (overridable with
//! `PMB_SESSION`) so the CLI and the board agree on which organization is
//! active across invocations.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SESSION_FILE: &str = "session.json";
const SESSION_ENV: &str = "PMB_SESSION";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub current_org: String,
    pub updated_at: DateTime<Utc>,
}

/// Session file access with atomic writes.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location, honoring the `PMB_SESSION` override.
    pub fn open_default() -> Result<Self> {
        let path = default_session_path().ok_or_else(|| {
            Error::OperationFailed("cannot determine a session file location".to_string())
        })?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Temp file + rename so a concurrent reader never sees a partial write
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(serde_json::to_string_pretty(session)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Current organization slug, falling back when the file is missing or
    /// unreadable.
    pub fn current_org(&self, fallback: &str) -> String {
        match self.load() {
            Ok(Some(session)) if !session.current_org.trim().is_empty() => session.current_org,
            _ => fallback.to_string(),
        }
    }

    pub fn set_current_org(&self, slug: &str) -> Result<()> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(Error::InvalidArgument(
                "organization slug cannot be empty".to_string(),
            ));
        }
        self.save(&Session {
            current_org: slug.to_string(),
            updated_at: Utc::now(),
        })
    }
}

/// Default session file location.
pub fn default_session_path() -> Option<PathBuf> {
    if let Ok(value) = std::env::var(SESSION_ENV) {
        if !value.trim().is_empty() {
            return Some(PathBuf::from(value));
        }
    }
    directories::ProjectDirs::from("", "", "pmb")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE))
}
