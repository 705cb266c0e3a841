//! Persisted session record.
//!
//! A single namespaced JSON file holds `{user, token, role}`. It is
//! written on login, overwritten on every credential change, and removed
//! on logout or detected expiry.

use clp_common::types::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace of the stored record; the on-disk file is `clp_auth.json`.
pub const STORAGE_KEY: &str = "clp_auth";

/// The authenticated session as issued by the backend.
///
/// `user` is an opaque profile object; the guard never looks inside it.
/// A non-null token implies it carried a valid expiry at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: serde_json::Value,
    pub token: String,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to persist session record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed store for the session record.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing or corrupt record reads as no
    /// session at all; corruption is not an error the caller can act on.
    pub fn read(&self) -> Option<AuthSession> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Write the session record, replacing any previous one.
    pub fn write(&self, session: &AuthSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    /// Remove the session record. Removing an absent record is a no-op.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
