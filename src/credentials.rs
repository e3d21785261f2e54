// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bearer token storage

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Key the token is stored under
pub const TOKEN_KEY: &str = "github_token";

/// Errors persisting a token
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Reading or writing the token file failed
    #[error("failed to access token store {}", path.display())]
    Io {
        /// Token file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
    /// The token file could not be written as JSON
    #[error("failed to serialize token store")]
    Serialize(#[from] serde_json::Error),
}

/// Source and sink of the API bearer token
pub trait CredentialProvider: Send + Sync {
    /// Current token, if any
    fn get(&self) -> Option<String>;
    /// Replace the stored token
    fn set(&self, token: &str) -> Result<(), CredentialError>;
    /// Forget the stored token
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Token held in memory only
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: Mutex<Option<String>>,
}

impl MemoryCredentials {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialProvider for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token persisted in a small JSON key-value file
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    /// Store backed by `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring unreadable token store {}: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let io_err = |source| CredentialError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        Ok(())
    }
}

impl CredentialProvider for FileCredentials {
    fn get(&self) -> Option<String> {
        self.read_entries()
            .remove(TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let mut entries = self.read_entries();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        debug!("stored token in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut entries = self.read_entries();
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
            debug!("cleared token in {}", self.path.display());
        }
        Ok(())
    }
}
