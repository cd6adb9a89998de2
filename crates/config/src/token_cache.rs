//! Access token cache.
//!
//! A small keyed store at ~/.config/gridfeed/cache.json (0600 on Unix).
//! Every entry expires `TOKEN_TTL_SECS` after it was last written or read:
//! a successful read pushes the expiry forward again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Key under which the data provider access token is stored.
pub const TOKEN_KEY: &str = "token";

/// Lifetime of a cached entry, in seconds (six hours).
pub const TOKEN_TTL_SECS: i64 = 21_600;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cannot read token cache {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write token cache {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize token cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

type Entries = BTreeMap<String, CacheEntry>;

/// File-backed key/value cache with refresh-on-read expiry.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
    ttl: Duration,
}

impl TokenCache {
    /// Cache in the user's config directory.
    pub fn open_default() -> Self {
        Self::at(crate::config_dir().join("cache.json"))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key` if it has not expired at `now`.
    ///
    /// A hit refreshes the entry's expiry to `now + TTL`. An expired entry is
    /// dropped from the file.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<String>, CacheError> {
        let mut entries = self.load()?;

        let Some(entry) = entries.get_mut(key) else {
            return Ok(None);
        };

        if entry.expires_at <= now {
            log::debug!("cached {:?} expired at {}", key, entry.expires_at);
            entries.remove(key);
            self.store(&entries)?;
            return Ok(None);
        }

        entry.expires_at = now + self.ttl;
        let value = entry.value.clone();
        self.store(&entries)?;
        Ok(Some(value))
    }

    /// Store `value` under `key`, expiring `TTL` after `now`.
    pub fn put(&self, key: &str, value: &str, now: DateTime<Utc>) -> Result<(), CacheError> {
        let mut entries = self.load()?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: now + self.ttl,
            },
        );
        self.store(&entries)
    }

    /// Remove `key`. Returns true if an entry was present.
    pub fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.store(&entries)?;
        }
        Ok(existed)
    }

    /// Cached access token, refreshing its expiry.
    pub fn token(&self) -> Result<Option<String>, CacheError> {
        self.get(TOKEN_KEY, Utc::now())
    }

    pub fn set_token(&self, token: &str) -> Result<(), CacheError> {
        self.put(TOKEN_KEY, token, Utc::now())
    }

    pub fn clear_token(&self) -> Result<bool, CacheError> {
        self.remove(TOKEN_KEY)
    }

    fn load(&self) -> Result<Entries, CacheError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(source) => {
                return Err(CacheError::Read { path: self.path.clone(), source });
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A damaged cache only costs the user a re-entered token.
                log::warn!("ignoring unreadable token cache {}: {}", self.path.display(), e);
                Ok(Entries::new())
            }
        }
    }

    fn store(&self, entries: &Entries) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions).map_err(write_err)?;
        }

        Ok(())
    }
}
