//! Durable client-side storage for the session.
//!
//! Two string entries live here: the bearer token and the serialized
//! identity snapshot. They are written together after a successful sign-in
//! and cleared together on logout or on any unauthorized response.

use anyhow::Result;
use shared::User;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// String key-value storage that survives process restarts
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    /// Identity snapshot, `None` if absent or unreadable
    fn user(&self) -> Option<User> {
        let raw = self.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Discarding unreadable identity snapshot: {}", e);
                None
            }
        }
    }

    fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.set(USER_KEY, &json)
    }

    /// Drop both entries
    fn purge(&self) -> Result<()> {
        self.remove(TOKEN_KEY)?;
        self.remove(USER_KEY)
    }
}

type Entries = BTreeMap<String, String>;

/// TOML file in the platform data directory, rewritten atomically on every change.
/// The in-memory entries only change once the file write has succeeded.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match toml::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    // Replaced by the next write
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    Entries::default()
                }
            }
        } else {
            Entries::default()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }

        let content = toml::to_string(entries)?;
        let tmp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, content)?;

        // Token file is owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Process-local storage, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("session storage lock poisoned"))?
            .remove(key);
        Ok(())
    }
}
