//! Durable token storage.
//!
//! One raw token string under a fixed file name, the desktop analog of a
//! single per-origin key-value entry. Nothing else is persisted - the
//! identity is always re-derived from the token at initialization.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Token file name inside the store directory
const TOKEN_FILE: &str = "access_token";

pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load the persisted token, if any.
    pub fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read persisted token")?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    /// Persist the token, replacing any previous one.
    ///
    /// Concurrent writers are distinct sessions writing independently;
    /// last-write-wins is fine because the broadcast bus, not this file,
    /// is the coordination mechanism.
    pub fn save(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create token directory")?;
        std::fs::write(self.token_path(), token).context("Failed to persist token")?;
        Ok(())
    }

    /// Remove the persisted token. Removing an absent token is a no-op.
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove persisted token")?;
        }
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}
