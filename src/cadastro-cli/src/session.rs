//! Stored operator session
//!
//! The access token lives in a plain file, the terminal equivalent of
//! the browser client's `token` key in local storage. No token file
//! means requests go out unauthenticated and fail server-side.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Session {
    path: PathBuf,
}

impl Session {
    /// Use the given token file, or the default
    /// `$HOME/.cadastro/token` when none is configured.
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cadastro")
                .join("token")
        });
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token, if any
    pub fn load_token(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Persist a token, creating the parent directory when needed
    pub fn store_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the stored token. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(Some(dir.path().join("nested").join("token")));

        assert!(session.load_token().is_none());

        session.store_token("abc.def").unwrap();
        assert_eq!(session.load_token().as_deref(), Some("abc.def"));

        assert!(session.clear().unwrap());
        assert!(session.load_token().is_none());
        assert!(!session.clear().unwrap());
    }

    #[test]
    fn test_blank_token_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(Some(dir.path().join("token")));
        session.store_token("  \n").unwrap();
        assert!(session.load_token().is_none());
    }
}
