//! Account store
//!
//! Persists the result of a discovery run as pretty-printed JSON so that
//! successive runs can be diffed by a human. Records are written in the
//! order they are given and read back in the same order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::account::Account;
use crate::error::{Result, StoreError};
use crate::paths::{self, ToolPaths};

/// Path-pinned store for the discovered account list
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<home>/.aws/aliased-profiles/state.json`
    pub fn at(paths: &ToolPaths) -> Self {
        Self::new(paths.state_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the accounts and overwrites the state file
    ///
    /// The parent directory is created when missing.
    pub fn write(&self, accounts: &[Account]) -> Result<()> {
        let mut data = serde_json::to_vec_pretty(accounts).map_err(StoreError::Serialize)?;
        data.push(b'\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                paths::create_dir(parent)?;
            }
        }

        paths::write_file(&self.path, &data)
    }

    /// Reads the accounts back in the order they were written
    pub fn read(&self) -> Result<Vec<Account>> {
        let data = fs::read(&self.path).map_err(|e| StoreError::io("failed to read", &self.path, e))?;

        serde_json::from_slice(&data).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}
