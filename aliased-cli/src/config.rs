//! Configuration module
//!
//! Resolves where the tool reads and writes its files.

use aliased_core::ToolPaths;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Locations under `<home>/.aws`
    pub paths: ToolPaths,
}

impl Config {
    /// Uses `home` when given, else the user's home directory
    pub fn new(home: Option<PathBuf>) -> Result<Self> {
        let paths = match home {
            Some(home) => ToolPaths::new(home),
            None => ToolPaths::from_home().context("Failed to resolve the home directory")?,
        };

        Ok(Self { paths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_home() {
        let config = Config::new(Some(PathBuf::from("/tmp/operator"))).unwrap();
        assert_eq!(
            config.paths.state_file(),
            PathBuf::from("/tmp/operator/.aws/aliased-profiles/state.json")
        );
    }
}
