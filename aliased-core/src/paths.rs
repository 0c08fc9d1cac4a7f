//! Filesystem layout
//!
//! Everything the tool owns lives in `<home>/.aws/aliased-profiles/`.
//! The provider's own config file sits one level up in `<home>/.aws/`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Directory under `~/.aws` that belongs to this tool
pub const TOOL_DIR_NAME: &str = "aliased-profiles";

/// Persisted account list
pub const STATE_FILENAME: &str = "state.json";

/// User-editable profile template
pub const TEMPLATE_FILENAME: &str = "config.tmpl";

/// The provider's config file that profiles are spliced into
pub const AWS_CONFIG_FILENAME: &str = "config";

/// Mode of the tool directory when it is created
pub const DIR_MODE: u32 = 0o755;

/// Mode of files written by the tool
pub const FILE_MODE: u32 = 0o644;

/// Absolute paths derived from a home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    home: PathBuf,
}

impl ToolPaths {
    /// Paths rooted at an explicit home directory
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Paths rooted at the current user's home directory
    pub fn from_home() -> Result<Self> {
        home::home_dir()
            .map(Self::new)
            .ok_or(StoreError::HomeNotFound)
    }

    /// `<home>/.aws`
    pub fn aws_dir(&self) -> PathBuf {
        self.home.join(".aws")
    }

    /// `<home>/.aws/aliased-profiles`
    pub fn tool_dir(&self) -> PathBuf {
        self.aws_dir().join(TOOL_DIR_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.tool_dir().join(STATE_FILENAME)
    }

    pub fn template_file(&self) -> PathBuf {
        self.tool_dir().join(TEMPLATE_FILENAME)
    }

    pub fn aws_config_file(&self) -> PathBuf {
        self.aws_dir().join(AWS_CONFIG_FILENAME)
    }

    /// Creates the tool directory (and `~/.aws` if needed) when missing
    pub fn ensure_tool_dir(&self) -> Result<PathBuf> {
        let dir = self.tool_dir();
        if !dir.is_dir() {
            create_dir(&dir)?;
        }
        Ok(dir)
    }
}

/// Creates a directory and its missing parents with [`DIR_MODE`]
#[cfg(unix)]
pub fn create_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| StoreError::io("failed to create directory", dir, e))
}

#[cfg(not(unix))]
pub fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io("failed to create directory", dir, e))
}

/// Truncates and writes a file, creating it with [`FILE_MODE`]
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options
        .open(path)
        .map_err(|e| StoreError::io("failed to open", path, e))?;
    file.write_all(contents)
        .map_err(|e| StoreError::io("failed to write", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = ToolPaths::new("/home/ops");
        assert_eq!(paths.aws_dir(), PathBuf::from("/home/ops/.aws"));
        assert_eq!(
            paths.state_file(),
            PathBuf::from("/home/ops/.aws/aliased-profiles/state.json")
        );
        assert_eq!(
            paths.template_file(),
            PathBuf::from("/home/ops/.aws/aliased-profiles/config.tmpl")
        );
        assert_eq!(paths.aws_config_file(), PathBuf::from("/home/ops/.aws/config"));
    }

    #[test]
    fn test_ensure_tool_dir_creates_missing_dirs() {
        let home = tempfile::tempdir().unwrap();
        let paths = ToolPaths::new(home.path());

        let dir = paths.ensure_tool_dir().unwrap();
        assert!(dir.is_dir());

        // Second call is a no-op
        assert_eq!(paths.ensure_tool_dir().unwrap(), dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_and_dir_modes() {
        use std::os::unix::fs::PermissionsExt;

        let home = tempfile::tempdir().unwrap();
        let paths = ToolPaths::new(home.path());
        let dir = paths.ensure_tool_dir().unwrap();

        let file = dir.join("probe");
        write_file(&file, b"x").unwrap();

        let umask_safe = |mode: u32| mode & 0o700;
        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(umask_safe(dir_mode), 0o700);
        assert_eq!(umask_safe(file_mode), 0o600);
        assert_eq!(file_mode & 0o111, 0);
    }
}
