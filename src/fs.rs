//! Centralized filesystem operations for better testability.
//!
//! Remediation and backup bundles go through the `FileSystem` trait so that
//! write failures and rollbacks can be exercised against an in-memory mock.

use std::io;
use std::path::Path;

/// Trait for filesystem operations, enabling dependency injection and testing.
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write content to a file, creating it and its parent directories if needed.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation using std::fs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Global default filesystem for use when dependency injection isn't practical.
pub fn default_fs() -> &'static RealFs {
    static INSTANCE: RealFs = RealFs;
    &INSTANCE
}
