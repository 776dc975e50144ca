//! I/O boundary traits for testability
//!
//! These traits abstract the reads and writes at the edge of the process,
//! allowing services to be tested with in-memory implementations.

use std::io::{self, Read};
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Source of piped input (`-` on the command line).
pub trait StdinReader: Send + Sync {
    fn read_all(&self) -> io::Result<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
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
}

/// Reads the process's standard input to the end.
#[derive(Debug, Default)]
pub struct RealStdin;

impl StdinReader for RealStdin {
    fn read_all(&self) -> io::Result<String> {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_nested_target_when_writing_then_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("tree.json");
        let fs = RealFileSystem;

        fs.write(&target, "[]").unwrap();

        assert!(fs.exists(&target));
        assert_eq!(fs.read_to_string(&target).unwrap(), "[]");
    }
}
