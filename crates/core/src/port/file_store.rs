// File store port: scratch directory reset and script materialization
use std::path::Path;

use crate::error::Result;

/// Filesystem operations needed by the launch sequence
pub trait FileStore: Send + Sync {
    /// Remove `dir` with all contents (missing is fine) and create it empty
    ///
    /// # Errors
    /// - LaunchError::Scratch if removal or creation fails
    fn reset_dir(&self, dir: &Path) -> Result<()>;

    /// Write `contents` to `path`, replacing any existing file, and mark it executable
    ///
    /// # Errors
    /// - LaunchError::Materialize if the write or chmod fails
    fn write_executable(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Whether `path` exists (read-only dependency checks)
    fn exists(&self, path: &Path) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::LaunchError;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory filesystem: directories plus (contents, executable) files
    #[derive(Default)]
    pub struct MockFileStore {
        dirs: Mutex<BTreeSet<PathBuf>>,
        files: Mutex<BTreeMap<PathBuf, (Vec<u8>, bool)>>,
        read_only: Mutex<bool>,
        resets: Mutex<usize>,
    }

    impl MockFileStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-existing file (e.g. the record database)
        pub fn with_file(self, path: impl Into<PathBuf>, contents: &[u8]) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(path.into(), (contents.to_vec(), false));
            self
        }

        /// Every mutation fails with EROFS
        pub fn read_only(self) -> Self {
            *self.read_only.lock().unwrap() = true;
            self
        }

        pub fn file(&self, path: &Path) -> Option<(Vec<u8>, bool)> {
            self.files.lock().unwrap().get(path).cloned()
        }

        /// Files directly inside `dir`
        pub fn files_in(&self, dir: &Path) -> Vec<PathBuf> {
            self.files
                .lock()
                .unwrap()
                .keys()
                .filter(|p| p.parent() == Some(dir))
                .cloned()
                .collect()
        }

        pub fn reset_count(&self) -> usize {
            *self.resets.lock().unwrap()
        }

        fn rofs() -> std::io::Error {
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only file system")
        }
    }

    impl FileStore for MockFileStore {
        fn reset_dir(&self, dir: &Path) -> Result<()> {
            if *self.read_only.lock().unwrap() {
                return Err(LaunchError::Scratch {
                    path: dir.to_path_buf(),
                    source: Self::rofs(),
                });
            }
            self.files.lock().unwrap().retain(|p, _| !p.starts_with(dir));
            self.dirs.lock().unwrap().insert(dir.to_path_buf());
            *self.resets.lock().unwrap() += 1;
            Ok(())
        }

        fn write_executable(&self, path: &Path, contents: &[u8]) -> Result<()> {
            let parent_exists = path
                .parent()
                .map(|p| self.dirs.lock().unwrap().contains(p))
                .unwrap_or(false);
            if *self.read_only.lock().unwrap() || !parent_exists {
                return Err(LaunchError::Materialize {
                    path: path.to_path_buf(),
                    source: Self::rofs(),
                });
            }
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), (contents.to_vec(), true));
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
                || self.dirs.lock().unwrap().contains(path)
        }
    }
}
