// Filesystem adapter for the scratch directory and startup script
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

use auxioc_core::application::constants::STARTUP_SCRIPT_MODE;
use auxioc_core::port::FileStore;
use auxioc_core::{LaunchError, Result};

/// Local filesystem store
pub struct FsFileStore;

impl FileStore for FsFileStore {
    fn reset_dir(&self, dir: &Path) -> Result<()> {
        let scratch_err = |source: std::io::Error| LaunchError::Scratch {
            path: dir.to_path_buf(),
            source,
        };

        match fs::remove_dir_all(dir) {
            Ok(()) => debug!(dir = %dir.display(), "Removed previous scratch directory"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(scratch_err(e)),
        }

        fs::create_dir_all(dir).map_err(scratch_err)
    }

    fn write_executable(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let materialize_err = |source: std::io::Error| LaunchError::Materialize {
            path: path.to_path_buf(),
            source,
        };

        fs::write(path, contents).map_err(materialize_err)?;
        fs::set_permissions(path, fs::Permissions::from_mode(STARTUP_SCRIPT_MODE))
            .map_err(materialize_err)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
