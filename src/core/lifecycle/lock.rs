//! Cross-process run lock
//!
//! The execution marker only covers one process. A second `ferry` process
//! (a `trigger` next to a running `run`) sees its own empty marker, so every
//! tick also takes an exclusive advisory lock on a file next to the in-flight
//! location and holds it until the run's files have been moved.
//!
//! The lock file is never removed; deleting it would let two processes lock
//! two different inodes under the same name.

use crate::domain::{FerryError, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// An exclusive lock held on the run lock file
///
/// Closing the descriptor on drop releases the lock, including when the
/// holding task panics or the process dies.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    _file: File,
}

impl RunLock {
    /// Try to take the lock at `path` without blocking
    ///
    /// Returns `Ok(None)` when another holder has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or locked for a
    /// reason other than contention.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| lock_error(path, &e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| lock_error(path, &e))?;

        if !try_flock_exclusive(&file).map_err(|e| lock_error(path, &e))? {
            tracing::debug!(lock = %path.display(), "Run lock held elsewhere");
            return Ok(None);
        }

        tracing::debug!(lock = %path.display(), "Run lock acquired");
        Ok(Some(Self {
            path: path.to_path_buf(),
            _file: file,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_error(path: &Path, e: &io::Error) -> FerryError {
    FerryError::Lifecycle(format!("Cannot lock '{}': {e}", path.display()))
}

/// Non-blocking exclusive `flock`; `Ok(false)` when already locked
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: `file` owns a valid descriptor for the duration of the call
        // and LOCK_NB keeps the call from blocking.
        #[allow(unsafe_code)]
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock
            || err.raw_os_error() == Some(libc::EWOULDBLOCK)
        {
            return Ok(false);
        }
        Err(err)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(true)
    }
}
