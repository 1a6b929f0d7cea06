//! Advisory lock shared with other processes editing the same file

use crate::error::{PhoneBookError, PhoneBookResult};
use nix::fcntl::{flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use tracing::trace;

/// Exclusive `flock` held until dropped
pub(crate) struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the lock on `path` is acquired, creating the file if needed
    pub(crate) fn acquire(path: &Path) -> PhoneBookResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| PhoneBookError::io(path, e))?;

        flock(file.as_raw_fd(), FlockArg::LockExclusive).map_err(|source| {
            PhoneBookError::Lock {
                path: path.to_path_buf(),
                source,
            }
        })?;
        trace!("Locked {}", path.display());

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = flock(self.file.as_raw_fd(), FlockArg::Unlock);
    }
}
