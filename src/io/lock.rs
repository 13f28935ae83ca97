use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

pub const LOCK_FILE: &str = "tasks.lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive claim on a data directory's snapshot, held for the duration of a
/// write.
///
/// The claim is an flock on `tasks.lock` inside the directory. The lock file
/// is never removed, so every writer contends on the same inode. Dropping the
/// guard closes the handle, which releases the flock.
#[derive(Debug)]
pub struct SnapshotLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError { path: PathBuf, source: io::Error },
    #[error("gave up on {path} after {waited:?}: another writer holds it")]
    Timeout { path: PathBuf, waited: Duration },
    #[error("could not lock {path}: {source}")]
    IoError { path: PathBuf, source: io::Error },
}

impl SnapshotLock {
    /// Take the lock if it is free right now. `Ok(None)` means another writer
    /// holds it.
    pub fn try_acquire(data_dir: &Path) -> Result<Option<Self>, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = open_lock_file(&path)?;
        match try_flock(&file) {
            Ok(true) => Ok(Some(SnapshotLock { _file: file, path })),
            Ok(false) => Ok(None),
            Err(source) => Err(LockError::IoError { path, source }),
        }
    }

    /// Poll for the lock until `timeout` has passed.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let start = Instant::now();
        let mut logged = false;
        loop {
            if let Some(lock) = Self::try_acquire(data_dir)? {
                return Ok(lock);
            }
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout {
                    path: data_dir.join(LOCK_FILE),
                    waited,
                });
            }
            if !logged {
                debug!(
                    "event=snapshot_lock module=io status=waiting dir={}",
                    data_dir.display()
                );
                logged = true;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_lock_file(path: &Path) -> Result<File, LockError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|source| LockError::CreateError {
            path: path.to_path_buf(),
            source,
        })
}

/// `Ok(false)` when someone else holds the lock.
#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
