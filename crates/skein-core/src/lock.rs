//! Per-user advisory locks.
//!
//! Read-modify-write of one user's history collection must be serialized:
//! two concurrent visits for the same user must not compute a merge or fork
//! against a stale collection and then overwrite a concurrently-saved one.
//! Each user gets an exclusive lock file under `.skein/locks/`; cross-user
//! visits proceed in parallel with no shared state.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// Advisory lock errors for per-user history serialization.
#[derive(Debug)]
pub enum LockError {
    Timeout { path: PathBuf, waited: Duration },
    IoError(io::Error),
}

impl From<io::Error> for LockError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::StoreUnavailable,
        }
    }

    /// Optional remediation hint for readers and scripts.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { path, waited } => {
                write!(
                    f,
                    "{}: lock timed out after {:?} at {}",
                    self.code().code(),
                    waited,
                    path.display()
                )
            }
            Self::IoError(err) => write!(f, "{}: {}", self.code().code(), err),
        }
    }
}

impl std::error::Error for LockError {}

/// RAII guard serializing one user's read-modify-write cycle.
#[derive(Debug)]
pub struct UserLock {
    file: File,
    path: PathBuf,
}

impl UserLock {
    /// Acquire the exclusive lock for `user`, retrying until `timeout`.
    ///
    /// # Errors
    ///
    /// [`LockError::Timeout`] when another process holds the lock past the
    /// deadline; [`LockError::IoError`] on filesystem failures.
    pub fn acquire(locks_dir: &Path, user: &str, timeout: Duration) -> Result<Self, LockError> {
        let path = locks_dir.join(format!("{}.lock", sanitize(user)));
        fs::create_dir_all(locks_dir)?;

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&path)?;

            if file.try_lock_exclusive().is_ok() {
                return Ok(Self { file, path });
            }

            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path,
                    waited: start.elapsed(),
                });
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Explicitly release the lock. Release also happens automatically on drop.
    pub fn release(self) {
        let _ = self.file.unlock();
    }

    /// Return the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UserLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Map an arbitrary user id onto a safe lock file stem.
fn sanitize(user: &str) -> String {
    user.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
