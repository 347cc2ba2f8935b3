//! The singleton guard: a host-wide mutual-exclusion lease keyed by the
//! instance's mutex name.
//!
//! Realized as a lock file held under an exclusive `flock`. The kernel
//! releases the flock when a holder dies, so a crashed instance never wedges
//! the name; the pid it left behind in the file is how the next holder
//! recognizes the abandonment.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use loghost_core::ControlError;
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time to wait for the guard before concluding another instance is
/// live.
pub const GUARD_TIMEOUT: Duration = Duration::from_secs(1);

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// How the guard was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// Ownership taken cleanly.
    Clean,
    /// Ownership taken, but the previous holder terminated without
    /// releasing it.
    Abandoned,
}

/// An exclusively held singleton guard. Released on drop. The lock file
/// itself is never unlinked: unlinking would let a contender that already
/// opened the path lock the orphaned inode while a third process locks a
/// fresh file at the same name, defeating the exclusion.
pub struct SingletonGuard {
    lock: Option<Flock<File>>,
    path: PathBuf,
    pub acquisition: Acquisition,
}

/// Acquire the guard at `path`, waiting up to `timeout` for a live holder
/// to go away. The short timeout is deliberate: a live competing instance
/// should be detected within about a second, not hang the caller.
pub async fn acquire(path: &Path, timeout: Duration) -> Result<SingletonGuard, ControlError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| ControlError::GuardUnavailable(err.to_string()))?;
    }

    let deadline = Instant::now() + timeout;
    loop {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| ControlError::GuardUnavailable(err.to_string()))?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                let acquisition = classify(&lock);
                if acquisition == Acquisition::Abandoned {
                    warn!(path = %path.display(), "orphaned singleton guard found");
                } else {
                    debug!(path = %path.display(), "singleton guard acquired");
                }
                record_holder(&lock)
                    .map_err(|err| ControlError::GuardUnavailable(err.to_string()))?;
                return Ok(SingletonGuard {
                    lock: Some(lock),
                    path: path.to_path_buf(),
                    acquisition,
                });
            }
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                if Instant::now() >= deadline {
                    return Err(ControlError::AlreadyRunning);
                }
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
            Err((_, errno)) => {
                return Err(ControlError::GuardUnavailable(errno.to_string()));
            }
        }
    }
}

/// A guard file that still carries a holder pid was abandoned: a clean
/// release truncates the file first.
fn classify(lock: &File) -> Acquisition {
    let mut previous = String::new();
    let mut handle: &File = lock;
    match handle.read_to_string(&mut previous) {
        Ok(_) if !previous.trim().is_empty() => Acquisition::Abandoned,
        _ => Acquisition::Clean,
    }
}

fn record_holder(lock: &File) -> std::io::Result<()> {
    let mut handle: &File = lock;
    handle.set_len(0)?;
    handle.seek(SeekFrom::Start(0))?;
    write!(handle, "{}", std::process::id())?;
    handle.flush()
}

impl Drop for SingletonGuard {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            // Clear the pid so the next holder sees a clean release, then
            // let the flock go with the handle. The file stays behind.
            let _ = lock.set_len(0);
            drop(lock);
            debug!(path = %self.path.display(), "singleton guard released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.lock");
        let guard = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        assert_eq!(guard.acquisition, Acquisition::Clean);
    }

    #[tokio::test]
    async fn second_acquire_observes_already_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.lock");

        let first = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        let second = acquire(&path, Duration::from_millis(150)).await;
        assert!(matches!(second, Err(ControlError::AlreadyRunning)));

        drop(first);
        let third = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        assert_eq!(third.acquisition, Acquisition::Clean);
    }

    #[tokio::test]
    async fn stale_holder_pid_is_reported_as_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.lock");

        // A crashed holder leaves its pid behind; the kernel has already
        // dropped the flock.
        std::fs::write(&path, "99999").unwrap();

        let guard = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        assert_eq!(guard.acquisition, Acquisition::Abandoned);
    }

    #[tokio::test]
    async fn release_clears_the_holder_but_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.lock");

        let guard = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        drop(guard);

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        let again = acquire(&path, GUARD_TIMEOUT).await.unwrap();
        assert_eq!(again.acquisition, Acquisition::Clean);
    }

    #[tokio::test]
    async fn contender_with_an_open_handle_still_excludes_later_acquires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.lock");

        let holder = acquire(&path, GUARD_TIMEOUT).await.unwrap();

        // A contender mid-retry has the path open while the holder releases.
        // Its lock must land on the same inode later acquires contend on.
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        drop(holder);
        let contender = Flock::lock(handle, FlockArg::LockExclusiveNonblock).unwrap();

        let blocked = acquire(&path, Duration::from_millis(150)).await;
        assert!(matches!(blocked, Err(ControlError::AlreadyRunning)));

        drop(contender);
        assert!(acquire(&path, GUARD_TIMEOUT).await.is_ok());
    }
}
