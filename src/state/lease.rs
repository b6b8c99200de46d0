//! Exclusive per-working-directory lease.
//!
//! A release run holds an advisory lock on `<git-dir>/release_flow.lock` for
//! its whole lifetime, including while suspended on a merge conflict. A
//! second run against the same repository fails immediately instead of
//! queuing behind the first.

use crate::error::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Lock file name inside the git directory
pub const LEASE_FILE_NAME: &str = "release_flow.lock";

/// Contents written into the lock file by the holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInfo {
    /// Process ID of the holder
    pub pid: u32,
    /// Run identifier of the holder
    pub run_id: String,
    /// When the lease was acquired
    pub acquired_at: chrono::DateTime<chrono::Utc>,
}

/// Held lease; released when dropped
pub struct WorkdirLease {
    path: PathBuf,
    info: LeaseInfo,
    #[cfg(unix)]
    _handle: nix::fcntl::Flock<fs::File>,
    #[cfg(not(unix))]
    _handle: fs::File,
}

impl WorkdirLease {
    /// Acquire the lease for the repository whose git directory is `git_dir`.
    ///
    /// Fails fast with [`LockError::Held`] if another run holds it.
    pub fn acquire(git_dir: &Path, run_id: &str) -> Result<Self> {
        let path = git_dir.join(LEASE_FILE_NAME);
        let info = LeaseInfo {
            pid: std::process::id(),
            run_id: run_id.to_string(),
            acquired_at: chrono::Utc::now(),
        };

        let mut handle = Self::lock_file(&path)?;

        let contents = serde_json::to_string(&info)?;
        let file: &mut fs::File = &mut handle;
        let written = file
            .set_len(0)
            .and_then(|()| file.write_all(contents.as_bytes()));
        written.map_err(|e| LockError::AcquireFailed {
            path: path.clone(),
            reason: format!("Failed to write lock file: {}", e),
        })?;
        file.sync_all().ok();

        log::debug!("Acquired lease {} (run {})", path.display(), run_id);

        Ok(Self {
            path,
            info,
            _handle: handle,
        })
    }

    /// Holder of the lease for `git_dir`, if a run currently holds it
    pub fn holder(git_dir: &Path) -> Option<LeaseInfo> {
        let path = git_dir.join(LEASE_FILE_NAME);

        #[cfg(unix)]
        {
            use nix::fcntl::{Flock, FlockArg};

            let file = fs::OpenOptions::new().read(true).open(&path).ok()?;
            match Flock::lock(file, FlockArg::LockSharedNonblock) {
                // Nobody holds it; the probe lock is released on drop
                Ok(_probe) => return None,
                Err((_, nix::errno::Errno::EWOULDBLOCK)) => {}
                Err(_) => return None,
            }
        }

        let contents = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Holder information written into the lock file
    pub fn info(&self) -> &LeaseInfo {
        &self.info
    }

    #[cfg(unix)]
    fn lock_file(path: &Path) -> Result<nix::fcntl::Flock<fs::File>> {
        use nix::fcntl::{Flock, FlockArg};

        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LockError::AcquireFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to open lock file: {}", e),
            })?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => Ok(lock),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Err(LockError::Held {
                path: path.to_path_buf(),
                holder: describe_holder(path),
            }
            .into()),
            Err((_, errno)) => Err(LockError::AcquireFailed {
                path: path.to_path_buf(),
                reason: format!("flock error: {}", errno),
            }
            .into()),
        }
    }

    #[cfg(not(unix))]
    fn lock_file(path: &Path) -> Result<fs::File> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                let err = if e.kind() == std::io::ErrorKind::AlreadyExists {
                    LockError::Held {
                        path: path.to_path_buf(),
                        holder: describe_holder(path),
                    }
                } else {
                    LockError::AcquireFailed {
                        path: path.to_path_buf(),
                        reason: format!("Failed to create lock file: {}", e),
                    }
                };
                crate::error::ReleaseError::from(err)
            })
    }
}

impl std::fmt::Debug for WorkdirLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkdirLease")
            .field("path", &self.path)
            .field("info", &self.info)
            .finish()
    }
}

impl Drop for WorkdirLease {
    fn drop(&mut self) {
        // flock is released with the handle; only the create_new fallback
        // relies on the file disappearing.
        #[cfg(not(unix))]
        {
            let _ = fs::remove_file(&self.path);
        }
        log::debug!("Released lease {}", self.path.display());
    }
}

fn describe_holder(path: &Path) -> String {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<LeaseInfo>(&contents).ok())
        .map(|info| {
            format!(
                "pid {} run {} since {}",
                info.pid,
                info.run_id,
                info.acquired_at.to_rfc3339()
            )
        })
        .unwrap_or_else(|| "unknown".to_string())
}
