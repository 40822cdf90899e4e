use crate::error::AppError;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Advisory per-store lock: a sibling `.lock` file created with
/// `create_new`, removed on drop. Held across each mutating session
/// operation so two process instances cannot interleave a load/save pair.
///
/// The file records the holder's PID, so a lock left behind by a crash
/// can be identified and removed by hand.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(store_path: &Path) -> Result<Self, AppError> {
        let path = lock_path(store_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let holder = std::fs::read_to_string(&path)
                    .ok()
                    .map(|pid| pid.trim().to_string())
                    .filter(|pid| !pid.is_empty());
                Err(AppError::io(match holder {
                    Some(pid) => format!(
                        "store is locked by process {pid}; remove {} if that process is gone",
                        path.display()
                    ),
                    None => format!(
                        "store is locked by another process; remove {} if it is stale",
                        path.display()
                    ),
                }))
            }
            Err(err) => Err(AppError::io(err.to_string())),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn lock_path(store_path: &Path) -> PathBuf {
    let mut raw = store_path.as_os_str().to_os_string();
    raw.push(".lock");
    PathBuf::from(raw)
}
