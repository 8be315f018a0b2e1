use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;

use crate::error::HashlineError;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Exclusive advisory lock held for the duration of one edit's
/// read-modify-write cycle. Dropped (and released) when it goes out of scope.
#[derive(Debug)]
pub struct EditFileLock {
    _file: File,
}

pub fn acquire_edit_lock(path: &Path) -> Result<EditFileLock, HashlineError> {
    let file = OpenOptions::new()
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|error| HashlineError::io(path, error))?;

    file.try_lock_exclusive().map_err(|error| {
        if error.kind() == std::io::ErrorKind::WouldBlock {
            HashlineError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::WouldBlock,
                    "file is busy: another edit is in progress",
                ),
            }
        } else {
            HashlineError::io(path, error)
        }
    })?;

    Ok(EditFileLock { _file: file })
}

/// Writes through an adjacent temp file and renames over the target, so a
/// concurrent reader observes either the full pre-edit or the full post-edit
/// content. The temp file is removed on any failure.
pub fn write_bytes_atomically(path: &Path, contents: &[u8]) -> Result<(), HashlineError> {
    let target_permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => return Err(HashlineError::io(path, error)),
    };
    let (temp_path, mut temp_file) = create_temp_file_adjacent(path)?;

    let result = (|| {
        temp_file
            .write_all(contents)
            .map_err(|error| HashlineError::io(&temp_path, error))?;
        temp_file
            .sync_all()
            .map_err(|error| HashlineError::io(&temp_path, error))?;

        if let Some(permissions) = target_permissions {
            fs::set_permissions(&temp_path, permissions)
                .map_err(|error| HashlineError::io(&temp_path, error))?;
        }
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|error| HashlineError::io(path, error))?;

        sync_parent_directory(path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn create_temp_file_adjacent(path: &Path) -> Result<(PathBuf, File), HashlineError> {
    let parent = resolve_parent_directory(path);
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("hashline-target");

    for _ in 0..64 {
        let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let temp_name = format!(".{file_name}.hashline-tmp-{nanos}-{counter}");
        let temp_path = parent.join(temp_name);

        match OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((temp_path, file)),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(HashlineError::io(&temp_path, error)),
        }
    }

    Err(HashlineError::Io {
        path: path.display().to_string(),
        source: std::io::Error::other("failed to allocate an adjacent temporary file"),
    })
}

fn resolve_parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sync_parent_directory(path: &Path) -> Result<(), HashlineError> {
    #[cfg(unix)]
    {
        let parent = resolve_parent_directory(path);
        let directory_handle =
            File::open(&parent).map_err(|error| HashlineError::io(&parent, error))?;
        directory_handle
            .sync_all()
            .map_err(|error| HashlineError::io(&parent, error))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
