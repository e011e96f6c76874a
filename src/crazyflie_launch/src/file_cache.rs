//! Modification-time validated cache of launch and parameter files

use crate::error::{ParseError, Result};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Cached file content with modification time
struct CachedFile {
    content: String,
    modified: SystemTime,
}

/// Global file content cache
static FILE_CACHE: Lazy<DashMap<PathBuf, CachedFile>> = Lazy::new(DashMap::new);

/// Read file with caching and modification time validation
pub(crate) fn read_file_cached(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ParseError::FileNotFound(path.display().to_string()),
        _ => ParseError::IoError(e),
    })?;
    let modified = metadata.modified()?;

    if let Some(entry) = FILE_CACHE.get(path) {
        if entry.modified == modified {
            log::trace!("File cache hit: {}", path.display());
            return Ok(entry.content.clone());
        }
    }

    log::debug!("File cache miss: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    FILE_CACHE.insert(
        path.to_path_buf(),
        CachedFile {
            content: content.clone(),
            modified,
        },
    );

    Ok(content)
}
