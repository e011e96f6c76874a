//! XML launch file reader

use crate::{error::Result, file_cache::read_file_cached};
use std::path::Path;

/// Read an XML launch file through the file cache
///
/// The content is parsed once, by whoever traverses it.
pub fn read_launch_file(path: &Path) -> Result<String> {
    read_file_cached(path)
}
