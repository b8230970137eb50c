//! Opens images with the desktop's default application

use crate::error::{CalframesError, Result};
use std::path::Path;

/// Hands `path` to the OS "open with default application" facility.
///
/// This does not wait for the viewer to exit.
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CalframesError::OpenError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    log::info!("opening {} with default application", path.display());

    open::that_detached(path).map_err(|source| CalframesError::OpenError {
        path: path.to_path_buf(),
        source,
    })
}
