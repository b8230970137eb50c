//! Crate-wide error type

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalframesError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Preview error: {0}")]
    PreviewError(#[from] crate::preview::PreviewError),

    #[error("Failed to open {path}: {source}")]
    OpenError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CalframesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CalframesError::ConfigError("bad value".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_open_error_mentions_path() {
        let err = CalframesError::OpenError {
            path: PathBuf::from("/tmp/frame.fits"),
            source: io::Error::new(io::ErrorKind::NotFound, "no handler"),
        };
        assert!(err.to_string().contains("/tmp/frame.fits"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: CalframesError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, CalframesError::Io(_)));
    }
}
