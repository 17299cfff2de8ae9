//! Error types for the storage driver.
//!
//! [`StoreError`] is what every driver operation returns. Payload encoding
//! failures carry a [`CodecError`], which keeps the codec backend's own error
//! as a boxed source next to a semantic [`CodecErrorKind`].

use std::io;
use std::path::{Path, PathBuf};

/// Result alias used throughout the driver.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Semantic error categories for [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Empty collection or resource name.
    Validation,
    /// Resource or collection directory does not exist.
    NotFound,
    /// Filesystem failure.
    Io,
    /// Payload could not be encoded or decoded.
    Format,
}

/// Storage driver error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A collection or resource name was empty.
    #[error("{0}")]
    Validation(String),

    /// Neither the bare path nor its `.json` form exists.
    #[error("Unable to find file or directory (path: {})", .0.display())]
    NotFound(PathBuf),

    /// Directory creation, read, write, rename or delete failed.
    #[error("I/O error: {source} (path: {})", .path.display())]
    Io {
        /// Path the operation was working on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The record could not be encoded, or the stored bytes could not be
    /// decoded into the requested type.
    #[error("{source} (path: {})", .path.display())]
    Format {
        /// Resource file the payload belongs to.
        path: PathBuf,
        /// Codec failure.
        #[source]
        source: CodecError,
    },
}

impl StoreError {
    /// Semantic category of this error.
    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Validation(_) => StoreErrorKind::Validation,
            Self::NotFound(_) => StoreErrorKind::NotFound,
            Self::Io { .. } => StoreErrorKind::Io,
            Self::Format { .. } => StoreErrorKind::Format,
        }
    }

    /// Path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Validation(_) => None,
            Self::NotFound(path) | Self::Io { path, .. } | Self::Format { path, .. } => {
                Some(path)
            }
        }
    }

    /// Create a storage error from an I/O error.
    ///
    /// `io::ErrorKind::NotFound` is mapped to [`StoreError::NotFound`] so
    /// callers can match on a single variant for missing data.
    #[must_use]
    pub fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: err },
        }
    }

    pub(crate) fn format(err: CodecError, path: impl Into<PathBuf>) -> Self {
        Self::Format {
            path: path.into(),
            source: err,
        }
    }
}

/// Why a codec rejected a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecErrorKind {
    /// The bytes are not valid serialized data (bad syntax, truncated input).
    Syntax,
    /// The data is well formed but does not match the destination type.
    Shape,
    /// The value could not be serialized.
    Encode,
}

/// Codec error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct CodecError {
    /// Semantic error category.
    pub kind: CodecErrorKind,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl CodecError {
    /// Create a codec error of the given kind.
    #[must_use]
    pub fn new(
        kind: CodecErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Box::new(source),
        }
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref()
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self.kind {
            CodecErrorKind::Syntax => "Malformed record",
            CodecErrorKind::Shape => "Record type mismatch",
            CodecErrorKind::Encode => "Cannot encode record",
        };
        write!(f, "{kind_str}: {}", self.source)
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = StoreError::io(io_err, "/data/users/bob.json");

        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("/data/users/bob.json")));
    }

    #[test]
    fn test_io_permission_denied_stays_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StoreError::io(io_err, "/data");

        assert_eq!(err.kind(), StoreErrorKind::Io);
        assert!(matches!(err, StoreError::Io { ref source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_validation_has_no_path() {
        let err = StoreError::Validation("collection is not present".to_owned());

        assert_eq!(err.kind(), StoreErrorKind::Validation);
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "collection is not present");
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound(PathBuf::from("/data/users/bob"));

        assert_eq!(
            err.to_string(),
            "Unable to find file or directory (path: /data/users/bob)"
        );
    }

    #[test]
    fn test_codec_error_display_and_source() {
        let io_err = io::Error::other("unexpected end of input");
        let err = CodecError::new(CodecErrorKind::Syntax, io_err);

        assert_eq!(err.to_string(), "Malformed record: unexpected end of input");
        assert!(err.downcast_source::<io::Error>().is_some());
    }

    #[test]
    fn test_format_error_chain() {
        let codec = CodecError::new(CodecErrorKind::Shape, io::Error::other("expected a map"));
        let err = StoreError::format(codec, "/data/users/alice.json");

        assert_eq!(err.kind(), StoreErrorKind::Format);
        assert_eq!(
            err.to_string(),
            "Record type mismatch: expected a map (path: /data/users/alice.json)"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<CodecError>().is_some());
    }

    #[test]
    fn test_store_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
        assert_send_sync::<CodecError>();
    }
}
