//! Error types for table discovery and row streaming.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::HeaderViolation;

/// Errors that can occur while discovering tables or streaming rows.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Configuration Errors ===
    /// The configuration lists no paths.
    #[error("paths must be configured")]
    NoPathsConfigured,

    /// A configured pattern is not a valid glob.
    #[error("path is not a valid glob: {pattern}: {message}")]
    InvalidGlobPattern { pattern: String, message: String },

    /// A separator or comment option cannot be used as a single-byte delimiter.
    #[error("{option} must be a single-byte character, got '{value}'")]
    UnsupportedDelimiter { option: &'static str, value: String },

    // === Per-File Errors ===
    /// The source file could not be opened.
    #[error("failed to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file could not be read.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has a gzip suffix but is not a valid gzip stream.
    #[error("failed to decompress {path}: {source}")]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first record could not be decoded.
    #[error("failed to parse file header {path}: {source}")]
    HeaderParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The first record is not usable as a header under the `on` policy.
    #[error("{path} header row has {violation}")]
    InvalidHeader {
        path: PathBuf,
        violation: HeaderViolation,
    },

    // === Per-Query Errors ===
    /// The header could not be re-read at the start of a row stream.
    #[error("failed to re-read header of {path}: {message}")]
    HeaderReRead { path: PathBuf, message: String },

    /// The byte source failed in the middle of a row stream.
    #[error("failed to read records from {path}: {source}")]
    StreamRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No table with this name was discovered.
    #[error("table not found: {name}")]
    UnknownTable { name: String },
}

impl IngestError {
    pub(crate) fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that invalidate the whole configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NoPathsConfigured
                | Self::InvalidGlobPattern { .. }
                | Self::UnsupportedDelimiter { .. }
        )
    }

    /// Returns true for errors confined to a single table's discovery.
    pub fn is_table_error(&self) -> bool {
        matches!(
            self,
            Self::FileOpen { .. }
                | Self::FileRead { .. }
                | Self::Decompression { .. }
                | Self::HeaderParse { .. }
                | Self::InvalidHeader { .. }
        )
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::InvalidHeader {
            path: PathBuf::from("/data/x.csv"),
            violation: HeaderViolation::DuplicateField {
                index: 1,
                name: "id".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "/data/x.csv header row has duplicated value in field 1"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(IngestError::NoPathsConfigured.is_config_error());
        assert!(!IngestError::NoPathsConfigured.is_table_error());

        let open = IngestError::file_open(
            "/missing.csv",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(open.is_table_error());
        assert!(!open.is_config_error());

        let reread = IngestError::HeaderReRead {
            path: PathBuf::from("/x.csv"),
            message: "end of file".to_string(),
        };
        assert!(!reread.is_table_error());
    }
}
