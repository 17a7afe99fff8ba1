//! Custom error types for the lingvo-dsl crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum DslError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// A markup fragment is not valid UTF-8.
    ///
    /// `offset` is the byte offset of the first invalid sequence within the fragment.
    #[error("Invalid UTF-8 in markup at byte {offset}")]
    Encoding { offset: usize },

    /// A single entry group failed to convert. Wraps the underlying cause.
    #[error("Entry '{headword}' could not be converted: {source}")]
    Entry {
        headword: String,
        #[source]
        source: Box<DslError>,
    },

    /// The requested input encoding label is not known to `encoding_rs`.
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The source layout could not be detected from the file name or content.
    #[error("Could not detect the layout of {0}; pass --layout tabular or --layout blocks")]
    UndetectedLayout(String),

    /// Writing the resource archive failed.
    #[error("Resource packaging failed: {0}")]
    Archive(String),
}

impl From<zip::result::ZipError> for DslError {
    fn from(err: zip::result::ZipError) -> Self {
        DslError::Archive(err.to_string())
    }
}

impl From<walkdir::Error> for DslError {
    fn from(err: walkdir::Error) -> Self {
        DslError::Archive(err.to_string())
    }
}

/// A convenience `Result` type alias using the crate's `DslError` type.
pub type Result<T> = std::result::Result<T, DslError>;
