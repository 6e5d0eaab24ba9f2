use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = BacklinkError> = std::result::Result<T, E>;

/// Errors that abort a backlink run.
///
/// There is no partial-output mode: any of these stops the pipeline before a
/// single file is written.
#[derive(Debug, Error)]
pub enum BacklinkError {
    /// Two on-disk filenames fold to the same identity key.
    #[error("duplicate document {identity}: {first} and {second} differ only by case")]
    DuplicateDocument {
        identity: String,
        first: String,
        second: String,
    },

    #[error("malformed metadata in {identity}: {reason}")]
    MalformedMetadata { identity: String, reason: String },

    /// A date-named document whose name is not a real calendar date.
    #[error("cannot parse date from {identity}: {value}")]
    DateParse { identity: String, value: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl BacklinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
