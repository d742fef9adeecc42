//! Error types for pointstream operations.
//!
//! Only two conditions ever leave an extraction session: a stream that ended
//! with zero usable points, and a transport failure reported by the byte
//! stream. Malformed JSON mid-stream is an expected state and never shows up
//! here; the accumulator absorbs it.

use thiserror::Error;

/// Result type alias for pointstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction session outcome errors.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Errors reported by the upstream byte stream.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Video reference errors.
    #[error("video error: {0}")]
    Video(#[from] VideoError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Terminal outcomes of an extraction session that callers must handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The stream finished but not a single valid point was recovered.
    #[error("no insights were extracted from this video, please try again")]
    NoInsights,

    /// The session was torn down before it could be finalized.
    #[error("extraction session was cancelled")]
    Cancelled,
}

/// Errors raised by the byte-stream collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The upstream stream failed mid-transfer.
    #[error("upstream stream failed: {reason}")]
    Upstream {
        /// Reason reported by the stream.
        reason: String,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

/// Errors for YouTube video references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VideoError {
    /// The URL does not contain a recognizable video id.
    #[error("invalid YouTube URL: {url}")]
    InvalidUrl {
        /// URL that failed to match.
        url: String,
    },
}

/// Error parsing a point category label.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCategoryError {
    /// The label is an empty string.
    #[error("category label is empty")]
    Empty,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Command(err.into())
    }
}
