//! Error types for context word extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading corpus files or extracting windows.
///
/// File-level variants (`NotFound`, `Decode`, `Io`) abort only the file they
/// concern; occurrence-level variants abort only that occurrence.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The corpus file does not exist.
    #[error("corpus file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The corpus file could not be decoded with the configured encoding.
    #[error("failed to decode {} as {encoding}: {reason}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
        reason: String,
    },

    /// Any other I/O failure while reading a corpus file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target line of an occurrence is not a token line.
    #[error("line {line} of {file_stem} does not match the corpus format")]
    Match { file_stem: String, line: usize },

    /// An occurrence identifier could not be parsed.
    #[error("invalid occurrence id {id:?}: {reason}")]
    InvalidOccurrence { id: String, reason: &'static str },

    /// An occurrence points past the end of its file.
    #[error("occurrence {id} is out of range (file has {lines} lines)")]
    OutOfRange { id: String, lines: usize },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The line regex does not compile.
    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration sources could not be read.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
