//! Error types for the protree-core library.
//!
//! Rendering itself cannot fail. Every variant here belongs to the parse and
//! conversion boundary, where schema files are read, compiled and turned into
//! the immutable descriptor model.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all protree operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The schema compiler rejected a `.proto` file
    #[error("failed to parse proto file '{path}': {message}")]
    Parse {
        /// File handed to the compiler
        path: PathBuf,
        /// Diagnostic produced by the compiler
        message: String,
    },

    /// Failed to decode an encoded `FileDescriptorSet`
    #[error("failed to decode FileDescriptorSet: {0}")]
    DescriptorParse(#[from] prost::DecodeError),

    /// Failed to build a descriptor pool with prost-reflect
    #[error("failed to build descriptor pool: {0}")]
    DescriptorBuild(String),

    /// A descriptor refers to something that does not exist
    #[error("unresolved reference in '{file}' at '{entity}': {details}")]
    UnresolvedReference {
        /// File containing the offending descriptor
        file: String,
        /// Fully-qualified name of the offending descriptor
        entity: String,
        /// What could not be resolved
        details: String,
    },

    /// Message nesting exceeds the supported depth
    #[error("message nesting in '{file}' exceeds {max} levels at '{entity}'")]
    NestingTooDeep {
        /// File containing the offending message
        file: String,
        /// Fully-qualified name of the first message past the limit
        entity: String,
        /// Maximum supported depth
        max: usize,
    },

    /// Input produced no file descriptors
    #[error("no proto files found in input")]
    NoFilesFound,

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new descriptor build error
    pub fn descriptor_build(msg: impl Into<String>) -> Self {
        Self::DescriptorBuild(msg.into())
    }

    /// Creates a new unresolved reference error
    pub fn unresolved(
        file: impl Into<String>,
        entity: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            file: file.into(),
            entity: entity.into(),
            details: details.into(),
        }
    }

    /// Creates a new nesting depth error
    pub fn nesting_too_deep(file: impl Into<String>, entity: impl Into<String>, max: usize) -> Self {
        Self::NestingTooDeep {
            file: file.into(),
            entity: entity.into(),
            max,
        }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the error concerns a single input file, so a caller
    /// processing many files may skip it and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::FileRead { .. } | Self::DescriptorParse(_)
        )
    }
}
