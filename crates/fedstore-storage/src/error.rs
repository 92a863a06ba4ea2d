//! Storage error types for fedstore-storage.
//!
//! [`StorageError`] covers every failure the storage layer reports: missing
//! or read-only buckets, intentionally unsupported operations, malformed
//! engine state, codec failures and engine I/O. [`ErrorKind`] collapses the
//! variants into the coarse classes callers branch on.

use std::fmt;

use fedstore_vocab::{Iri, VocabError};
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A bucket or entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A bucket was written through a read-only transaction.
    #[error("not writable: {0}")]
    NotWritable(String),

    /// The operation is deliberately unsupported by this backend.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Malformed bucket, cursor or argument state.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Encoding or decoding an item failed.
    #[error("codec error: {0}")]
    Codec(#[from] VocabError),

    /// The SQLite engine reported a failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying the engine schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Filesystem failure outside the engine.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An identifier could not be assigned; `existing` is the item's
    /// identifier before generation was attempted.
    #[error("could not generate id (keeping '{existing}'): {source}")]
    IdGeneration {
        existing: Iri,
        #[source]
        source: VocabError,
    },

    /// Another error annotated with the bucket or operation it came from.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<StorageError>,
    },
}

/// Coarse error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotWritable,
    NotImplemented,
    Invalid,
    Codec,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::NotWritable => "not writable",
            ErrorKind::NotImplemented => "not implemented",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Codec => "codec",
            ErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

impl StorageError {
    /// The class of this error, looking through any context annotations.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::NotWritable(_) => ErrorKind::NotWritable,
            StorageError::NotImplemented(_) => ErrorKind::NotImplemented,
            StorageError::Invalid(_) => ErrorKind::Invalid,
            StorageError::IdGeneration { .. } => ErrorKind::Invalid,
            StorageError::Codec(_) => ErrorKind::Codec,
            StorageError::Sqlite(_) | StorageError::Migration(_) | StorageError::Io(_) => {
                ErrorKind::Io
            }
            StorageError::Context { source, .. } => source.kind(),
        }
    }

    /// Wraps this error with a description of where it happened.
    pub fn context(self, context: impl Into<String>) -> StorageError {
        StorageError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Adds [`StorageError::context`] to `Result`s.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, StorageError>;
}

impl<T, E: Into<StorageError>> ResultExt<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, StorageError> {
        self.map_err(|e| e.into().context(context))
    }
}
