//! Error types for Tessera archives.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Only recoverable failures live here: contract violations such as
//! reading a component that is not present are panics, not errors.

use thiserror::Error;

use crate::entity::Entity;

/// The main error type for Tessera operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error, such as the component being read.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates a truncated-archive error.
    #[must_use]
    pub fn truncated(expected: usize, available: usize) -> Self {
        Self::new(ErrorKind::Truncated {
            expected,
            available,
        })
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::LengthMismatch {
            what,
            expected,
            actual,
        })
    }

    /// Creates an inconsistent sparse index error.
    #[must_use]
    pub fn inconsistent_sparse(entity: Entity) -> Self {
        Self::new(ErrorKind::InconsistentSparse { entity })
    }

    /// Creates an unknown component error.
    #[must_use]
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownComponent(name.into()))
    }

    /// Creates a codec error.
    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Codec(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The archive ended before a complete value could be read.
    #[error("archive truncated: expected {expected} more bytes, {available} available")]
    Truncated {
        /// Number of bytes the reader needed.
        expected: usize,
        /// Number of bytes that were actually available.
        available: usize,
    },

    /// Two length prefixes that must agree do not.
    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Which sequence was being checked.
        what: &'static str,
        /// The length implied by earlier data.
        expected: usize,
        /// The length that was read.
        actual: usize,
    },

    /// A length prefix exceeds the configured limit.
    #[error("{what} sequence of length {length} exceeds limit {limit}")]
    SequenceTooLong {
        /// Which sequence was being read.
        what: &'static str,
        /// The length prefix that was read.
        length: usize,
        /// The configured maximum.
        limit: usize,
    },

    /// The dense and sparse arrays read from an archive disagree.
    #[error("inconsistent sparse index for entity {entity}")]
    InconsistentSparse {
        /// The entity whose slot failed validation.
        entity: Entity,
    },

    /// The null sentinel appeared where a live entity was required.
    #[error("null entity in archive")]
    NullEntity,

    /// An archived entity list is not the sequence `0, 1, 2, ...`.
    #[error("entity list out of sequence at position {position}: found {entity}")]
    EntityOutOfSequence {
        /// Position in the entity list.
        position: usize,
        /// The entity found there.
        entity: Entity,
    },

    /// An archived storage references an entity the entity list lacks.
    #[error("unknown entity in archive: {0}")]
    UnknownEntity(Entity),

    /// The same component type appears twice in one archive.
    #[error("duplicate component in archive: {0}")]
    DuplicateComponent(String),

    /// The archive names a component type the registry does not know.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The underlying reader or writer failed.
    #[error("io error: {0}")]
    Io(String),
}

/// Result type alias for Tessera operations.
pub type Result<T> = std::result::Result<T, Error>;
