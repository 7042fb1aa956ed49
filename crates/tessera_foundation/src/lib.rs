//! Core types for Tessera.
//!
//! This crate provides:
//! - [`Entity`] - Opaque 32-bit entity handles with a null sentinel
//! - [`Error`] - Recoverable archive errors with context
//! - [`BinaryWriter`] / [`BinaryReader`] - Binary archive framing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archive;
pub mod entity;
pub mod error;

pub use archive::{BinaryReader, BinaryWriter, DEFAULT_MAX_SEQUENCE_LEN};
pub use entity::Entity;
pub use error::{Error, ErrorKind, Result};
