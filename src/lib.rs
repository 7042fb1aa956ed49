//! Tessera - Sparse-set entity-component storage
//!
//! This crate re-exports all layers of the Tessera system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: tessera_storage    — Component storages, registry, views, snapshots
//! Layer 0: tessera_foundation — Core types (Entity, Error, binary framing)
//! ```

pub use tessera_foundation as foundation;
pub use tessera_storage as storage;
