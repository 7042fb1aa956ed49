//! Sparse-set component storage, registry, and archives for Tessera.
//!
//! This crate provides:
//! - [`ComponentStorage`] - Dense sparse-set storage for one component type
//! - [`ErasedStorage`] - Type-erased storage operations
//! - [`Registry`] - Component storages keyed by type, plus entity lifecycle
//! - [`View`] - Lazy iteration over entities holding several components
//! - [`snapshot`] - Binary and JSON archives of a whole registry

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod config;
pub mod erased;
pub mod registry;
pub mod snapshot;
pub mod sparse_set;
pub mod view;

pub use component::Component;
pub use config::{QueryStrategy, RegistryConfig, SparseGrowth, StorageConfig};
pub use erased::ErasedStorage;
pub use registry::Registry;
pub use sparse_set::ComponentStorage;
pub use view::{ComponentSet, View};

pub use tessera_foundation::{Entity, Error, ErrorKind, Result};
