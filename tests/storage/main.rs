//! Integration tests for Layer 1: Storage
//!
//! Tests for component storages, the registry, views, and snapshots.

mod registry;
mod snapshots;
mod storages;
