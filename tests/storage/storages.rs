//! Integration tests for single-type component storage
//!
//! Tests swap-and-pop removal, sparse index growth, and configuration.

use tessera_storage::{ComponentStorage, Entity, SparseGrowth, StorageConfig};

use crate::common::Name;

fn e(raw: u32) -> Entity {
    Entity::from_raw(raw)
}

// =============================================================================
// Removal Order
// =============================================================================

#[test]
fn remove_moves_last_into_hole() {
    let mut storage = ComponentStorage::<Name>::new();
    for (raw, name) in [(0, "a"), (1, "b"), (2, "c"), (3, "d")] {
        storage.insert(e(raw), Name::new(name));
    }

    assert_eq!(storage.remove(e(1)), Some(Name::new("b")));

    assert_eq!(storage.entities(), &[e(0), e(3), e(2)]);
    assert_eq!(storage.packed_index(e(3)), Some(1));
    assert_eq!(storage.get(e(3)).name, "d");
    assert!(!storage.contains(e(1)));
}

#[test]
fn removing_last_slot_moves_nothing() {
    let mut storage = ComponentStorage::<Name>::new();
    storage.insert(e(0), Name::new("a"));
    storage.insert(e(1), Name::new("b"));

    storage.remove(e(1));
    assert_eq!(storage.entities(), &[e(0)]);
    assert_eq!(storage.packed_index(e(0)), Some(0));
}

#[test]
fn insert_existing_overwrites_in_place() {
    let mut storage = ComponentStorage::<Name>::new();
    storage.insert(e(5), Name::new("old"));
    storage.insert(e(2), Name::new("other"));
    storage.insert(e(5), Name::new("new"));

    assert_eq!(storage.len(), 2);
    assert_eq!(storage.packed_index(e(5)), Some(0));
    assert_eq!(storage.get(e(5)).name, "new");
}

// =============================================================================
// Sparse Index
// =============================================================================

#[test]
fn sparse_index_grows_to_cover_entity() {
    let mut storage = ComponentStorage::<Name>::new();
    storage.insert(e(9), Name::default());
    assert_eq!(storage.sparse().len(), 10);
    assert!(!storage.contains(e(100)));
}

#[test]
fn doubling_growth_overallocates() {
    let config = StorageConfig::default().with_sparse_growth(SparseGrowth::Doubling);
    let mut storage = ComponentStorage::<Name>::with_config(config);
    storage.insert(e(9), Name::default());
    assert!(storage.sparse().len() >= 10);
    assert!(storage.contains(e(9)));
    assert!(!storage.contains(e(8)));
}

#[test]
fn clear_resets_everything() {
    let mut storage = ComponentStorage::<Name>::new();
    storage.insert(e(3), Name::default());
    storage.clear();

    assert!(storage.is_empty());
    assert!(storage.sparse().is_empty());
    assert!(storage.try_get(e(3)).is_none());
}

#[test]
#[should_panic(expected = "null entity")]
fn insert_null_panics() {
    let mut storage = ComponentStorage::<Name>::new();
    storage.insert(Entity::NULL, Name::default());
}
