//! Sparse-set component storage.
//!
//! Each storage keeps three arrays:
//!
//! - `components`: packed component values, no gaps
//! - `entities`: parallel to `components`, `entities[i]` owns `components[i]`
//! - `sparse`: indexed by raw entity value, `sparse[e]` is the dense slot of `e`
//!
//! An entity is present iff `sparse[e] < entities.len()` and
//! `entities[sparse[e]] == e`. Stale sparse slots are harmless because every
//! lookup goes through that check.
//!
//! # Ordering
//!
//! Removal is swap-and-pop: the last dense slot moves into the hole. Dense
//! order, and therefore iteration order and [`ComponentStorage::packed_index`],
//! is **not** stable across a `remove` of any entity.

// Dense slots are bounded by the number of distinct non-null u32 entities.
#![allow(clippy::cast_possible_truncation)]

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tessera_foundation::{BinaryReader, BinaryWriter, Entity, Error, ErrorKind, Result};

use crate::component::Component;
use crate::config::{SparseGrowth, StorageConfig};

/// Sparse slot value that never points into the dense arrays.
const EMPTY_SLOT: u32 = u32::MAX;

/// Packed storage for every instance of one component type.
#[derive(Clone, Debug)]
pub struct ComponentStorage<T: Component> {
    /// Packed component values.
    components: Vec<T>,
    /// Owner of each dense slot.
    entities: Vec<Entity>,
    /// Raw entity value -> dense slot.
    sparse: Vec<u32>,
    /// Growth policy for `sparse`.
    growth: SparseGrowth,
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Creates an empty storage with the given configuration.
    #[must_use]
    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            components: Vec::with_capacity(config.initial_capacity),
            entities: Vec::with_capacity(config.initial_capacity),
            sparse: Vec::new(),
            growth: config.sparse_growth,
        }
    }

    /// Creates an empty storage sharing this storage's growth policy.
    #[must_use]
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            components: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
            growth: self.growth,
        }
    }

    /// Inserts or overwrites the component for `entity`.
    ///
    /// An existing value is overwritten in place; otherwise the value is
    /// appended to the dense arrays and the sparse index grows as needed.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is the null sentinel.
    pub fn insert(&mut self, entity: Entity, value: T) -> &mut T {
        assert!(
            !entity.is_null(),
            "cannot insert {} for the null entity",
            T::name()
        );

        if let Some(slot) = self.packed_index(entity) {
            self.components[slot] = value;
            return &mut self.components[slot];
        }

        if entity.index() >= self.sparse.len() {
            let target = self.growth.target_len(entity.index());
            self.sparse.resize(target, EMPTY_SLOT);
        }

        let slot = self.entities.len();
        self.sparse[entity.index()] = slot as u32;
        self.entities.push(entity);
        self.components.push(value);
        &mut self.components[slot]
    }

    /// Returns the component for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component in this storage. Check
    /// [`contains`](Self::contains) first, or use [`try_get`](Self::try_get).
    #[must_use]
    pub fn get(&self, entity: Entity) -> &T {
        match self.packed_index(entity) {
            Some(slot) => &self.components[slot],
            None => missing::<T>(entity),
        }
    }

    /// Returns the component for `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component in this storage.
    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        match self.packed_index(entity) {
            Some(slot) => &mut self.components[slot],
            None => missing::<T>(entity),
        }
    }

    /// Returns the component for `entity`, or `None` if absent.
    #[must_use]
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.packed_index(entity).map(|slot| &self.components[slot])
    }

    /// Returns the component for `entity` mutably, or `None` if absent.
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.packed_index(entity)
            .map(move |slot| &mut self.components[slot])
    }

    /// Returns the dense slot of `entity`, or `None` if absent.
    ///
    /// Valid until the next `remove` on this storage.
    #[must_use]
    pub fn packed_index(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index())? as usize;
        (self.entities.get(slot) == Some(&entity)).then_some(slot)
    }

    /// Returns true if `entity` has a component in this storage.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.packed_index(entity).is_some()
    }

    /// Removes the component for `entity` and returns it.
    ///
    /// The last dense slot is moved into the vacated one. Does nothing and
    /// returns `None` if `entity` is absent.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.packed_index(entity)?;
        let last = self.entities.len() - 1;
        if slot != last {
            let moved = self.entities[last];
            self.sparse[moved.index()] = slot as u32;
        }
        self.sparse[entity.index()] = EMPTY_SLOT;
        self.entities.swap_remove(slot);
        Some(self.components.swap_remove(slot))
    }

    /// Copies the component of `from` onto `to`, inserting or overwriting.
    ///
    /// Returns false and changes nothing if `from` is absent.
    pub fn copy(&mut self, from: Entity, to: Entity) -> bool {
        let Some(value) = self.try_get(from).cloned() else {
            return false;
        };
        self.insert(to, value);
        true
    }

    /// Removes every component. All subsequent lookups report absent.
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.sparse.clear();
    }

    /// Returns the number of components stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no components are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the dense owner list, parallel to [`components`](Self::components).
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the packed component values.
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns the packed component values mutably.
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Returns the raw sparse index.
    #[must_use]
    pub fn sparse(&self) -> &[u32] {
        &self.sparse
    }

    /// Iterates `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterates `(entity, component)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Writes the storage as: dense entities, sparse index, component count,
    /// then each component in dense order.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or a component cannot be encoded.
    pub fn write_binary<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        writer.write_entities(&self.entities)?;
        writer.write_indices(&self.sparse)?;
        writer.write_len("component", self.components.len())?;
        for component in &self.components {
            writer.write_value(component)?;
        }
        Ok(())
    }

    /// Replaces the contents with a storage read by [`write_binary`](Self::write_binary).
    ///
    /// Dense order and the sparse index are restored exactly. The pair is
    /// validated before it is accepted; on error the storage is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is truncated, the counts disagree, or
    /// the sparse index does not map every dense entity to its own slot.
    pub fn read_binary<R: Read>(&mut self, reader: &mut BinaryReader<R>) -> Result<()> {
        let entities = reader.read_entities()?;
        let sparse = reader.read_indices()?;
        let count = reader.read_len("component")?;
        if count != entities.len() {
            return Err(Error::length_mismatch("component", entities.len(), count));
        }

        let mut components = Vec::with_capacity(count);
        for _ in 0..count {
            components.push(reader.read_value::<T>()?);
        }

        for (slot, entity) in entities.iter().enumerate() {
            if entity.is_null() {
                return Err(Error::new(ErrorKind::NullEntity));
            }
            if sparse.get(entity.index()).map(|s| *s as usize) != Some(slot) {
                return Err(Error::inconsistent_sparse(*entity));
            }
        }

        self.components = components;
        self.entities = entities;
        self.sparse = sparse;
        Ok(())
    }

    /// Encodes the storage as a JSON array of `{"entity", "value"}` objects
    /// in dense order.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be represented as JSON.
    pub fn write_json(&self) -> Result<serde_json::Value> {
        let entries: Vec<JsonEntry<'_, T>> = self
            .iter()
            .map(|(entity, value)| JsonEntry { entity, value })
            .collect();
        serde_json::to_value(entries).map_err(|e| Error::codec(e.to_string()))
    }

    /// Replaces the contents with entries produced by [`write_json`](Self::write_json).
    ///
    /// The sparse index is re-derived by inserting in array order. On error
    /// the storage is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not decode, or names the null
    /// entity or the same entity twice.
    pub fn read_json(&mut self, json: &serde_json::Value) -> Result<()> {
        let entries = Vec::<OwnedJsonEntry<T>>::deserialize(json)
            .map_err(|e| Error::codec(e.to_string()))?;

        let mut rebuilt = self.empty_like();
        for entry in entries {
            if entry.entity.is_null() {
                return Err(Error::new(ErrorKind::NullEntity));
            }
            if rebuilt.contains(entry.entity) {
                return Err(Error::inconsistent_sparse(entry.entity));
            }
            rebuilt.insert(entry.entity, entry.value);
        }

        *self = rebuilt;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonEntry<'a, T> {
    entity: Entity,
    value: &'a T,
}

#[derive(Deserialize)]
struct OwnedJsonEntry<T> {
    entity: Entity,
    value: T,
}

#[cold]
#[track_caller]
fn missing<T: Component>(entity: Entity) -> ! {
    panic!("entity {entity} has no {} component", T::name())
}
