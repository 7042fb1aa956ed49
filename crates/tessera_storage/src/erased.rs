//! Type-erased access to component storages.
//!
//! The registry holds one boxed [`ErasedStorage`] per component type.
//! Operations that do not need the concrete type (destroying an entity,
//! clearing, archiving) go through this trait; typed access downcasts
//! through [`ErasedStorage::as_any`] using the same `TypeId` the storage
//! was registered under.

use std::any::Any;
use std::io::{Read, Write};

use tessera_foundation::{BinaryReader, BinaryWriter, Entity, Result};

use crate::component::Component;
use crate::sparse_set::ComponentStorage;

/// Operations every component storage supports without knowing `T`.
pub trait ErasedStorage: Any {
    /// Stable archive name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Number of components stored.
    fn len(&self) -> usize;

    /// Returns true if no components are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `entity` has a component here.
    fn contains(&self, entity: Entity) -> bool;

    /// Removes the component of `entity`, returning whether one was present.
    fn remove(&mut self, entity: Entity) -> bool;

    /// Inserts a default-constructed component for `entity` if absent.
    fn insert_default(&mut self, entity: Entity);

    /// Copies the component of `from` onto `to`. Returns false if `from` is absent.
    fn copy(&mut self, from: Entity, to: Entity) -> bool;

    /// Removes every component.
    fn clear(&mut self);

    /// Dense owner list.
    fn entities(&self) -> &[Entity];

    /// Creates an empty storage of the same component type and configuration.
    fn fresh(&self) -> Box<dyn ErasedStorage>;

    /// Writes the storage block of a binary archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or a component cannot be encoded.
    fn write_binary(&self, writer: &mut BinaryWriter<&mut dyn Write>) -> Result<()>;

    /// Replaces the contents from a binary archive storage block.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is truncated or inconsistent.
    fn read_binary(&mut self, reader: &mut BinaryReader<&mut dyn Read>) -> Result<()>;

    /// Encodes the storage as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be represented as JSON.
    fn write_json(&self) -> Result<serde_json::Value>;

    /// Replaces the contents from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not decode.
    fn read_json(&mut self, json: &serde_json::Value) -> Result<()>;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn component_name(&self) -> &'static str {
        T::name()
    }

    fn len(&self) -> usize {
        ComponentStorage::len(self)
    }

    fn contains(&self, entity: Entity) -> bool {
        ComponentStorage::contains(self, entity)
    }

    fn remove(&mut self, entity: Entity) -> bool {
        ComponentStorage::remove(self, entity).is_some()
    }

    fn insert_default(&mut self, entity: Entity) {
        if !ComponentStorage::contains(self, entity) {
            self.insert(entity, T::default());
        }
    }

    fn copy(&mut self, from: Entity, to: Entity) -> bool {
        ComponentStorage::copy(self, from, to)
    }

    fn clear(&mut self) {
        ComponentStorage::clear(self);
    }

    fn entities(&self) -> &[Entity] {
        ComponentStorage::entities(self)
    }

    fn fresh(&self) -> Box<dyn ErasedStorage> {
        Box::new(self.empty_like())
    }

    fn write_binary(&self, writer: &mut BinaryWriter<&mut dyn Write>) -> Result<()> {
        ComponentStorage::write_binary(self, writer)
    }

    fn read_binary(&mut self, reader: &mut BinaryReader<&mut dyn Read>) -> Result<()> {
        ComponentStorage::read_binary(self, reader)
    }

    fn write_json(&self) -> Result<serde_json::Value> {
        ComponentStorage::write_json(self)
    }

    fn read_json(&mut self, json: &serde_json::Value) -> Result<()> {
        ComponentStorage::read_json(self, json)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
