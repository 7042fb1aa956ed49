//! The storage registry.
//!
//! A [`Registry`] owns one [`ComponentStorage`] per registered component
//! type and the append-only list of entities it has created. It is the
//! unit a scene or world is built on.
//!
//! # Contracts
//!
//! Accessing a storage for a type that was never registered is a
//! programmer error and panics, as does [`Registry::get`] on an entity
//! without the component. The designed way to query optionally is
//! [`Registry::try_get`], [`Registry::has`], and [`Registry::exists`]; these
//! treat an unregistered type as empty rather than panicking.
//!
//! # Threading
//!
//! The registry has no internal locking. Confine every call on one
//! instance to a single owner at a time.

use std::any::TypeId;
use std::collections::HashMap;

use tessera_foundation::Entity;
use tracing::{debug, trace};

use crate::component::Component;
use crate::config::{QueryStrategy, RegistryConfig};
use crate::erased::ErasedStorage;
use crate::sparse_set::ComponentStorage;
use crate::view::{ComponentSet, View};

/// Type-erased map from component type to storage, plus entity lifecycle.
pub struct Registry {
    /// Storages in registration order.
    pub(crate) storages: Vec<Box<dyn ErasedStorage>>,
    /// `TypeId` -> index into `storages`.
    by_type: HashMap<TypeId, usize>,
    /// Archive name -> index into `storages`.
    pub(crate) by_name: HashMap<&'static str, usize>,
    /// Every entity ever created, in creation order.
    pub(crate) entities: Vec<Entity>,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.component_names().collect::<Vec<_>>())
            .field("entities", &self.entities.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            storages: Vec::new(),
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            entities: Vec::with_capacity(config.entity_capacity),
            config,
        }
    }

    /// Returns the configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // --- Registration ---

    /// Registers component type `T`. Does nothing if already registered.
    ///
    /// # Panics
    ///
    /// Panics if a different type is already registered under the same
    /// [`Component::name`].
    pub fn register<T: Component>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            return;
        }

        let name = T::name();
        assert!(
            !self.by_name.contains_key(name),
            "component name {name:?} is already registered by another type"
        );

        let index = self.storages.len();
        self.storages
            .push(Box::new(ComponentStorage::<T>::with_config(self.config.storage)));
        self.by_type.insert(type_id, index);
        self.by_name.insert(name, index);
        debug!(component = name, index, "registered component storage");
    }

    /// Alias of [`register`](Self::register).
    pub fn ensure_exists<T: Component>(&mut self) {
        self.register::<T>();
    }

    /// Registers every component type in a tuple.
    pub fn register_set<S: ComponentSet>(&mut self) {
        S::register(self);
    }

    /// Returns true if `T` is registered.
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Iterates the archive names of registered types in registration order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storages.iter().map(|s| s.component_name())
    }

    // --- Storage access ---

    /// Returns the storage for `T`, or `None` if unregistered.
    #[must_use]
    pub fn try_storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        let index = *self.by_type.get(&TypeId::of::<T>())?;
        self.storages[index]
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    /// Returns the storage for `T` mutably, or `None` if unregistered.
    pub fn try_storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        let index = *self.by_type.get(&TypeId::of::<T>())?;
        self.storages[index]
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Returns the storage for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[must_use]
    pub fn storage<T: Component>(&self) -> &ComponentStorage<T> {
        match self.try_storage::<T>() {
            Some(storage) => storage,
            None => unregistered::<T>(),
        }
    }

    /// Returns the storage for `T` mutably.
    ///
    /// Inserts made through it skip the creation check of
    /// [`add`](Self::add); archives refuse to write a storage holding an
    /// entity this registry never created.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn storage_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        match self.try_storage_mut::<T>() {
            Some(storage) => storage,
            None => unregistered::<T>(),
        }
    }

    // --- Entity lifecycle ---

    /// Creates a new entity.
    ///
    /// The id is the current length of the entity list; ids are never
    /// reused.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit id space is exhausted.
    pub fn create(&mut self) -> Entity {
        let raw = u32::try_from(self.entities.len()).unwrap_or(u32::MAX);
        assert!(raw != u32::MAX, "entity id space exhausted");
        let entity = Entity::from_raw(raw);
        self.entities.push(entity);
        trace!(%entity, "created entity");
        entity
    }

    /// Removes every component of `entity` from every storage.
    ///
    /// The id stays in the entity list, so [`exists`](Self::exists) keeps
    /// reporting true, and it is not handed out again by
    /// [`create`](Self::create).
    pub fn destroy(&mut self, entity: Entity) {
        let mut removed = 0usize;
        for storage in &mut self.storages {
            if storage.remove(entity) {
                removed += 1;
            }
        }
        trace!(%entity, removed, "destroyed entity");
    }

    /// Returns true if `entity` was created by this registry.
    ///
    /// Linear in the number of entities. Always false for the null sentinel.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        !entity.is_null() && self.entities.contains(&entity)
    }

    /// Returns every entity created, in creation order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the length of the entity list.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Creates a new entity carrying a copy of every component of `source`.
    pub fn clone_entity(&mut self, source: Entity) -> Entity {
        let target = self.create();
        for storage in &mut self.storages {
            storage.copy(source, target);
        }
        target
    }

    /// Clears every storage and the entity list. Registrations are kept.
    pub fn clear(&mut self) {
        for storage in &mut self.storages {
            storage.clear();
        }
        self.entities.clear();
        debug!(storages = self.storages.len(), "cleared registry");
    }

    // --- Components ---

    /// Inserts or overwrites the `T` component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` was not created by this
    /// registry.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        self.assert_created(entity);
        self.storage_mut::<T>().insert(entity, value)
    }

    /// Inserts or overwrites the `T` component of `entity` with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` was not created by this
    /// registry.
    pub fn add_default<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.add(entity, T::default())
    }

    /// Gives `entity` a default-constructed component of the type archived
    /// under `name`, keeping any existing value.
    ///
    /// Returns false if no registered type uses `name`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` was not created by this registry.
    pub fn add_default_by_name(&mut self, name: &str, entity: Entity) -> bool {
        self.assert_created(entity);
        let Some(&index) = self.by_name.get(name) else {
            return false;
        };
        self.storages[index].insert_default(entity);
        true
    }

    /// Removes and returns the `T` component of `entity`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>().remove(entity)
    }

    /// Copies the `T` component of `from` onto `to`.
    ///
    /// Returns false if `from` has no `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `to` was not created by this
    /// registry.
    pub fn copy<T: Component>(&mut self, from: Entity, to: Entity) -> bool {
        self.assert_created(to);
        self.storage_mut::<T>().copy(from, to)
    }

    /// Returns the `T` component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` has no `T`.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        self.storage::<T>().get(entity)
    }

    /// Returns the `T` component of `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` has no `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.storage_mut::<T>().get_mut(entity)
    }

    /// Returns references to every component in `S` for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if any type is unregistered or missing on `entity`.
    #[must_use]
    pub fn get_many<S: ComponentSet>(&self, entity: Entity) -> S::Refs<'_> {
        S::fetch(S::storages(self), entity)
    }

    /// Returns the `T` component of `entity`, or `None`.
    #[must_use]
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.try_storage::<T>()?.try_get(entity)
    }

    /// Returns the `T` component of `entity` mutably, or `None`.
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.try_storage_mut::<T>()?.try_get_mut(entity)
    }

    /// Returns true if `entity` is non-null and has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        !entity.is_null()
            && self
                .try_storage::<T>()
                .is_some_and(|storage| storage.contains(entity))
    }

    /// Returns true if `entity` is non-null and has every component in `S`.
    #[must_use]
    pub fn has_all<S: ComponentSet>(&self, entity: Entity) -> bool {
        S::try_storages(self).is_some_and(|storages| S::contains_all(storages, entity))
    }

    /// Returns the number of `T` components.
    #[must_use]
    pub fn count<T: Component>(&self) -> usize {
        self.try_storage::<T>().map_or(0, ComponentStorage::len)
    }

    /// Returns true if at least one entity has a `T`.
    #[must_use]
    pub fn any<T: Component>(&self) -> bool {
        self.count::<T>() > 0
    }

    // --- Iteration ---

    /// Iterates every `(entity, &T)` in dense order.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn each<T: Component>(&self) -> impl ExactSizeIterator<Item = (Entity, &T)> + '_ {
        self.storage::<T>().iter()
    }

    /// Iterates every `(entity, &mut T)` in dense order.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn each_mut<T: Component>(
        &mut self,
    ) -> impl ExactSizeIterator<Item = (Entity, &mut T)> + '_ {
        self.storage_mut::<T>().iter_mut()
    }

    /// Iterates entities holding every component in `S`.
    ///
    /// The driving sequence follows [`RegistryConfig::query_strategy`].
    ///
    /// # Panics
    ///
    /// Panics if any type in `S` is not registered.
    pub fn view<S: ComponentSet>(&self) -> View<'_, S> {
        let storages = S::storages(self);
        let driver = match self.config.query_strategy {
            QueryStrategy::EntityList => self.entities.as_slice(),
            QueryStrategy::SmallestStorage => S::smallest(storages),
        };
        View::new(storages, driver)
    }

    /// Ids are handed out as `0, 1, 2, ...`, so creation is a bounds check.
    #[track_caller]
    fn assert_created(&self, entity: Entity) {
        assert!(
            entity.index() < self.entities.len(),
            "entity {entity} was not created by this registry"
        );
    }
}

#[cold]
#[track_caller]
fn unregistered<T: Component>() -> ! {
    panic!("component type {} is not registered", T::name())
}
