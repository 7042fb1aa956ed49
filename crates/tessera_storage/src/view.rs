//! Multi-component views.
//!
//! A [`View`] walks a driving entity sequence and yields only the entities
//! present in every requested storage, together with references to their
//! components. Nothing is materialized: each step tests membership in the
//! listed order and short-circuits on the first miss.
//!
//! # Invalidation
//!
//! A view borrows the registry immutably, so the borrow checker rejects
//! adding or removing components while a view is alive. Collect the
//! entities first when a loop needs to mutate structure.
//!
//! Removal is swap-and-pop, so any `remove` on a storage (including one
//! done through [`Registry::destroy`]) moves its last component into the
//! hole. Dense positions taken earlier from
//! [`ComponentStorage::packed_index`], [`ComponentStorage::iter`], or a
//! `SmallestStorage` view no longer name the same entity afterwards. Hold
//! on to entities, not dense positions, across removals.

use tessera_foundation::Entity;

use crate::component::Component;
use crate::registry::Registry;
use crate::sparse_set::ComponentStorage;

/// A tuple of component types that can be queried together.
///
/// Implemented for tuples of one to six [`Component`] types.
pub trait ComponentSet: 'static {
    /// Resolved storages, one reference per component type.
    type Storages<'a>: Copy;

    /// Component references yielded for one entity.
    type Refs<'a>;

    /// Registers every component type in the set.
    fn register(registry: &mut Registry);

    /// Resolves every storage.
    ///
    /// # Panics
    ///
    /// Panics if any component type is not registered.
    fn storages(registry: &Registry) -> Self::Storages<'_>;

    /// Resolves every storage, or `None` if any type is not registered.
    fn try_storages(registry: &Registry) -> Option<Self::Storages<'_>>;

    /// Returns true if `entity` is non-null and present in every storage.
    fn contains_all<'a>(storages: Self::Storages<'a>, entity: Entity) -> bool;

    /// Fetches every component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` lacks any of the components.
    fn fetch<'a>(storages: Self::Storages<'a>, entity: Entity) -> Self::Refs<'a>;

    /// Returns the dense entity list of the smallest storage.
    fn smallest<'a>(storages: Self::Storages<'a>) -> &'a [Entity];
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            type Storages<'a> = ($(&'a ComponentStorage<$name>,)+);
            type Refs<'a> = ($(&'a $name,)+);

            fn register(registry: &mut Registry) {
                $(registry.register::<$name>();)+
            }

            fn storages(registry: &Registry) -> Self::Storages<'_> {
                ($(registry.storage::<$name>(),)+)
            }

            fn try_storages(registry: &Registry) -> Option<Self::Storages<'_>> {
                Some(($(registry.try_storage::<$name>()?,)+))
            }

            #[allow(non_snake_case)]
            fn contains_all<'a>(storages: Self::Storages<'a>, entity: Entity) -> bool {
                let ($($name,)+) = storages;
                !entity.is_null() $(&& $name.contains(entity))+
            }

            #[allow(non_snake_case)]
            fn fetch<'a>(storages: Self::Storages<'a>, entity: Entity) -> Self::Refs<'a> {
                let ($($name,)+) = storages;
                ($($name.get(entity),)+)
            }

            #[allow(non_snake_case)]
            fn smallest<'a>(storages: Self::Storages<'a>) -> &'a [Entity] {
                let ($($name,)+) = storages;
                [$($name.entities(),)+]
                    .into_iter()
                    .min_by_key(|entities| entities.len())
                    .unwrap_or_default()
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

/// Lazy iterator over entities holding every component in `S`.
///
/// Yields `(entity, (&A, &B, ...))`. Construction already skips to the
/// first match, so [`View::is_empty`] is exact without advancing.
pub struct View<'a, S: ComponentSet> {
    storages: S::Storages<'a>,
    driver: &'a [Entity],
    cursor: usize,
}

impl<'a, S: ComponentSet> View<'a, S> {
    pub(crate) fn new(storages: S::Storages<'a>, driver: &'a [Entity]) -> Self {
        let mut view = Self {
            storages,
            driver,
            cursor: 0,
        };
        view.skip_unmatched();
        view
    }

    /// Returns true if the view has no further matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.driver.len()
    }

    /// Yields only the matching entities.
    pub fn entities(self) -> impl Iterator<Item = Entity> + 'a {
        self.map(|(entity, _)| entity)
    }

    fn skip_unmatched(&mut self) {
        while let Some(&entity) = self.driver.get(self.cursor) {
            if S::contains_all(self.storages, entity) {
                break;
            }
            self.cursor += 1;
        }
    }
}

impl<'a, S: ComponentSet> Iterator for View<'a, S> {
    type Item = (Entity, S::Refs<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let entity = *self.driver.get(self.cursor)?;
        self.cursor += 1;
        let refs = S::fetch(self.storages, entity);
        self.skip_unmatched();
        Some((entity, refs))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.driver.len().saturating_sub(self.cursor);
        (usize::from(remaining > 0), Some(remaining))
    }
}
