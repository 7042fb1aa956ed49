//! Configuration for component storages and registries.

use tessera_foundation::DEFAULT_MAX_SEQUENCE_LEN;

/// How the sparse index grows when an entity beyond its end is inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SparseGrowth {
    /// Resize to exactly `entity + 1` slots.
    #[default]
    Exact,
    /// Resize to the next power of two at or above `entity + 1`.
    Doubling,
}

impl SparseGrowth {
    /// Returns the sparse length to grow to so that `index` is addressable.
    #[must_use]
    pub fn target_len(self, index: usize) -> usize {
        let required = index + 1;
        match self {
            Self::Exact => required,
            Self::Doubling => required.next_power_of_two(),
        }
    }
}

/// Which entity sequence drives a multi-component view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryStrategy {
    /// Walk the registry's entity list in creation order.
    ///
    /// O(N × K) for N entities and K component types.
    #[default]
    EntityList,
    /// Walk the dense entities of the smallest requested storage.
    ///
    /// Yields the same set as [`QueryStrategy::EntityList`], in that
    /// storage's dense order.
    SmallestStorage,
}

/// Configuration for a single component storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Dense slots reserved when the storage is created.
    pub initial_capacity: usize,
    /// Growth policy for the sparse index.
    pub sparse_growth: SparseGrowth,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            sparse_growth: SparseGrowth::Exact,
        }
    }
}

impl StorageConfig {
    /// Builder method to set the initial dense capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builder method to set the sparse growth policy.
    #[must_use]
    pub fn with_sparse_growth(mut self, growth: SparseGrowth) -> Self {
        self.sparse_growth = growth;
        self
    }
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Applied to every storage the registry creates.
    pub storage: StorageConfig,
    /// Entity list slots reserved up front.
    pub entity_capacity: usize,
    /// Iteration strategy for multi-component views.
    pub query_strategy: QueryStrategy,
    /// Largest length prefix accepted when reading binary archives.
    pub max_sequence_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            entity_capacity: 0,
            query_strategy: QueryStrategy::EntityList,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration tuned for scenes with many entities.
    ///
    /// Reserves space up front, grows sparse indices geometrically, and
    /// drives views from the smallest storage.
    #[must_use]
    pub fn large_scene() -> Self {
        Self {
            storage: StorageConfig {
                initial_capacity: 1024,
                sparse_growth: SparseGrowth::Doubling,
            },
            entity_capacity: 16_384,
            query_strategy: QueryStrategy::SmallestStorage,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }

    /// Builder method to set the per-storage configuration.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Builder method to set the reserved entity capacity.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Builder method to set the view iteration strategy.
    #[must_use]
    pub fn with_query_strategy(mut self, strategy: QueryStrategy) -> Self {
        self.query_strategy = strategy;
        self
    }

    /// Builder method to set the archive length-prefix limit.
    #[must_use]
    pub fn with_max_sequence_len(mut self, limit: usize) -> Self {
        self.max_sequence_len = limit;
        self
    }
}
