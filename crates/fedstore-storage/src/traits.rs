//! The storage contracts upper layers program against.
//!
//! - [`Store`] and [`CollectionStore`] are the capability sets a backing
//!   engine must provide to be a drop-in store for the protocol server.
//! - [`ItemLoader`] and [`ItemSaver`] are the per-kind primitives the
//!   key-value backends are built from.
//!
//! All backends ([`KvStore`](crate::KvStore), [`InMemoryStore`](crate::InMemoryStore))
//! implement all four. The traits are synchronous: every call runs in its
//! own transaction and completes before returning.

use fedstore_vocab::{Iri, Item, OrderedCollection};

use crate::error::StorageError;
use crate::types::Filter;

/// Load, save and delete by identifier.
pub trait Store {
    /// Returns the item or materialized collection stored under `iri`.
    fn load(&self, iri: &Iri) -> Result<Item, StorageError>;

    /// Stores the item, returning it with any server-assigned properties
    /// (such as `published`) filled in.
    fn save(&mut self, item: Item) -> Result<Item, StorageError>;

    /// Replaces the stored item with a tombstone and returns the tombstone.
    fn delete(&mut self, item: Item) -> Result<Item, StorageError>;
}

/// Collection creation and membership.
pub trait CollectionStore {
    /// Creates (or overwrites) the collection `col` with its current members.
    fn create(&mut self, col: OrderedCollection) -> Result<OrderedCollection, StorageError>;

    /// Appends `item` to the collection `col`.
    fn add_to(&mut self, col: &Iri, item: &Item) -> Result<(), StorageError>;

    /// Removes `item` from the collection `col`.
    fn remove_from(&mut self, col: &Iri, item: &Item) -> Result<(), StorageError>;
}

/// Prefix queries against a single bucket.
pub trait ItemLoader {
    /// Kind-agnostic load. Backends may refuse with `NotImplemented`.
    fn load(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError>;

    fn load_actors(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError>;

    fn load_activities(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError>;

    fn load_objects(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError>;

    /// Materializes the collection named by the filter. When the filter
    /// names several collections only the last one found is returned.
    fn load_collection(&self, filter: &Filter)
        -> Result<Option<OrderedCollection>, StorageError>;
}

/// Per-kind writes and identifier assignment.
pub trait ItemSaver {
    fn save_activity(&mut self, item: Item) -> Result<Item, StorageError>;

    fn save_actor(&mut self, item: Item) -> Result<Item, StorageError>;

    fn update_actor(&mut self, item: Item) -> Result<Item, StorageError>;

    fn delete_actor(&mut self, item: Item) -> Result<Item, StorageError>;

    fn save_object(&mut self, item: Item) -> Result<Item, StorageError>;

    fn update_object(&mut self, item: Item) -> Result<Item, StorageError>;

    fn delete_object(&mut self, item: Item) -> Result<Item, StorageError>;

    /// Assigns `item` a fresh identifier under `part_of` and returns the
    /// identifier it ends up with. `by` is the acting item.
    fn generate_id(
        &self,
        item: &mut Item,
        part_of: &Iri,
        by: Option<&Item>,
    ) -> Result<Iri, StorageError>;
}
