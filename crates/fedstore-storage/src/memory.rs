//! In-memory implementation of the storage contracts.
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! servers. Each bucket is a `BTreeMap` of codec blobs keyed by identifier
//! bytes, so prefix scans, ordering and decode-failure handling have the
//! same semantics as [`KvStore`](crate::KvStore).

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::Utc;

use fedstore_vocab::{codec, Iri, Item, OrderedCollection};

use crate::config::{Config, Hooks};
use crate::error::StorageError;
use crate::idgen;
use crate::routing;
use crate::traits::{CollectionStore, ItemLoader, ItemSaver, Store};
use crate::types::{BucketKind, Filter};

type Blobs = BTreeMap<Vec<u8>, Vec<u8>>;

/// Bucket tree held entirely in memory.
pub struct InMemoryStore {
    actors: Blobs,
    activities: Blobs,
    objects: Blobs,
    collections: Blobs,
    hooks: Hooks,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::with_hooks_from(Hooks::noop())
    }

    /// Uses the log and error hooks of `config`; its path and bucket name
    /// are ignored.
    pub fn with_config(config: &Config) -> Self {
        InMemoryStore::with_hooks_from(Hooks::from_config(config))
    }

    fn with_hooks_from(hooks: Hooks) -> Self {
        InMemoryStore {
            actors: Blobs::new(),
            activities: Blobs::new(),
            objects: Blobs::new(),
            collections: Blobs::new(),
            hooks,
        }
    }

    fn bucket(&self, kind: BucketKind) -> &Blobs {
        match kind {
            BucketKind::Actors => &self.actors,
            BucketKind::Activities => &self.activities,
            BucketKind::Objects => &self.objects,
            BucketKind::Collections => &self.collections,
        }
    }

    fn bucket_mut(&mut self, kind: BucketKind) -> &mut Blobs {
        match kind {
            BucketKind::Actors => &mut self.actors,
            BucketKind::Activities => &mut self.activities,
            BucketKind::Objects => &mut self.objects,
            BucketKind::Collections => &mut self.collections,
        }
    }

    fn scan(&self, kind: BucketKind, filter: &Filter) -> Vec<Item> {
        let bucket = self.bucket(kind);
        let mut items = Vec::new();
        for prefix in filter.iris() {
            let prefix = prefix.as_bytes();
            let range = bucket.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded));
            for (key, value) in range.take_while(|(k, _)| k.starts_with(prefix)) {
                match codec::unmarshal(value) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        let key = String::from_utf8_lossy(key);
                        self.hooks
                            .error(&format!("skipping undecodable entry {} in {}: {}", key, kind, e));
                        tracing::warn!(bucket = %kind, key = %key, error = %e, "skipping undecodable entry");
                    }
                }
            }
        }
        items
    }

    fn load_kind(&self, kind: BucketKind, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        let items = self.scan(kind, filter);
        let count = items.len();
        Ok((items, count))
    }

    fn materialize(&self, iri: &Iri) -> Result<Option<OrderedCollection>, StorageError> {
        let Some(blob) = self.collections.get(iri.as_bytes()) else {
            return Ok(None);
        };
        let members = match codec::unmarshal_iris(blob) {
            Ok(members) => members,
            Err(e) => {
                self.hooks
                    .error(&format!("skipping undecodable collection {}: {}", iri, e));
                tracing::warn!(bucket = %BucketKind::Collections, key = %iri, error = %e, "skipping undecodable entry");
                return Ok(None);
            }
        };
        let mut col = OrderedCollection::new(iri.clone());
        if let Some(kind) = BucketKind::classify_members(&members) {
            col.ordered_items = self.scan(kind, &Filter::new(members)?);
            col.total_items = col.ordered_items.len() as u64;
        }
        Ok(Some(col))
    }

    fn save_to(&mut self, kind: BucketKind, item: Item) -> Result<Item, StorageError> {
        if item.id().is_empty() {
            return Err(StorageError::Invalid(format!("cannot save {} without an id", item.kind())));
        }
        let blob = codec::marshal(&item)?;
        let key = item.id().as_bytes().to_vec();
        self.bucket_mut(kind).insert(key, blob);
        self.hooks.info(&format!("Added new {}: {}", kind.noun(), item.id()));
        tracing::info!(bucket = %kind, iri = %item.id(), "stored item");
        Ok(item)
    }

    fn edit_members(&mut self, col: &Iri, edit: impl FnOnce(&mut Vec<Iri>)) -> Result<(), StorageError> {
        let blob = self
            .collections
            .get_mut(col.as_bytes())
            .ok_or_else(|| StorageError::NotFound(format!("collection {}", col)))?;
        let mut members = codec::unmarshal_iris(blob)?;
        edit(&mut members);
        *blob = codec::marshal_iris(&members)?;
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemLoader for InMemoryStore {
    fn load(&self, _filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        Err(StorageError::NotImplemented("in-memory load".into()))
    }

    fn load_actors(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        self.load_kind(BucketKind::Actors, filter)
    }

    fn load_activities(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        self.load_kind(BucketKind::Activities, filter)
    }

    fn load_objects(&self, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        self.load_kind(BucketKind::Objects, filter)
    }

    fn load_collection(
        &self,
        filter: &Filter,
    ) -> Result<Option<OrderedCollection>, StorageError> {
        let mut ret = None;
        for iri in filter.iris() {
            if let Some(col) = self.materialize(iri)? {
                ret = Some(col);
            }
        }
        Ok(ret)
    }
}

impl ItemSaver for InMemoryStore {
    fn save_activity(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Activities, item)
    }

    fn save_actor(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Actors, item)
    }

    fn update_actor(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("update_actor in memory store".into()))
    }

    fn delete_actor(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("delete_actor in memory store".into()))
    }

    fn save_object(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Objects, item)
    }

    fn update_object(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("update_object in memory store".into()))
    }

    fn delete_object(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("delete_object in memory store".into()))
    }

    fn generate_id(
        &self,
        item: &mut Item,
        part_of: &Iri,
        _by: Option<&Item>,
    ) -> Result<Iri, StorageError> {
        idgen::generate_id(item, part_of)
    }
}

impl Store for InMemoryStore {
    fn load(&self, iri: &Iri) -> Result<Item, StorageError> {
        if let Some(col) = self.materialize(iri)? {
            return Ok(Item::Collection(col));
        }
        for kind in [BucketKind::Actors, BucketKind::Activities, BucketKind::Objects] {
            if let Some(blob) = self.bucket(kind).get(iri.as_bytes()) {
                return Ok(codec::unmarshal(blob)?);
            }
        }
        Err(StorageError::NotFound(format!("item {}", iri)))
    }

    fn save(&mut self, mut item: Item) -> Result<Item, StorageError> {
        let kind = routing::bucket_for(&item)?;
        routing::stamp_published(&mut item, Utc::now());
        match kind {
            BucketKind::Collections => {
                let col = routing::into_collection(item)?;
                self.create(col).map(Item::Collection)
            }
            kind => self.save_to(kind, item),
        }
    }

    fn delete(&mut self, item: Item) -> Result<Item, StorageError> {
        let kind = routing::deletable_bucket_for(&item)?;
        let key = item.id().as_bytes().to_vec();
        if !self.bucket(kind).contains_key(&key) {
            return Err(StorageError::NotFound(format!("item {}", item.id())));
        }
        let tombstone = Item::Tombstone(item.tombstone(Utc::now()));
        let blob = codec::marshal(&tombstone)?;
        self.bucket_mut(kind).insert(key, blob);
        self.hooks.info(&format!("Deleted {}: {}", kind.noun(), item.id()));
        tracing::info!(bucket = %kind, iri = %item.id(), "tombstoned item");
        Ok(tombstone)
    }
}

impl CollectionStore for InMemoryStore {
    fn create(&mut self, mut col: OrderedCollection) -> Result<OrderedCollection, StorageError> {
        if col.base.id.is_empty() {
            return Err(StorageError::Invalid("cannot create a collection without an id".into()));
        }
        let members = col.member_ids();
        let blob = codec::marshal_iris(&members)?;
        self.collections.insert(col.base.id.as_bytes().to_vec(), blob);
        col.total_items = members.len() as u64;
        self.hooks.info(&format!("Added new collection: {}", col.base.id));
        tracing::info!(iri = %col.base.id, members = members.len(), "created collection");
        Ok(col)
    }

    fn add_to(&mut self, col: &Iri, item: &Item) -> Result<(), StorageError> {
        let member = item.id().clone();
        if member.is_empty() {
            return Err(StorageError::Invalid("cannot add an item without an id".into()));
        }
        self.edit_members(col, |members| {
            if !members.contains(&member) {
                members.push(member);
            }
        })
    }

    fn remove_from(&mut self, col: &Iri, item: &Item) -> Result<(), StorageError> {
        let member = item.id();
        self.edit_members(col, |members| members.retain(|m| m != member))
    }
}
