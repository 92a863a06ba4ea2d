//! Key-value implementation of the storage contracts.
//!
//! [`KvStore`] keeps items in the four buckets under one root bucket of a
//! SQLite-backed [`bucket`](crate::bucket) tree. Items are keyed by their
//! identifier and stored as codec blobs; collections are stored as the
//! ordered list of their member identifiers and materialized on load.
//!
//! Every public operation runs in exactly one transaction: reads in a
//! snapshot, writes in the single write transaction, rolled back on any
//! error.

use chrono::Utc;
use rusqlite::Connection;

use fedstore_vocab::{codec, Iri, Item, OrderedCollection};

use crate::bucket::{update, view, Bucket, Tx};
use crate::config::{Config, Hooks};
use crate::error::{ResultExt, StorageError};
use crate::idgen;
use crate::traits::{CollectionStore, ItemLoader, ItemSaver, Store};
use crate::types::{BucketKind, Filter};

/// Storage adapter over an exclusively-held SQLite file.
pub struct KvStore {
    conn: Connection,
    root: Vec<u8>,
    hooks: Hooks,
}

impl KvStore {
    /// Opens the database at `config.path` and checks that the root bucket
    /// exists and is writable.
    ///
    /// The bucket schema must already be provisioned (see
    /// [`schema::bootstrap`](crate::schema::bootstrap)); a missing root
    /// bucket fails with `NotFound`.
    pub fn open(config: Config) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(&config.path).context("could not open db")?;
        let store = KvStore::with_connection(conn, &config)?;
        tracing::debug!(path = %config.path.display(), root = %config.bucket_name, "opened store");
        Ok(store)
    }

    /// Wraps an already-migrated connection (e.g. an in-memory one).
    pub fn with_connection(mut conn: Connection, config: &Config) -> Result<Self, StorageError> {
        let root = config.bucket_name.as_bytes().to_vec();
        update(&mut conn, |tx| match tx.bucket(&root)? {
            Some(bucket) if bucket.writable() => Ok(()),
            _ => Err(StorageError::NotFound(format!(
                "root bucket {} not found or is not writable",
                config.bucket_name
            ))),
        })
        .context("could not set up buckets")?;

        Ok(KvStore {
            conn,
            root,
            hooks: Hooks::from_config(config),
        })
    }

    /// Releases the database file.
    pub fn close(self) -> Result<(), StorageError> {
        self.conn.close().map_err(|(_, e)| StorageError::from(e))
    }

    fn load_kind(&self, kind: BucketKind, filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        let items = view(&self.conn, |tx| {
            load_from_bucket(tx, &self.root, kind, filter, &self.hooks)
        })
        .context(format!("load {}", kind))?;
        let count = items.len();
        Ok((items, count))
    }

    fn save_to(&mut self, kind: BucketKind, item: Item) -> Result<Item, StorageError> {
        let key = item.id().clone();
        if key.is_empty() {
            return Err(StorageError::Invalid(format!("cannot save {} without an id", item.kind())));
        }
        let blob = codec::marshal(&item).context(format!("could not marshal {}", item.kind()))?;
        update(&mut self.conn, |tx| {
            let bucket = writable_bucket(tx, &self.root, kind)?;
            bucket
                .put(key.as_bytes(), &blob)
                .context("could not insert entry")
        })
        .context(format!("save to {}", kind))?;

        self.hooks.info(&format!("Added new {}: {}", kind.noun(), key));
        tracing::info!(bucket = %kind, iri = %key, "stored item");
        Ok(item)
    }

    /// Rewrites the membership list of `col` with `edit`.
    fn edit_members(
        &mut self,
        col: &Iri,
        edit: impl FnOnce(&mut Vec<Iri>),
    ) -> Result<(), StorageError> {
        update(&mut self.conn, |tx| {
            let bucket = writable_bucket(tx, &self.root, BucketKind::Collections)?;
            let blob = bucket
                .get(col.as_bytes())?
                .ok_or_else(|| StorageError::NotFound(format!("collection {}", col)))?;
            let mut members = codec::unmarshal_iris(&blob)?;
            edit(&mut members);
            bucket.put(col.as_bytes(), &codec::marshal_iris(&members)?)
        })
        .context(format!("update collection {}", col))
    }
}

fn root_bucket<'a>(tx: &'a Tx<'_>, root: &[u8]) -> Result<Bucket<'a>, StorageError> {
    tx.bucket(root)?.ok_or_else(|| {
        StorageError::NotFound(format!("invalid bucket {}", String::from_utf8_lossy(root)))
    })
}

fn child_bucket<'a>(root: &Bucket<'a>, kind: BucketKind) -> Result<Bucket<'a>, StorageError> {
    root.bucket(kind.as_bytes())?.ok_or_else(|| {
        StorageError::NotFound(format!("invalid bucket {}.{}", root.path(), kind))
    })
}

/// Resolves `root.kind` and checks both levels accept writes.
fn writable_bucket<'a>(
    tx: &'a Tx<'_>,
    root: &[u8],
    kind: BucketKind,
) -> Result<Bucket<'a>, StorageError> {
    let rb = root_bucket(tx, root)?;
    if !rb.writable() {
        return Err(StorageError::NotWritable(format!("bucket {}", rb.path())));
    }
    let bucket = child_bucket(&rb, kind)?;
    if !bucket.writable() {
        return Err(StorageError::NotWritable(format!("bucket {}", bucket.path())));
    }
    Ok(bucket)
}

/// Collects every decodable item in `root.kind` whose key starts with one of
/// the filter's prefixes: prefixes in filter order, keys in key order.
/// Undecodable entries are reported to the error hook and skipped.
fn load_from_bucket(
    tx: &Tx<'_>,
    root: &[u8],
    kind: BucketKind,
    filter: &Filter,
    hooks: &Hooks,
) -> Result<Vec<Item>, StorageError> {
    let rb = root_bucket(tx, root)?;
    let bucket = child_bucket(&rb, kind)?;

    let mut items = Vec::new();
    for prefix in filter.iris() {
        for entry in bucket.cursor().prefixed(prefix.as_bytes()) {
            let (key, value) = entry?;
            match codec::unmarshal(&value) {
                Ok(item) => items.push(item),
                Err(e) => skip_corrupt(hooks, bucket.path(), &key, &e),
            }
        }
    }
    Ok(items)
}

fn skip_corrupt(hooks: &Hooks, path: &str, key: &[u8], err: &dyn std::error::Error) {
    let key = String::from_utf8_lossy(key);
    hooks.error(&format!("skipping undecodable entry {} in {}: {}", key, path, err));
    tracing::warn!(bucket = path, key = %key, error = %err, "skipping undecodable entry");
}

/// Builds the collection stored under `iri`, resolving its members.
///
/// Returns `None` when there is no such collection or its member list does
/// not decode.
fn materialize(
    tx: &Tx<'_>,
    root: &[u8],
    iri: &Iri,
    hooks: &Hooks,
) -> Result<Option<OrderedCollection>, StorageError> {
    let rb = root_bucket(tx, root)?;
    let cb = child_bucket(&rb, BucketKind::Collections)?;
    let Some(blob) = cb.get(iri.as_bytes())? else {
        return Ok(None);
    };
    let members = match codec::unmarshal_iris(&blob) {
        Ok(members) => members,
        Err(e) => {
            skip_corrupt(hooks, cb.path(), iri.as_bytes(), &e);
            return Ok(None);
        }
    };

    let mut col = OrderedCollection::new(iri.clone());
    if let Some(kind) = BucketKind::classify_members(&members) {
        let filter = Filter::new(members)?;
        col.ordered_items = load_from_bucket(tx, root, kind, &filter, hooks)?;
        col.total_items = col.ordered_items.len() as u64;
    }
    Ok(Some(col))
}

impl ItemLoader for KvStore {
    fn load(&self, _filter: &Filter) -> Result<(Vec<Item>, usize), StorageError> {
        Err(StorageError::NotImplemented(
            "kv load; use load_actors, load_activities or load_objects".into(),
        ))
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
        view(&self.conn, |tx| {
            let mut ret = None;
            for iri in filter.iris() {
                if let Some(col) = materialize(tx, &self.root, iri, &self.hooks)? {
                    ret = Some(col);
                }
            }
            Ok(ret)
        })
        .context("load collection")
    }
}

impl ItemSaver for KvStore {
    fn save_activity(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Activities, item)
    }

    fn save_actor(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Actors, item)
    }

    fn update_actor(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("update_actor in kv store".into()))
    }

    fn delete_actor(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("delete_actor in kv store".into()))
    }

    fn save_object(&mut self, item: Item) -> Result<Item, StorageError> {
        self.save_to(BucketKind::Objects, item)
    }

    fn update_object(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("update_object in kv store".into()))
    }

    fn delete_object(&mut self, _item: Item) -> Result<Item, StorageError> {
        Err(StorageError::NotImplemented("delete_object in kv store".into()))
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

impl Store for KvStore {
    fn load(&self, iri: &Iri) -> Result<Item, StorageError> {
        view(&self.conn, |tx| {
            if let Some(col) = materialize(tx, &self.root, iri, &self.hooks)? {
                return Ok(Item::Collection(col));
            }
            let rb = root_bucket(tx, &self.root)?;
            for kind in [BucketKind::Actors, BucketKind::Activities, BucketKind::Objects] {
                let bucket = child_bucket(&rb, kind)?;
                if let Some(blob) = bucket.get(iri.as_bytes())? {
                    return Ok(codec::unmarshal(&blob)?);
                }
            }
            Err(StorageError::NotFound(format!("item {}", iri)))
        })
        .context(format!("load {}", iri))
    }

    fn save(&mut self, mut item: Item) -> Result<Item, StorageError> {
        let kind = crate::routing::bucket_for(&item)?;
        crate::routing::stamp_published(&mut item, Utc::now());
        match kind {
            BucketKind::Activities => self.save_activity(item),
            BucketKind::Actors => self.save_actor(item),
            BucketKind::Objects => self.save_object(item),
            BucketKind::Collections => {
                let col = crate::routing::into_collection(item)?;
                self.create(col).map(Item::Collection)
            }
        }
    }

    fn delete(&mut self, item: Item) -> Result<Item, StorageError> {
        let kind = crate::routing::deletable_bucket_for(&item)?;
        let key = item.id().clone();
        let tombstone = Item::Tombstone(item.tombstone(Utc::now()));
        let blob = codec::marshal(&tombstone)?;

        update(&mut self.conn, |tx| {
            let bucket = writable_bucket(tx, &self.root, kind)?;
            if bucket.get(key.as_bytes())?.is_none() {
                return Err(StorageError::NotFound(format!("item {}", key)));
            }
            bucket.put(key.as_bytes(), &blob)
        })
        .context(format!("delete from {}", kind))?;

        self.hooks.info(&format!("Deleted {}: {}", kind.noun(), key));
        tracing::info!(bucket = %kind, iri = %key, "tombstoned item");
        Ok(tombstone)
    }
}

impl CollectionStore for KvStore {
    fn create(&mut self, mut col: OrderedCollection) -> Result<OrderedCollection, StorageError> {
        let key = col.base.id.clone();
        if key.is_empty() {
            return Err(StorageError::Invalid("cannot create a collection without an id".into()));
        }
        let members = col.member_ids();
        let blob = codec::marshal_iris(&members)?;
        update(&mut self.conn, |tx| {
            writable_bucket(tx, &self.root, BucketKind::Collections)?.put(key.as_bytes(), &blob)
        })
        .context(format!("create collection {}", key))?;

        col.total_items = members.len() as u64;
        self.hooks.info(&format!("Added new collection: {}", key));
        tracing::info!(iri = %key, members = members.len(), "created collection");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::{bootstrap_connection, open_in_memory};
    use fedstore_vocab::{Activity, Actor, Object, ObjectType};
    use std::sync::{Arc, Mutex};

    const ROOT: &str = "fedstore";

    fn store_with_config(config: &Config) -> KvStore {
        let mut conn = open_in_memory().unwrap();
        bootstrap_connection(&mut conn, ROOT).unwrap();
        KvStore::with_connection(conn, config).unwrap()
    }

    fn store() -> KvStore {
        store_with_config(&Config::new(":memory:", ROOT))
    }

    fn note(id: &str) -> Item {
        let mut o = Object::new(id, ObjectType::Note);
        o.content = Some(format!("content of {}", id));
        Item::Object(o)
    }

    fn person(id: &str) -> Item {
        Item::Actor(Actor::from_object(Object::new(id, ObjectType::Person)))
    }

    fn create(id: &str) -> Item {
        Item::Activity(Activity::from_object(Object::new(id, ObjectType::Create)))
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|it| it.id().as_str()).collect()
    }

    fn filter(prefixes: &[&str]) -> Filter {
        Filter::new(prefixes.iter().map(|p| Iri::from(*p)).collect()).unwrap()
    }

    #[test]
    fn missing_root_is_not_found() {
        let conn = open_in_memory().unwrap();
        let err = KvStore::with_connection(conn, &Config::new(":memory:", ROOT))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn save_then_load_by_own_id() {
        let mut s = store();
        s.save_object(note("http://x/objects/1")).unwrap();
        let (items, count) = s.load_objects(&filter(&["http://x/objects/1"])).unwrap();
        assert_eq!(count, 1);
        assert_eq!(items, vec![note("http://x/objects/1")]);
    }

    #[test]
    fn kinds_are_isolated() {
        let mut s = store();
        s.save_actor(person("http://x/actors/a")).unwrap();
        s.save_activity(create("http://x/activities/1")).unwrap();
        let (items, count) = s.load_objects(&filter(&["http://x/"])).unwrap();
        assert!(items.is_empty());
        assert_eq!(count, 0);
        let (items, _) = s.load_actors(&filter(&["http://x/"])).unwrap();
        assert_eq!(ids(&items), vec!["http://x/actors/a"]);
    }

    #[test]
    fn second_save_overwrites() {
        let mut s = store();
        s.save_object(note("http://x/objects/1")).unwrap();
        let mut second = Object::new("http://x/objects/1", ObjectType::Note);
        second.content = Some("edited".into());
        s.save_object(Item::Object(second.clone())).unwrap();

        let (items, count) = s.load_objects(&filter(&["http://x/objects/1"])).unwrap();
        assert_eq!(count, 1);
        assert_eq!(items, vec![Item::Object(second)]);
    }

    #[test]
    fn prefixes_concatenate_in_filter_order() {
        let mut s = store();
        for id in ["http://x/objects/b2", "http://x/objects/a1", "http://x/objects/b1", "http://x/objects/a2"] {
            s.save_object(note(id)).unwrap();
        }
        let (items, count) = s
            .load_objects(&filter(&["http://x/objects/b", "http://x/objects/a"]))
            .unwrap();
        assert_eq!(count, 4);
        assert_eq!(
            ids(&items),
            vec![
                "http://x/objects/b1",
                "http://x/objects/b2",
                "http://x/objects/a1",
                "http://x/objects/a2"
            ]
        );
    }

    #[test]
    fn overlapping_prefixes_are_not_deduplicated() {
        let mut s = store();
        s.save_object(note("http://x/objects/1")).unwrap();
        let (items, count) = s
            .load_objects(&filter(&["http://x/objects", "http://x/objects/1"]))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(ids(&items), vec!["http://x/objects/1", "http://x/objects/1"]);
    }

    #[test]
    fn generic_load_is_not_implemented() {
        let s = store();
        let err = ItemLoader::load(&s, &filter(&["http://x/"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn update_and_delete_are_not_implemented() {
        let mut s = store();
        assert_eq!(s.update_actor(person("a")).unwrap_err().kind(), ErrorKind::NotImplemented);
        assert_eq!(s.delete_actor(person("a")).unwrap_err().kind(), ErrorKind::NotImplemented);
        assert_eq!(s.update_object(note("o")).unwrap_err().kind(), ErrorKind::NotImplemented);
        assert_eq!(s.delete_object(note("o")).unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn corrupt_entries_are_skipped_and_reported() {
        let errors = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = errors.clone();
        let config = Config::new(":memory:", ROOT)
            .with_err_fn(move |msg| sink.lock().unwrap().push(msg.to_string()));
        let mut s = store_with_config(&config);
        s.save_object(note("http://x/objects/1")).unwrap();
        s.save_object(note("http://x/objects/3")).unwrap();
        update(&mut s.conn, |tx| {
            writable_bucket(tx, s.root.as_slice(), BucketKind::Objects)?
                .put(b"http://x/objects/2", b"{broken")
        })
        .unwrap();

        let (items, count) = s.load_objects(&filter(&["http://x/objects/"])).unwrap();
        assert_eq!(count, 2);
        assert_eq!(ids(&items), vec!["http://x/objects/1", "http://x/objects/3"]);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("http://x/objects/2"));
    }

    #[test]
    fn save_reports_to_log_hook() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = lines.clone();
        let config = Config::new(":memory:", ROOT)
            .with_log_fn(move |msg| sink.lock().unwrap().push(msg.to_string()));
        let mut s = store_with_config(&config);
        s.save_activity(create("http://x/activities/1")).unwrap();
        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["Added new activity: http://x/activities/1".to_string()]
        );
    }

    #[test]
    fn save_without_id_is_invalid() {
        let mut s = store();
        let err = s.save_object(note("")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn missing_child_bucket_is_not_found() {
        let mut conn = open_in_memory().unwrap();
        update(&mut conn, |tx| tx.create_bucket_if_not_exists(ROOT.as_bytes()).map(|_| ())).unwrap();
        let mut s = KvStore::with_connection(conn, &Config::new(":memory:", ROOT)).unwrap();
        let err = s.save_object(note("http://x/objects/1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("fedstore.objects"));
        let err = s.load_actors(&filter(&["http://x"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn collection_materializes_members_in_list_order() {
        let mut s = store();
        s.save_object(note("http://x/objects/2")).unwrap();
        s.save_object(note("http://x/objects/1")).unwrap();
        let mut col = OrderedCollection::new("http://x/collections/c");
        col.ordered_items = vec![
            Item::Link(Iri::from("http://x/objects/2")),
            Item::Link(Iri::from("http://x/objects/1")),
        ];
        let created = s.create(col).unwrap();
        assert_eq!(created.total_items, 2);

        let loaded = s
            .load_collection(&filter(&["http://x/collections/c"]))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.base.id.as_str(), "http://x/collections/c");
        assert_eq!(loaded.base.kind, ObjectType::OrderedCollection);
        assert_eq!(loaded.total_items, 2);
        assert_eq!(ids(&loaded.ordered_items), vec!["http://x/objects/2", "http://x/objects/1"]);
    }

    #[test]
    fn collection_classified_as_activities() {
        let mut s = store();
        s.save_activity(create("http://x/activities/1")).unwrap();
        s.save_object(note("http://x/objects/1")).unwrap();
        let mut col = OrderedCollection::new("http://x/actors/a/outbox");
        col.ordered_items = vec![
            Item::Link(Iri::from("http://x/objects/1")),
            Item::Link(Iri::from("http://x/activities/1")),
        ];
        s.create(col).unwrap();

        let loaded = s
            .load_collection(&filter(&["http://x/actors/a/outbox"]))
            .unwrap()
            .unwrap();
        assert_eq!(ids(&loaded.ordered_items), vec!["http://x/activities/1"]);
        assert_eq!(loaded.total_items, 1);
    }

    #[test]
    fn only_last_collection_survives() {
        let mut s = store();
        s.save_object(note("http://x/objects/1")).unwrap();
        s.save_actor(person("http://x/actors/a")).unwrap();
        let mut first = OrderedCollection::new("http://x/collections/first");
        first.ordered_items = vec![Item::Link(Iri::from("http://x/objects/1"))];
        let mut second = OrderedCollection::new("http://x/collections/second");
        second.ordered_items = vec![Item::Link(Iri::from("http://x/actors/a"))];
        s.create(first).unwrap();
        s.create(second).unwrap();

        let loaded = s
            .load_collection(&filter(&[
                "http://x/collections/first",
                "http://x/collections/second",
                "http://x/collections/missing",
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.base.id.as_str(), "http://x/collections/second");
        assert_eq!(ids(&loaded.ordered_items), vec!["http://x/actors/a"]);
    }

    #[test]
    fn unknown_collection_loads_as_none() {
        let s = store();
        assert!(s
            .load_collection(&filter(&["http://x/collections/none"]))
            .unwrap()
            .is_none());
    }

    #[test]
    fn unclassifiable_members_resolve_to_nothing() {
        let mut s = store();
        let mut col = OrderedCollection::new("http://x/collections/misc");
        col.ordered_items = vec![Item::Link(Iri::from("http://x/misc/1"))];
        s.create(col).unwrap();
        let loaded = s
            .load_collection(&filter(&["http://x/collections/misc"]))
            .unwrap()
            .unwrap();
        assert!(loaded.ordered_items.is_empty());
        assert_eq!(loaded.total_items, 0);
    }

    #[test]
    fn add_and_remove_members() {
        let mut s = store();
        s.save_object(note("http://x/objects/1")).unwrap();
        s.save_object(note("http://x/objects/2")).unwrap();
        let col_id = Iri::from("http://x/collections/c");
        s.create(OrderedCollection::new(col_id.clone())).unwrap();

        s.add_to(&col_id, &note("http://x/objects/2")).unwrap();
        s.add_to(&col_id, &note("http://x/objects/1")).unwrap();
        s.add_to(&col_id, &note("http://x/objects/2")).unwrap();
        let loaded = s.load_collection(&Filter::single(col_id.clone())).unwrap().unwrap();
        assert_eq!(ids(&loaded.ordered_items), vec!["http://x/objects/2", "http://x/objects/1"]);

        s.remove_from(&col_id, &Item::Link(Iri::from("http://x/objects/2"))).unwrap();
        let loaded = s.load_collection(&Filter::single(col_id.clone())).unwrap().unwrap();
        assert_eq!(ids(&loaded.ordered_items), vec!["http://x/objects/1"]);
    }

    #[test]
    fn add_to_missing_collection_is_not_found() {
        let mut s = store();
        let err = s
            .add_to(&Iri::from("http://x/collections/none"), &note("http://x/objects/1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_load_finds_items_and_collections() {
        let mut s = store();
        s.save_actor(person("http://x/actors/a")).unwrap();
        s.create(OrderedCollection::new("http://x/actors/a/followers")).unwrap();

        let actor = Store::load(&s, &Iri::from("http://x/actors/a")).unwrap();
        assert_eq!(actor, person("http://x/actors/a"));

        let col = Store::load(&s, &Iri::from("http://x/actors/a/followers")).unwrap();
        assert!(matches!(col, Item::Collection(_)));

        let err = Store::load(&s, &Iri::from("http://x/actors")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "load http://x/actors: not found: item http://x/actors");
    }

    #[test]
    fn store_save_routes_and_stamps_published() {
        let mut s = store();
        let saved = Store::save(&mut s, create("http://x/activities/1")).unwrap();
        assert!(saved.base().unwrap().published.is_some());
        let (items, _) = s.load_activities(&filter(&["http://x/activities/1"])).unwrap();
        assert_eq!(items, vec![saved]);

        let err = Store::save(&mut s, Item::Link(Iri::from("http://x/objects/1"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn delete_replaces_with_tombstone() {
        let mut s = store();
        s.save_actor(person("http://x/actors/a")).unwrap();
        let tomb = Store::delete(&mut s, person("http://x/actors/a")).unwrap();
        assert_eq!(tomb.kind(), ObjectType::Tombstone);

        let (items, count) = s.load_actors(&filter(&["http://x/actors/a"])).unwrap();
        assert_eq!(count, 1);
        match &items[0] {
            Item::Tombstone(t) => {
                assert_eq!(t.base.id.as_str(), "http://x/actors/a");
                assert_eq!(t.former_type, Some(ObjectType::Person));
                assert!(t.deleted.is_some());
            }
            other => panic!("expected tombstone, got {:?}", other),
        }

        let reloaded = Store::load(&s, &Iri::from("http://x/actors/a")).unwrap();
        let again = Store::delete(&mut s, reloaded).unwrap();
        assert_eq!(again, tomb);
        let (items, _) = s.load_actors(&filter(&["http://x/actors/a"])).unwrap();
        assert_eq!(items, vec![tomb.clone()]);

        let err = Store::delete(&mut s, note("http://x/objects/missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn generate_id_delegates() {
        let s = store();
        let mut item = note("");
        let id = s
            .generate_id(&mut item, &Iri::from("http://x/objects"), Some(&person("http://x/actors/a")))
            .unwrap();
        assert!(id.as_str().starts_with("http://x/objects/"));
        assert_eq!(item.id(), &id);
    }
}
