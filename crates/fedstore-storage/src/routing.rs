//! Type-tag routing shared by every backend's `Store` implementation.

use chrono::{DateTime, Utc};

use fedstore_vocab::{Item, OrderedCollection};

use crate::error::StorageError;
use crate::types::BucketKind;

/// The bucket `Store::save` writes `item` to.
pub(crate) fn bucket_for(item: &Item) -> Result<BucketKind, StorageError> {
    BucketKind::for_type(item.kind()).ok_or_else(|| {
        StorageError::Invalid(format!("cannot store a bare {} reference", item.kind()))
    })
}

/// The bucket `Store::delete` tombstones `item` in. A tombstone lives in
/// the bucket of its former type. Collections are managed through
/// `CollectionStore` and cannot be deleted this way.
pub(crate) fn deletable_bucket_for(item: &Item) -> Result<BucketKind, StorageError> {
    let kind = match item.to_tombstone() {
        Ok(t) => t
            .former_type
            .and_then(BucketKind::for_type)
            .unwrap_or(BucketKind::Objects),
        Err(_) => bucket_for(item)?,
    };
    match kind {
        BucketKind::Collections => Err(StorageError::NotImplemented(format!(
            "deleting collection {}",
            item.id()
        ))),
        kind => Ok(kind),
    }
}

/// Sets `published` to `now` unless the item already carries one.
pub(crate) fn stamp_published(item: &mut Item, now: DateTime<Utc>) {
    if let Some(base) = item.base_mut() {
        base.published.get_or_insert(now);
    }
}

pub(crate) fn into_collection(item: Item) -> Result<OrderedCollection, StorageError> {
    match item {
        Item::Collection(col) => Ok(col),
        other => Err(StorageError::Invalid(format!(
            "{} is tagged as a collection but is not one",
            other.id()
        ))),
    }
}
