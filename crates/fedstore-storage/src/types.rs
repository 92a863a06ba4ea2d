//! Storage-layer types: the bucket schema and query filters.
//!
//! [`BucketKind`] names the four child buckets every root bucket holds.
//! [`Filter`] is the prefix query accepted by the per-kind loaders.

use std::fmt;

use fedstore_vocab::{Iri, ObjectType};

use crate::error::StorageError;

/// One of the four buckets under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Actors,
    Activities,
    Objects,
    Collections,
}

impl BucketKind {
    /// Every bucket a provisioned root must contain.
    pub const ALL: [BucketKind; 4] = [
        BucketKind::Actors,
        BucketKind::Activities,
        BucketKind::Objects,
        BucketKind::Collections,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BucketKind::Actors => "actors",
            BucketKind::Activities => "activities",
            BucketKind::Objects => "objects",
            BucketKind::Collections => "collections",
        }
    }

    /// Singular name of what the bucket holds, for log lines.
    pub fn noun(self) -> &'static str {
        match self {
            BucketKind::Actors => "actor",
            BucketKind::Activities => "activity",
            BucketKind::Objects => "object",
            BucketKind::Collections => "collection",
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        self.name().as_bytes()
    }

    /// The bucket an item with type tag `kind` is stored in.
    ///
    /// Links have no bucket; they are references, not stored items.
    pub fn for_type(kind: ObjectType) -> Option<BucketKind> {
        if kind.is_activity() {
            Some(BucketKind::Activities)
        } else if kind.is_actor() {
            Some(BucketKind::Actors)
        } else if kind.is_collection() {
            Some(BucketKind::Collections)
        } else if kind.is_object() {
            Some(BucketKind::Objects)
        } else {
            None
        }
    }

    /// Guesses which bucket a collection's members live in from the bucket
    /// names embedded in their identifiers.
    ///
    /// Any member mentioning `activities` wins, then `actors`, then
    /// `objects`. Returns `None` when no member mentions any of them.
    pub fn classify_members(members: &[Iri]) -> Option<BucketKind> {
        [BucketKind::Activities, BucketKind::Actors, BucketKind::Objects]
            .into_iter()
            .find(|kind| members.iter().any(|iri| iri.contains(kind.name())))
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-empty, ordered list of identifier prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    iris: Vec<Iri>,
}

impl Filter {
    /// Builds a filter. Fails with `Invalid` if `iris` is empty.
    pub fn new(iris: Vec<Iri>) -> Result<Self, StorageError> {
        if iris.is_empty() {
            return Err(StorageError::Invalid("filter needs at least one IRI".into()));
        }
        Ok(Filter { iris })
    }

    pub fn single(iri: impl Into<Iri>) -> Self {
        Filter {
            iris: vec![iri.into()],
        }
    }

    pub fn iris(&self) -> &[Iri] {
        &self.iris
    }
}

impl From<Iri> for Filter {
    fn from(iri: Iri) -> Self {
        Filter::single(iri)
    }
}
