//! Typed object graph for fedstore.
//!
//! Models the ActivityStreams vocabulary the storage layer persists:
//! identifiers ([`Iri`]), type tags ([`ObjectType`]), the concrete
//! representations in [`object`], the [`Item`] sum type tying them together,
//! and the JSON [`codec`] used to turn items into stored blobs.

pub mod codec;
pub mod error;
pub mod iri;
pub mod item;
pub mod object;
pub mod types;

// Re-export commonly used types
pub use error::VocabError;
pub use iri::Iri;
pub use item::Item;
pub use object::{Activity, Actor, Object, OrderedCollection, Place, Profile, Relationship, Tombstone};
pub use types::ObjectType;
