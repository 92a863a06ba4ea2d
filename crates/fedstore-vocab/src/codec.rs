//! JSON object codec.
//!
//! Items are stored as their JSON encoding; collection membership lists are
//! stored as a JSON array of identifier strings.

use crate::error::VocabError;
use crate::iri::Iri;
use crate::item::Item;

/// Serializes an item to its stored form.
pub fn marshal(item: &Item) -> Result<Vec<u8>, VocabError> {
    Ok(serde_json::to_vec(item)?)
}

/// Deserializes an item from its stored form.
pub fn unmarshal(bytes: &[u8]) -> Result<Item, VocabError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    Item::from_value(value)
}

/// Serializes an ordered list of member identifiers.
pub fn marshal_iris(iris: &[Iri]) -> Result<Vec<u8>, VocabError> {
    Ok(serde_json::to_vec(iris)?)
}

/// Deserializes an ordered list of member identifiers.
pub fn unmarshal_iris(bytes: &[u8]) -> Result<Vec<Iri>, VocabError> {
    Ok(serde_json::from_slice(bytes)?)
}
