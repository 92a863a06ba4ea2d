//! Identifier assignment for new items.
//!
//! A candidate identifier is the lowercased parent IRI followed by `/` and a
//! random UUID. Whether the candidate is used depends on the item's type:
//!
//! - activities keep the identifier they already carry;
//! - actors and objects are converted to their concrete representation
//!   (place, profile, relationship, tombstone, or the generic one) and
//!   receive the candidate;
//! - anything else (links, collections) keeps its identifier.

use fedstore_vocab::{Iri, Item, ObjectType, VocabError};
use uuid::Uuid;

use crate::error::StorageError;

/// Assigns `item` an identifier under `part_of` and returns the identifier
/// the item ends up with.
///
/// On a failed conversion the item is left untouched and the error carries
/// its pre-existing identifier.
pub fn generate_id(item: &mut Item, part_of: &Iri) -> Result<Iri, StorageError> {
    let existing = item.id().clone();
    let candidate = Iri::from(format!(
        "{}/{}",
        part_of.as_str().to_lowercase(),
        Uuid::new_v4()
    ));
    let fail = |source: VocabError| StorageError::IdGeneration {
        existing: existing.clone(),
        source,
    };

    let kind = item.kind();
    if kind.is_activity() {
        // Activities are addressed by the id the caller already gave them.
        item.to_activity().map_err(fail)?;
        return Ok(existing);
    }
    if !(kind.is_actor() || kind.is_object()) {
        return Ok(existing);
    }

    match kind {
        ObjectType::Place => {
            let mut place = item.to_place().map_err(fail)?;
            place.base.id = candidate.clone();
            *item = place.into();
        }
        ObjectType::Profile => {
            let mut profile = item.to_profile().map_err(fail)?;
            profile.base.id = candidate.clone();
            *item = profile.into();
        }
        ObjectType::Relationship => {
            let mut relationship = item.to_relationship().map_err(fail)?;
            relationship.base.id = candidate.clone();
            *item = relationship.into();
        }
        ObjectType::Tombstone => {
            let mut tombstone = item.to_tombstone().map_err(fail)?;
            tombstone.base.id = candidate.clone();
            *item = tombstone.into();
        }
        _ => {
            // Actors share the generic object shape; their own properties
            // stay on the item.
            item.to_object().map_err(fail)?;
            item.set_id(candidate.clone());
        }
    }
    Ok(candidate)
}
