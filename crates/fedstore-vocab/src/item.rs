//! The [`Item`] sum type over every representation in the object graph.
//!
//! Decoding dispatches on the `type` property: a bare JSON string is a link,
//! a JSON object becomes the representation its type tag selects. The
//! `to_*` conversions mirror that dispatch for items already in memory and
//! are what identifier assignment and soft deletion build on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::VocabError;
use crate::iri::Iri;
use crate::object::{
    Activity, Actor, Object, OrderedCollection, Place, Profile, Relationship, Tombstone,
};
use crate::types::ObjectType;

/// Any node of the object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A bare reference to another item.
    Link(Iri),
    /// A generic object (Note, Article, Image, ...).
    Object(Object),
    Activity(Activity),
    Actor(Actor),
    Place(Place),
    Profile(Profile),
    Relationship(Relationship),
    Tombstone(Tombstone),
    /// A collection, materialized with its members.
    Collection(OrderedCollection),
}

impl Item {
    /// The common properties, or `None` for a link.
    pub fn base(&self) -> Option<&Object> {
        match self {
            Item::Link(_) => None,
            Item::Object(o) => Some(o),
            Item::Activity(a) => Some(&a.base),
            Item::Actor(a) => Some(&a.base),
            Item::Place(p) => Some(&p.base),
            Item::Profile(p) => Some(&p.base),
            Item::Relationship(r) => Some(&r.base),
            Item::Tombstone(t) => Some(&t.base),
            Item::Collection(c) => Some(&c.base),
        }
    }

    pub fn base_mut(&mut self) -> Option<&mut Object> {
        match self {
            Item::Link(_) => None,
            Item::Object(o) => Some(o),
            Item::Activity(a) => Some(&mut a.base),
            Item::Actor(a) => Some(&mut a.base),
            Item::Place(p) => Some(&mut p.base),
            Item::Profile(p) => Some(&mut p.base),
            Item::Relationship(r) => Some(&mut r.base),
            Item::Tombstone(t) => Some(&mut t.base),
            Item::Collection(c) => Some(&mut c.base),
        }
    }

    /// The canonical identifier. For a link this is the link target.
    pub fn id(&self) -> &Iri {
        match self {
            Item::Link(iri) => iri,
            Item::Object(o) => &o.id,
            Item::Activity(a) => &a.base.id,
            Item::Actor(a) => &a.base.id,
            Item::Place(p) => &p.base.id,
            Item::Profile(p) => &p.base.id,
            Item::Relationship(r) => &r.base.id,
            Item::Tombstone(t) => &t.base.id,
            Item::Collection(c) => &c.base.id,
        }
    }

    pub fn set_id(&mut self, id: Iri) {
        match self {
            Item::Link(iri) => *iri = id,
            _ => {
                if let Some(base) = self.base_mut() {
                    base.id = id;
                }
            }
        }
    }

    /// The type tag. Links report [`ObjectType::Link`].
    pub fn kind(&self) -> ObjectType {
        self.base().map_or(ObjectType::Link, |base| base.kind)
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Item::Link(_))
    }

    fn conversion_error(&self, to: &'static str) -> VocabError {
        VocabError::Conversion {
            from: self.kind(),
            to,
        }
    }

    /// Converts to an activity. Only activity-typed items convert.
    pub fn to_activity(&self) -> Result<Activity, VocabError> {
        match self {
            Item::Activity(a) => Ok(a.clone()),
            Item::Object(o) if o.kind.is_activity() => Ok(Activity::from_object(o.clone())),
            _ => Err(self.conversion_error("Activity")),
        }
    }

    pub fn to_place(&self) -> Result<Place, VocabError> {
        match self {
            Item::Place(p) => Ok(p.clone()),
            Item::Object(o) if o.kind == ObjectType::Place => Ok(Place::from_object(o.clone())),
            _ => Err(self.conversion_error("Place")),
        }
    }

    pub fn to_profile(&self) -> Result<Profile, VocabError> {
        match self {
            Item::Profile(p) => Ok(p.clone()),
            Item::Object(o) if o.kind == ObjectType::Profile => {
                Ok(Profile::from_object(o.clone()))
            }
            _ => Err(self.conversion_error("Profile")),
        }
    }

    pub fn to_relationship(&self) -> Result<Relationship, VocabError> {
        match self {
            Item::Relationship(r) => Ok(r.clone()),
            Item::Object(o) if o.kind == ObjectType::Relationship => {
                Ok(Relationship::from_object(o.clone()))
            }
            _ => Err(self.conversion_error("Relationship")),
        }
    }

    pub fn to_tombstone(&self) -> Result<Tombstone, VocabError> {
        match self {
            Item::Tombstone(t) => Ok(t.clone()),
            Item::Object(o) if o.kind == ObjectType::Tombstone => {
                Ok(Tombstone::from_object(o.clone()))
            }
            _ => Err(self.conversion_error("Tombstone")),
        }
    }

    /// Converts to the generic representation, keeping only the common
    /// properties. Every variant except a link converts.
    pub fn to_object(&self) -> Result<Object, VocabError> {
        self.base()
            .cloned()
            .ok_or_else(|| self.conversion_error("Object"))
    }

    /// The Live -> Tombstoned transition: a tombstone under the same
    /// identifier recording the former type and the deletion instant.
    /// An item that is already a tombstone is returned unchanged.
    pub fn tombstone(&self, deleted_at: DateTime<Utc>) -> Tombstone {
        if let Ok(prior) = self.to_tombstone() {
            return prior;
        }
        let mut base = Object::new(self.id().clone(), ObjectType::Tombstone);
        if let Some(prior) = self.base() {
            base.published = prior.published;
        }
        base.updated = Some(deleted_at);
        Tombstone {
            base,
            former_type: Some(self.kind()),
            deleted: Some(deleted_at),
        }
    }

    /// Decodes an item from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Item, VocabError> {
        let kind = match &value {
            Value::String(s) => return Ok(Item::Link(Iri::from(s.as_str()))),
            Value::Object(map) => match map.get("type") {
                Some(Value::String(name)) => name.parse::<ObjectType>()?,
                _ => return Err(VocabError::MissingType),
            },
            _ => return Err(VocabError::NotAnItem),
        };

        let item = match kind {
            k if k.is_link() => {
                let href = value
                    .get("href")
                    .or_else(|| value.get("id"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Item::Link(Iri::from(href))
            }
            k if k.is_activity() => Item::Activity(serde_json::from_value(value)?),
            k if k.is_actor() => Item::Actor(serde_json::from_value(value)?),
            k if k.is_collection() => Item::Collection(serde_json::from_value(value)?),
            ObjectType::Place => Item::Place(serde_json::from_value(value)?),
            ObjectType::Profile => Item::Profile(serde_json::from_value(value)?),
            ObjectType::Relationship => Item::Relationship(serde_json::from_value(value)?),
            ObjectType::Tombstone => Item::Tombstone(serde_json::from_value(value)?),
            _ => Item::Object(serde_json::from_value(value)?),
        };
        Ok(item)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Item::Link(iri) => iri.serialize(serializer),
            Item::Object(o) => o.serialize(serializer),
            Item::Activity(a) => a.serialize(serializer),
            Item::Actor(a) => a.serialize(serializer),
            Item::Place(p) => p.serialize(serializer),
            Item::Profile(p) => p.serialize(serializer),
            Item::Relationship(r) => r.serialize(serializer),
            Item::Tombstone(t) => t.serialize(serializer),
            Item::Collection(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Item::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<Iri> for Item {
    fn from(iri: Iri) -> Self {
        Item::Link(iri)
    }
}

impl From<Object> for Item {
    fn from(o: Object) -> Self {
        Item::Object(o)
    }
}

impl From<Activity> for Item {
    fn from(a: Activity) -> Self {
        Item::Activity(a)
    }
}

impl From<Actor> for Item {
    fn from(a: Actor) -> Self {
        Item::Actor(a)
    }
}

impl From<Place> for Item {
    fn from(p: Place) -> Self {
        Item::Place(p)
    }
}

impl From<Profile> for Item {
    fn from(p: Profile) -> Self {
        Item::Profile(p)
    }
}

impl From<Relationship> for Item {
    fn from(r: Relationship) -> Self {
        Item::Relationship(r)
    }
}

impl From<Tombstone> for Item {
    fn from(t: Tombstone) -> Self {
        Item::Tombstone(t)
    }
}

impl From<OrderedCollection> for Item {
    fn from(c: OrderedCollection) -> Self {
        Item::Collection(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_by_type_tag() {
        let note = Item::from_value(json!({"id": "http://x/objects/1", "type": "Note"})).unwrap();
        assert!(matches!(note, Item::Object(_)));
        assert_eq!(note.kind(), ObjectType::Note);

        let person = Item::from_value(json!({"id": "http://x/actors/a", "type": "Person"})).unwrap();
        assert!(matches!(person, Item::Actor(_)));

        let create = Item::from_value(json!({
            "id": "http://x/activities/1",
            "type": "Create",
            "actor": "http://x/actors/a",
            "object": {"id": "http://x/objects/1", "type": "Note"}
        }))
        .unwrap();
        match create {
            Item::Activity(a) => {
                assert_eq!(a.actor.as_deref(), Some(&Item::Link(Iri::from("http://x/actors/a"))));
                assert_eq!(a.object.as_deref().map(Item::kind), Some(ObjectType::Note));
            }
            other => panic!("expected activity, got {:?}", other),
        }

        let place = Item::from_value(json!({"type": "Place", "latitude": 1.5})).unwrap();
        match place {
            Item::Place(p) => assert_eq!(p.latitude, Some(1.5)),
            other => panic!("expected place, got {:?}", other),
        }
    }

    #[test]
    fn bare_string_is_a_link() {
        let it = Item::from_value(json!("http://x/objects/1")).unwrap();
        assert_eq!(it, Item::Link(Iri::from("http://x/objects/1")));
        assert_eq!(it.kind(), ObjectType::Link);
    }

    #[test]
    fn link_object_uses_href() {
        let it = Item::from_value(json!({"type": "Mention", "href": "http://x/actors/b"})).unwrap();
        assert_eq!(it.id().as_str(), "http://x/actors/b");
    }

    #[test]
    fn rejects_untyped_and_unknown() {
        assert!(matches!(
            Item::from_value(json!({"id": "x"})),
            Err(VocabError::MissingType)
        ));
        assert!(matches!(
            Item::from_value(json!({"type": "Spaceship"})),
            Err(VocabError::UnknownType(_))
        ));
        assert!(matches!(Item::from_value(json!(42)), Err(VocabError::NotAnItem)));
    }

    #[test]
    fn set_id_reaches_every_variant() {
        let mut link = Item::Link(Iri::from("a"));
        link.set_id(Iri::from("b"));
        assert_eq!(link.id().as_str(), "b");

        let mut place = Item::Place(Place::from_object(Object::new("a", ObjectType::Place)));
        place.set_id(Iri::from("c"));
        assert_eq!(place.id().as_str(), "c");
    }

    #[test]
    fn generic_place_lifts_to_place() {
        let generic = Item::Object(Object::new("http://x/objects/p", ObjectType::Place));
        let place = generic.to_place().unwrap();
        assert_eq!(place.base.id.as_str(), "http://x/objects/p");
    }

    #[test]
    fn mismatched_conversion_fails() {
        let note = Item::Object(Object::new("n", ObjectType::Note));
        let err = note.to_place().unwrap_err();
        assert!(matches!(
            err,
            VocabError::Conversion { from: ObjectType::Note, to: "Place" }
        ));
        assert!(note.to_activity().is_err());
        assert!(Item::Link(Iri::from("l")).to_object().is_err());
    }

    #[test]
    fn to_object_accepts_actors() {
        let actor = Item::Actor(Actor::from_object(Object::new("a", ObjectType::Person)));
        let base = actor.to_object().unwrap();
        assert_eq!(base.kind, ObjectType::Person);
    }

    #[test]
    fn tombstone_records_former_type() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let note = Item::Object(Object::new("http://x/objects/1", ObjectType::Note));
        let t = note.tombstone(at);
        assert_eq!(t.base.id.as_str(), "http://x/objects/1");
        assert_eq!(t.base.kind, ObjectType::Tombstone);
        assert_eq!(t.former_type, Some(ObjectType::Note));
        assert_eq!(t.deleted, Some(at));
    }

    #[test]
    fn tombstoning_twice_keeps_first_deletion() {
        let first = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let actor = Item::Actor(Actor::from_object(Object::new("http://x/actors/a", ObjectType::Person)));
        let once = Item::Tombstone(actor.tombstone(first));
        let twice = once.tombstone(Utc::now());
        assert_eq!(twice.former_type, Some(ObjectType::Person));
        assert_eq!(twice.deleted, Some(first));
    }

    #[test]
    fn serializes_flattened_camel_case() {
        let mut actor = Actor::from_object(Object::new("http://x/actors/a", ObjectType::Person));
        actor.preferred_username = Some("alice".into());
        let value = serde_json::to_value(Item::Actor(actor)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "http://x/actors/a",
                "type": "Person",
                "preferredUsername": "alice"
            })
        );
    }
}
