//! Concrete item representations.
//!
//! Every representation embeds the common [`Object`] properties via
//! `#[serde(flatten)]` and adds the properties specific to its kind.
//! Properties are serialized in camelCase to match the ActivityStreams
//! vocabulary; absent optional properties are omitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::iri::Iri;
use crate::item::Item;
use crate::types::ObjectType;

/// Properties shared by every non-link item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(default, skip_serializing_if = "Iri::is_empty")]
    pub id: Iri,
    #[serde(rename = "type")]
    pub kind: ObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributed_to: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Iri>,
}

impl Object {
    /// Creates an object carrying only an identifier and a type tag.
    pub fn new(id: impl Into<Iri>, kind: ObjectType) -> Self {
        Object {
            id: id.into(),
            kind,
            name: None,
            summary: None,
            content: None,
            media_type: None,
            attributed_to: None,
            in_reply_to: None,
            url: None,
            published: None,
            updated: None,
            to: Vec::new(),
            cc: Vec::new(),
        }
    }
}

/// An activity: something an actor did to an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<Box<Item>>,
}

impl Activity {
    pub fn from_object(base: Object) -> Self {
        Activity {
            base,
            actor: None,
            object: None,
            target: None,
            result: None,
            origin: None,
            instrument: None,
        }
    }
}

/// An actor: a person, service, group, organization or application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbox: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<Iri>,
}

impl Actor {
    pub fn from_object(base: Object) -> Self {
        Actor {
            base,
            preferred_username: None,
            inbox: None,
            outbox: None,
            following: None,
            followers: None,
            liked: None,
        }
    }
}

/// A physical or logical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Place {
    pub fn from_object(base: Object) -> Self {
        Place {
            base,
            accuracy: None,
            altitude: None,
            latitude: None,
            longitude: None,
            radius: None,
            units: None,
        }
    }
}

/// Content about another object, usually an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub describes: Option<Box<Item>>,
}

impl Profile {
    pub fn from_object(base: Object) -> Self {
        Profile {
            base,
            describes: None,
        }
    }
}

/// A relationship between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Box<Item>>,
}

impl Relationship {
    pub fn from_object(base: Object) -> Self {
        Relationship {
            base,
            subject: None,
            object: None,
            relationship: None,
        }
    }
}

/// The marker left behind when an item is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub former_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
}

impl Tombstone {
    pub fn from_object(base: Object) -> Self {
        Tombstone {
            base,
            former_type: None,
            deleted: None,
        }
    }
}

/// An ordered collection with its members resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollection {
    #[serde(flatten)]
    pub base: Object,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordered_items: Vec<Item>,
}

impl OrderedCollection {
    /// Creates an empty `OrderedCollection` named `id`.
    pub fn new(id: impl Into<Iri>) -> Self {
        OrderedCollection {
            base: Object::new(id, ObjectType::OrderedCollection),
            total_items: 0,
            ordered_items: Vec::new(),
        }
    }

    /// Identifiers of the members, in order.
    pub fn member_ids(&self) -> Vec<Iri> {
        self.ordered_items.iter().map(|it| it.id().clone()).collect()
    }
}
