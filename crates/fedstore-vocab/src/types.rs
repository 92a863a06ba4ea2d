//! ActivityStreams type tags.
//!
//! [`ObjectType`] is the closed set of `type` values this vocabulary
//! understands. The tag decides both which concrete representation an item
//! decodes into and which storage bucket it lands in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VocabError;

/// An ActivityStreams `type` tag. Serialized as the bare type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    // Links
    Link,
    Mention,

    // Objects
    Object,
    Article,
    Audio,
    Document,
    Event,
    Image,
    Note,
    Page,
    Place,
    Profile,
    Relationship,
    Tombstone,
    Video,

    // Collections
    Collection,
    OrderedCollection,
    CollectionPage,
    OrderedCollectionPage,

    // Actors
    Application,
    Group,
    Organization,
    Person,
    Service,

    // Activities
    Accept,
    Add,
    Announce,
    Arrive,
    Block,
    Create,
    Delete,
    Dislike,
    Flag,
    Follow,
    Ignore,
    Invite,
    Join,
    Leave,
    Like,
    Listen,
    Move,
    Offer,
    Question,
    Reject,
    Read,
    Remove,
    TentativeReject,
    TentativeAccept,
    Travel,
    Undo,
    Update,
    View,
}

/// Activity types, including the intransitive ones (Arrive, Travel, Question).
pub const ACTIVITY_TYPES: &[ObjectType] = &[
    ObjectType::Accept,
    ObjectType::Add,
    ObjectType::Announce,
    ObjectType::Arrive,
    ObjectType::Block,
    ObjectType::Create,
    ObjectType::Delete,
    ObjectType::Dislike,
    ObjectType::Flag,
    ObjectType::Follow,
    ObjectType::Ignore,
    ObjectType::Invite,
    ObjectType::Join,
    ObjectType::Leave,
    ObjectType::Like,
    ObjectType::Listen,
    ObjectType::Move,
    ObjectType::Offer,
    ObjectType::Question,
    ObjectType::Reject,
    ObjectType::Read,
    ObjectType::Remove,
    ObjectType::TentativeReject,
    ObjectType::TentativeAccept,
    ObjectType::Travel,
    ObjectType::Undo,
    ObjectType::Update,
    ObjectType::View,
];

pub const ACTOR_TYPES: &[ObjectType] = &[
    ObjectType::Application,
    ObjectType::Group,
    ObjectType::Organization,
    ObjectType::Person,
    ObjectType::Service,
];

pub const OBJECT_TYPES: &[ObjectType] = &[
    ObjectType::Object,
    ObjectType::Article,
    ObjectType::Audio,
    ObjectType::Document,
    ObjectType::Event,
    ObjectType::Image,
    ObjectType::Note,
    ObjectType::Page,
    ObjectType::Place,
    ObjectType::Profile,
    ObjectType::Relationship,
    ObjectType::Tombstone,
    ObjectType::Video,
];

pub const COLLECTION_TYPES: &[ObjectType] = &[
    ObjectType::Collection,
    ObjectType::OrderedCollection,
    ObjectType::CollectionPage,
    ObjectType::OrderedCollectionPage,
];

pub const LINK_TYPES: &[ObjectType] = &[ObjectType::Link, ObjectType::Mention];

const ALL_TYPES: &[&[ObjectType]] = &[
    LINK_TYPES,
    OBJECT_TYPES,
    COLLECTION_TYPES,
    ACTOR_TYPES,
    ACTIVITY_TYPES,
];

impl ObjectType {
    pub fn is_activity(self) -> bool {
        ACTIVITY_TYPES.contains(&self)
    }

    pub fn is_actor(self) -> bool {
        ACTOR_TYPES.contains(&self)
    }

    pub fn is_object(self) -> bool {
        OBJECT_TYPES.contains(&self)
    }

    pub fn is_collection(self) -> bool {
        COLLECTION_TYPES.contains(&self)
    }

    pub fn is_link(self) -> bool {
        LINK_TYPES.contains(&self)
    }

    /// The type name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Link => "Link",
            ObjectType::Mention => "Mention",
            ObjectType::Object => "Object",
            ObjectType::Article => "Article",
            ObjectType::Audio => "Audio",
            ObjectType::Document => "Document",
            ObjectType::Event => "Event",
            ObjectType::Image => "Image",
            ObjectType::Note => "Note",
            ObjectType::Page => "Page",
            ObjectType::Place => "Place",
            ObjectType::Profile => "Profile",
            ObjectType::Relationship => "Relationship",
            ObjectType::Tombstone => "Tombstone",
            ObjectType::Video => "Video",
            ObjectType::Collection => "Collection",
            ObjectType::OrderedCollection => "OrderedCollection",
            ObjectType::CollectionPage => "CollectionPage",
            ObjectType::OrderedCollectionPage => "OrderedCollectionPage",
            ObjectType::Application => "Application",
            ObjectType::Group => "Group",
            ObjectType::Organization => "Organization",
            ObjectType::Person => "Person",
            ObjectType::Service => "Service",
            ObjectType::Accept => "Accept",
            ObjectType::Add => "Add",
            ObjectType::Announce => "Announce",
            ObjectType::Arrive => "Arrive",
            ObjectType::Block => "Block",
            ObjectType::Create => "Create",
            ObjectType::Delete => "Delete",
            ObjectType::Dislike => "Dislike",
            ObjectType::Flag => "Flag",
            ObjectType::Follow => "Follow",
            ObjectType::Ignore => "Ignore",
            ObjectType::Invite => "Invite",
            ObjectType::Join => "Join",
            ObjectType::Leave => "Leave",
            ObjectType::Like => "Like",
            ObjectType::Listen => "Listen",
            ObjectType::Move => "Move",
            ObjectType::Offer => "Offer",
            ObjectType::Question => "Question",
            ObjectType::Reject => "Reject",
            ObjectType::Read => "Read",
            ObjectType::Remove => "Remove",
            ObjectType::TentativeReject => "TentativeReject",
            ObjectType::TentativeAccept => "TentativeAccept",
            ObjectType::Travel => "Travel",
            ObjectType::Undo => "Undo",
            ObjectType::Update => "Update",
            ObjectType::View => "View",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TYPES
            .iter()
            .flat_map(|group| group.iter())
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| VocabError::UnknownType(s.to_string()))
    }
}
