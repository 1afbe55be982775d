// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stable identifier for one entity of the dialogue document.
///
/// Ids are plain strings on the wire. The only enforced shape is a non-empty string
/// without `/`, so that ids can be joined into `speaker/conversation` paths by hosts.
/// Ordering is lexical, which is what layout tie-breaking relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self::from_valid(value))
    }

    /// Wraps a value produced by the id authority, which only emits valid segments.
    pub(crate) fn from_valid(value: String) -> Self {
        debug_assert!(validate_id_segment(&value).is_ok());
        Self { value, _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl<T> JsonSchema for Id<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Id")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain '/'")]
    ContainsSlash,
}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') {
        return Err(IdError::ContainsSlash);
    }
    Ok(())
}

/// The entity families that draw ids from the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdKind {
    Speaker,
    Conversation,
    Node,
    Edge,
}

impl IdKind {
    pub const ALL: [IdKind; 4] = [Self::Speaker, Self::Conversation, Self::Node, Self::Edge];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Speaker => "npc",
            Self::Conversation => "conv",
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }
}

/// Binds a phantom id tag to the entity family it identifies.
pub trait IdTag {
    const KIND: IdKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpeakerIdTag {}
pub type SpeakerId = Id<SpeakerIdTag>;

impl IdTag for SpeakerIdTag {
    const KIND: IdKind = IdKind::Speaker;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversationIdTag {}
pub type ConversationId = Id<ConversationIdTag>;

impl IdTag for ConversationIdTag {
    const KIND: IdKind = IdKind::Conversation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

impl IdTag for NodeIdTag {
    const KIND: IdKind = IdKind::Node;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

impl IdTag for EdgeIdTag {
    const KIND: IdKind = IdKind::Edge;
}
