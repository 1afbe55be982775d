// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

use super::ids::{ConversationId, NodeId, SpeakerId};

/// Canvas coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Target of a cross-reference node: another speaker's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrossRef {
    pub speaker_id: SpeakerId,
    pub conversation_id: ConversationId,
}

impl CrossRef {
    pub fn new(speaker_id: SpeakerId, conversation_id: ConversationId) -> Self {
        Self { speaker_id, conversation_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Anchor,
    ActorLine,
    SelfLine,
    CrossReference,
    Generic,
}

impl NodeKind {
    pub fn carries_text(self) -> bool {
        matches!(self, Self::ActorLine | Self::SelfLine | Self::Generic)
    }
}

/// Kind-specific payload of a node.
///
/// Each variant only holds the fields that are meaningful for it, so converting a node to
/// another kind is an explicit variant change that drops whatever the new kind cannot carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Anchor,
    ActorLine { text: String, speaker_ref: Option<SpeakerId> },
    SelfLine { text: String },
    CrossReference { cross_ref: Option<CrossRef> },
    Generic { text: String },
}

impl NodeBody {
    /// An empty body of the given kind.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Anchor => Self::Anchor,
            NodeKind::ActorLine => Self::ActorLine { text: String::new(), speaker_ref: None },
            NodeKind::SelfLine => Self::SelfLine { text: String::new() },
            NodeKind::CrossReference => Self::CrossReference { cross_ref: None },
            NodeKind::Generic => Self::Generic { text: String::new() },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Anchor => NodeKind::Anchor,
            Self::ActorLine { .. } => NodeKind::ActorLine,
            Self::SelfLine { .. } => NodeKind::SelfLine,
            Self::CrossReference { .. } => NodeKind::CrossReference,
            Self::Generic { .. } => NodeKind::Generic,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::ActorLine { text, .. } | Self::SelfLine { text } | Self::Generic { text } => {
                Some(text)
            }
            Self::Anchor | Self::CrossReference { .. } => None,
        }
    }

    /// Converts the body to `kind`.
    ///
    /// Text survives between text-bearing kinds; `speaker_ref` and `cross_ref` only survive when
    /// the kind is unchanged. Conversions into or out of [`NodeKind::Anchor`] return `None`.
    pub fn retyped(self, kind: NodeKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self);
        }
        if kind == NodeKind::Anchor || self.kind() == NodeKind::Anchor {
            return None;
        }

        let text = self.text().map(ToOwned::to_owned).unwrap_or_default();
        Some(match kind {
            NodeKind::ActorLine => Self::ActorLine { text, speaker_ref: None },
            NodeKind::SelfLine => Self::SelfLine { text },
            NodeKind::Generic => Self::Generic { text },
            NodeKind::CrossReference => Self::CrossReference { cross_ref: None },
            NodeKind::Anchor => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    id: NodeId,
    label: String,
    position: Position,
    body: NodeBody,
    selected: bool,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>, body: NodeBody) -> Self {
        Self { id, label: label.into(), position: Position::default(), body, selected: false }
    }

    pub fn anchor(id: NodeId, label: impl Into<String>) -> Self {
        Self::new(id, label, NodeBody::Anchor)
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.body, NodeBody::Anchor)
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn text(&self) -> Option<&str> {
        self.body.text()
    }

    /// Returns `false` when the node kind carries no dialogue text.
    pub fn set_text(&mut self, value: impl Into<String>) -> bool {
        match &mut self.body {
            NodeBody::ActorLine { text, .. }
            | NodeBody::SelfLine { text }
            | NodeBody::Generic { text } => {
                *text = value.into();
                true
            }
            NodeBody::Anchor | NodeBody::CrossReference { .. } => false,
        }
    }

    pub fn speaker_ref(&self) -> Option<&SpeakerId> {
        match &self.body {
            NodeBody::ActorLine { speaker_ref, .. } => speaker_ref.as_ref(),
            _ => None,
        }
    }

    /// Only actor lines carry a speaker reference.
    pub fn set_speaker_ref(&mut self, value: Option<SpeakerId>) -> bool {
        match &mut self.body {
            NodeBody::ActorLine { speaker_ref, .. } => {
                *speaker_ref = value;
                true
            }
            _ => false,
        }
    }

    pub fn cross_ref(&self) -> Option<&CrossRef> {
        match &self.body {
            NodeBody::CrossReference { cross_ref } => cross_ref.as_ref(),
            _ => None,
        }
    }

    /// Only cross-reference nodes carry a cross reference.
    pub fn set_cross_ref(&mut self, value: Option<CrossRef>) -> bool {
        match &mut self.body {
            NodeBody::CrossReference { cross_ref } => {
                *cross_ref = value;
                true
            }
            _ => false,
        }
    }

    /// Converts the node to another kind. Anchors can neither be produced nor converted.
    pub fn retype(&mut self, kind: NodeKind) -> bool {
        match self.body.clone().retyped(kind) {
            Some(body) => {
                self.body = body;
                true
            }
            None => false,
        }
    }
}

impl JsonSchema for Node {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Node")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        NodeRecord::json_schema(generator)
    }
}

/// Wire shape of a node:
/// `{ id, kind, position, data: { label, text?, speakerRef?, crossRef? }, selected }`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct NodeRecord {
    id: NodeId,
    kind: NodeKind,
    #[serde(default)]
    position: Position,
    data: NodeDataRecord,
    #[serde(default)]
    selected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct NodeDataRecord {
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speaker_ref: Option<SpeakerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cross_ref: Option<CrossRef>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let NodeDataRecord { label, text, speaker_ref, cross_ref } = record.data;
        let text = text.unwrap_or_default();
        // Fields that do not belong to the declared kind are dropped.
        let body = match record.kind {
            NodeKind::Anchor => NodeBody::Anchor,
            NodeKind::ActorLine => NodeBody::ActorLine { text, speaker_ref },
            NodeKind::SelfLine => NodeBody::SelfLine { text },
            NodeKind::CrossReference => NodeBody::CrossReference { cross_ref },
            NodeKind::Generic => NodeBody::Generic { text },
        };
        Self { id: record.id, label, position: record.position, body, selected: record.selected }
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let kind = node.kind();
        let (text, speaker_ref, cross_ref) = match node.body {
            NodeBody::Anchor => (None, None, None),
            NodeBody::ActorLine { text, speaker_ref } => (Some(text), speaker_ref, None),
            NodeBody::SelfLine { text } | NodeBody::Generic { text } => (Some(text), None, None),
            NodeBody::CrossReference { cross_ref } => (None, None, cross_ref),
        };
        Self {
            id: node.id,
            kind,
            position: node.position,
            data: NodeDataRecord { label: node.label, text, speaker_ref, cross_ref },
            selected: node.selected,
        }
    }
}
