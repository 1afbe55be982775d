// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::conversation::Conversation;
use super::ids::{ConversationId, EdgeId, IdKind, NodeId, SpeakerId};
use super::speaker::Speaker;

/// The persisted document: an ordered list of speakers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Document {
    speakers: Vec<Speaker>,
}

impl Document {
    pub fn new(speakers: Vec<Speaker>) -> Self {
        Self { speakers }
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub fn speakers_mut(&mut self) -> &mut Vec<Speaker> {
        &mut self.speakers
    }

    pub fn speaker(&self, speaker_id: &SpeakerId) -> Option<&Speaker> {
        self.speakers.iter().find(|s| s.id() == speaker_id)
    }

    pub fn speaker_mut(&mut self, speaker_id: &SpeakerId) -> Option<&mut Speaker> {
        self.speakers.iter_mut().find(|s| s.id() == speaker_id)
    }

    /// Finds a conversation anywhere in the document together with its owner.
    pub fn find_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Option<(&Speaker, &Conversation)> {
        self.speakers.iter().find_map(|speaker| {
            speaker.conversation(conversation_id).map(|conversation| (speaker, conversation))
        })
    }

    pub fn find_conversation_mut(
        &mut self,
        conversation_id: &ConversationId,
    ) -> Option<&mut Conversation> {
        self.speakers.iter_mut().find_map(|speaker| speaker.conversation_mut(conversation_id))
    }

    /// Every entity id in document order, tagged with its family.
    pub fn ids(&self) -> Vec<(IdKind, &str)> {
        let mut out = Vec::new();
        for speaker in &self.speakers {
            out.push((IdKind::Speaker, speaker.id().as_str()));
            for conversation in speaker.conversations() {
                out.push((IdKind::Conversation, conversation.id().as_str()));
                out.extend(conversation.nodes().iter().map(|n| (IdKind::Node, n.id().as_str())));
                out.extend(conversation.edges().iter().map(|e| (IdKind::Edge, e.id().as_str())));
            }
        }
        out
    }

    /// Checks the structural invariants a loaded or imported document must satisfy.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut seen = BTreeSet::<&str>::new();
        for (_, id) in self.ids() {
            if !seen.insert(id) {
                return Err(DocumentError::DuplicateId { id: id.to_owned() });
            }
        }

        for speaker in &self.speakers {
            if speaker.conversations().is_empty() {
                return Err(DocumentError::NoConversations { speaker_id: speaker.id().clone() });
            }
            for conversation in speaker.conversations() {
                validate_conversation(conversation)?;
            }
        }

        Ok(())
    }
}

fn validate_conversation(conversation: &Conversation) -> Result<(), DocumentError> {
    let anchors = conversation.nodes().iter().filter(|n| n.is_anchor()).count();
    if anchors != 1 {
        return Err(DocumentError::AnchorCount {
            conversation_id: conversation.id().clone(),
            count: anchors,
        });
    }

    for edge in conversation.edges() {
        for endpoint in [edge.source(), edge.target()] {
            if !conversation.contains_node(endpoint) {
                return Err(DocumentError::DanglingEdge {
                    conversation_id: conversation.id().clone(),
                    edge_id: edge.id().clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("id {id} is used more than once")]
    DuplicateId { id: String },
    #[error("speaker {speaker_id} has no conversations")]
    NoConversations { speaker_id: SpeakerId },
    #[error("conversation {conversation_id} has {count} anchor nodes (expected exactly one)")]
    AnchorCount { conversation_id: ConversationId, count: usize },
    #[error("edge {edge_id} in conversation {conversation_id} references unknown node {node_id}")]
    DanglingEdge { conversation_id: ConversationId, edge_id: EdgeId, node_id: NodeId },
}

/// Which speaker and conversation the editor is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub active_speaker_id: Option<SpeakerId>,
    pub active_conversation_id: Option<ConversationId>,
}

impl Cursor {
    pub fn new(speaker_id: SpeakerId, conversation_id: ConversationId) -> Self {
        Self { active_speaker_id: Some(speaker_id), active_conversation_id: Some(conversation_id) }
    }

    /// Points at the first speaker and its first conversation, or nothing for an empty document.
    pub fn first_of(document: &Document) -> Self {
        let Some(speaker) = document.speakers().first() else {
            return Self::default();
        };
        Self {
            active_speaker_id: Some(speaker.id().clone()),
            active_conversation_id: speaker.conversations().first().map(|c| c.id().clone()),
        }
    }
}
