// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::authority::IdAuthority;
use super::conversation::Conversation;
use super::document::Document;
use super::speaker::Speaker;

pub(crate) const SEED_SPEAKER_NAME: &str = "New NPC";
pub(crate) const DEFAULT_CONVERSATION_NAME: &str = "Default";

/// Creates a speaker with its default conversation, drawing every id from `authority`.
pub(crate) fn new_speaker(authority: &mut IdAuthority, name: &str) -> Speaker {
    let conversation = new_conversation(authority, DEFAULT_CONVERSATION_NAME);
    Speaker::new(authority.generate(), name, conversation)
}

pub(crate) fn new_conversation(authority: &mut IdAuthority, name: &str) -> Conversation {
    let conversation_id = authority.generate();
    Conversation::new(conversation_id, name, authority.generate())
}

/// The minimal non-empty document substituted when nothing can be loaded.
pub(crate) fn seed_document(authority: &mut IdAuthority) -> Document {
    Document::new(vec![new_speaker(authority, SEED_SPEAKER_NAME)])
}

/// `Guard` with a `Greeting` conversation: anchor `node-1` -> actor line `node-2`.
#[cfg(test)]
pub(crate) fn guard_document() -> Document {
    use super::conversation::Edge;
    use super::ids::{ConversationId, EdgeId, NodeId, SpeakerId};
    use super::node::{Node, NodeBody, Position};

    let n1 = NodeId::new("node-1").expect("node id");
    let n2 = NodeId::new("node-2").expect("node id");
    let anchor = Node::anchor(n1.clone(), "Greeting");
    let hello = Node::new(
        n2.clone(),
        "Hello",
        NodeBody::ActorLine { text: "Halt! Who goes there?".to_owned(), speaker_ref: None },
    )
    .with_position(Position::new(0.0, 200.0));
    let edge = Edge::new(EdgeId::new("edge-1").expect("edge id"), n1, n2);

    let conversation = Conversation::from_parts(
        ConversationId::new("conv-1").expect("conversation id"),
        "Greeting",
        vec![anchor, hello],
        vec![edge],
    );
    Document::new(vec![Speaker::new(
        SpeakerId::new("npc-1").expect("speaker id"),
        "Guard",
        conversation,
    )])
}

/// A conversation with a branch, a merge, a back edge and one orphan node:
///
/// ```text
/// a -> b, a -> c, b -> d, c -> d, d -> a (cycle), e (unreachable)
/// ```
#[cfg(test)]
pub(crate) fn branching_conversation() -> Conversation {
    use super::conversation::Edge;
    use super::ids::{ConversationId, EdgeId, NodeId};
    use super::node::{Node, NodeBody, NodeKind};

    let nid = |value: &str| NodeId::new(value).expect("node id");
    let line = |value: &str| Node::new(nid(value), value, NodeBody::empty(NodeKind::SelfLine));
    let edge = |id: &str, from: &str, to: &str| {
        Edge::new(EdgeId::new(id).expect("edge id"), nid(from), nid(to))
    };

    Conversation::from_parts(
        ConversationId::new("conv-9").expect("conversation id"),
        "Branching",
        vec![Node::anchor(nid("a"), "Branching"), line("b"), line("c"), line("d"), line("e")],
        vec![
            edge("e:ab", "a", "b"),
            edge("e:ac", "a", "c"),
            edge("e:bd", "b", "d"),
            edge("e:cd", "c", "d"),
            edge("e:da", "d", "a"),
        ],
    )
}
