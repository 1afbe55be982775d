// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Conversation, ConversationId, CrossRef, Document, NodeId, Speaker};

/// Looks up the speaker and conversation a cross-reference points at.
pub fn resolve_cross_ref<'a>(
    document: &'a Document,
    cross_ref: &CrossRef,
) -> Option<(&'a Speaker, &'a Conversation)> {
    let speaker = document.speaker(&cross_ref.speaker_id)?;
    let conversation = speaker.conversation(&cross_ref.conversation_id)?;
    Some((speaker, conversation))
}

/// A cross-reference node whose target no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingCrossRef {
    pub conversation_id: ConversationId,
    pub node_id: NodeId,
    pub target: CrossRef,
}

/// Lists cross-reference nodes anywhere in the document whose target is missing.
///
/// Nodes with no target set are not dangling; they are simply unconfigured.
pub fn dangling_cross_refs(document: &Document) -> Vec<DanglingCrossRef> {
    let mut out = Vec::new();
    for speaker in document.speakers() {
        for conversation in speaker.conversations() {
            for node in conversation.nodes() {
                let Some(target) = node.cross_ref() else {
                    continue;
                };
                if resolve_cross_ref(document, target).is_none() {
                    out.push(DanglingCrossRef {
                        conversation_id: conversation.id().clone(),
                        node_id: node.id().clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    out
}
