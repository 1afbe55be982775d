// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Conversation, Cursor, Document, Edge, Node, Speaker};

pub fn active_speaker<'a>(document: &'a Document, cursor: &Cursor) -> Option<&'a Speaker> {
    document.speaker(cursor.active_speaker_id.as_ref()?)
}

/// The active conversation, only if it belongs to the active speaker.
pub fn active_conversation<'a>(
    document: &'a Document,
    cursor: &Cursor,
) -> Option<&'a Conversation> {
    active_speaker(document, cursor)?.conversation(cursor.active_conversation_id.as_ref()?)
}

pub fn active_nodes<'a>(document: &'a Document, cursor: &Cursor) -> &'a [Node] {
    active_conversation(document, cursor).map(Conversation::nodes).unwrap_or(&[])
}

pub fn active_edges<'a>(document: &'a Document, cursor: &Cursor) -> &'a [Edge] {
    active_conversation(document, cursor).map(Conversation::edges).unwrap_or(&[])
}

/// The node the inspector binds to: present only when exactly one node is selected.
pub fn single_selected_node<'a>(document: &'a Document, cursor: &Cursor) -> Option<&'a Node> {
    let mut selected = active_nodes(document, cursor).iter().filter(|n| n.selected());
    let first = selected.next()?;
    match selected.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Returns a cursor that points at existing entities.
///
/// A dangling speaker falls back to the first speaker; a dangling or foreign conversation
/// falls back to the speaker's first conversation.
pub fn repair_cursor(document: &Document, cursor: &Cursor) -> Cursor {
    let Some(speaker) = active_speaker(document, cursor) else {
        return Cursor::first_of(document);
    };

    let conversation_id = cursor
        .active_conversation_id
        .as_ref()
        .and_then(|id| speaker.conversation(id))
        .or_else(|| speaker.conversations().first())
        .map(|c| c.id().clone());

    Cursor {
        active_speaker_id: Some(speaker.id().clone()),
        active_conversation_id: conversation_id,
    }
}
