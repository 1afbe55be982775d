// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing facade consumed by a UI shell.
//!
//! [`Editor`] owns the document, the cursor and the id authority. The shell feeds it CRUD calls
//! and batches of [`GraphEdit`]s and reads projections back. Every mutation that changes the
//! document bumps the revision and hands a snapshot to the attached persistence handle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::format::{export_document_json, import_document_json, FormatError};
use crate::layout::{layout, LayoutAxis, LayoutSpacing};
use crate::model::fixtures::{new_conversation, new_speaker};
use crate::model::{
    Conversation, ConversationId, Cursor, Document, Edge, IdAuthority, Node, Speaker, SpeakerId,
};
use crate::ops::{apply_edits, ApplyResult, GraphEdit, RejectReason, Rejection};
use crate::query::{self, DanglingCrossRef};
use crate::store::{
    load_document, DocumentStorage, LoadOutcome, PersistError, PersistenceController,
    PersistenceHandle, SaveStatus,
};

#[derive(Debug)]
pub struct Editor {
    document: Document,
    cursor: Cursor,
    authority: IdAuthority,
    revision: u64,
    config: EditorConfig,
    persistence: Option<PersistenceHandle>,
}

impl Editor {
    /// Wraps an already loaded document; the authority is synced with every id it contains.
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let authority = IdAuthority::for_document(&document);
        let cursor = Cursor::first_of(&document);
        Self { document, cursor, authority, revision: 0, config, persistence: None }
    }

    /// Startup read. Returns the editor plus the reason the seed document was used, if it was.
    pub async fn load(
        storage: &dyn DocumentStorage,
        config: EditorConfig,
    ) -> (Self, Option<String>) {
        let mut authority = IdAuthority::new();
        let LoadOutcome { document, fallback_reason } =
            load_document(storage, &mut authority).await;
        let cursor = Cursor::first_of(&document);
        let editor = Self { document, cursor, authority, revision: 0, config, persistence: None };
        (editor, fallback_reason)
    }

    pub fn attach_persistence(&mut self, handle: PersistenceHandle) {
        self.persistence = Some(handle);
    }

    /// Spawns a persistence worker using the configured debounce and attaches it.
    pub fn start_persistence(
        &mut self,
        storage: Arc<dyn DocumentStorage>,
    ) -> PersistenceController {
        let controller = PersistenceController::spawn(storage, self.config.save_debounce());
        self.attach_persistence(controller.handle());
        controller
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Number of document-changing mutations since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn speakers(&self) -> &[Speaker] {
        self.document.speakers()
    }

    pub fn active_speaker(&self) -> Option<&Speaker> {
        query::active_speaker(&self.document, &self.cursor)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        query::active_conversation(&self.document, &self.cursor)
    }

    pub fn active_nodes(&self) -> &[Node] {
        query::active_nodes(&self.document, &self.cursor)
    }

    pub fn active_edges(&self) -> &[Edge] {
        query::active_edges(&self.document, &self.cursor)
    }

    pub fn single_selected_node(&self) -> Option<&Node> {
        query::single_selected_node(&self.document, &self.cursor)
    }

    pub fn dangling_cross_refs(&self) -> Vec<DanglingCrossRef> {
        query::dangling_cross_refs(&self.document)
    }

    /// `(is_saving, last_saved_at, last_error)`; all-default when nothing is attached.
    pub fn save_status(&self) -> SaveStatus {
        self.persistence.as_ref().map(PersistenceHandle::status).unwrap_or_default()
    }

    // Speakers

    /// Adds a speaker with a "Default" conversation and makes both active.
    pub fn add_speaker(&mut self, name: &str) -> SpeakerId {
        let speaker = new_speaker(&mut self.authority, name);
        let speaker_id = speaker.id().clone();
        self.cursor = Cursor {
            active_speaker_id: Some(speaker_id.clone()),
            active_conversation_id: speaker.conversations().first().map(|c| c.id().clone()),
        };
        self.document.speakers_mut().push(speaker);
        debug!(%speaker_id, "speaker added");
        self.mark_dirty();
        speaker_id
    }

    /// Activates the speaker and its first conversation.
    pub fn select_speaker(&mut self, speaker_id: &SpeakerId) -> bool {
        let Some(speaker) = self.document.speaker(speaker_id) else {
            return false;
        };
        self.cursor = Cursor {
            active_speaker_id: Some(speaker_id.clone()),
            active_conversation_id: speaker.conversations().first().map(|c| c.id().clone()),
        };
        true
    }

    /// Removes the speaker and all of its conversations. The last speaker may be deleted.
    pub fn delete_speaker(&mut self, speaker_id: &SpeakerId) -> bool {
        let speakers = self.document.speakers_mut();
        let Some(index) = speakers.iter().position(|s| s.id() == speaker_id) else {
            return false;
        };
        speakers.remove(index);

        if self.cursor.active_speaker_id.as_ref() == Some(speaker_id) {
            self.cursor = Cursor::first_of(&self.document);
        }
        debug!(%speaker_id, "speaker deleted");
        self.mark_dirty();
        true
    }

    pub fn rename_speaker(&mut self, speaker_id: &SpeakerId, name: &str) -> bool {
        self.update_speaker(speaker_id, |speaker| speaker.set_name(name))
    }

    pub fn set_speaker_image(&mut self, speaker_id: &SpeakerId, image: Option<&str>) -> bool {
        self.update_speaker(speaker_id, |speaker| speaker.set_image(image))
    }

    pub fn set_speaker_accent_color(
        &mut self,
        speaker_id: &SpeakerId,
        color: Option<&str>,
    ) -> bool {
        self.update_speaker(speaker_id, |speaker| speaker.set_accent_color(color))
    }

    fn update_speaker(
        &mut self,
        speaker_id: &SpeakerId,
        update: impl FnOnce(&mut Speaker),
    ) -> bool {
        let Some(speaker) = self.document.speaker_mut(speaker_id) else {
            return false;
        };
        update(speaker);
        self.mark_dirty();
        true
    }

    // Conversations

    /// Adds a conversation to `speaker_id` and makes it active.
    pub fn add_conversation(
        &mut self,
        speaker_id: &SpeakerId,
        name: &str,
    ) -> Option<ConversationId> {
        if self.document.speaker(speaker_id).is_none() {
            return None;
        }
        let conversation = new_conversation(&mut self.authority, name);
        let conversation_id = conversation.id().clone();
        self.document.speaker_mut(speaker_id)?.conversations_mut().push(conversation);

        self.cursor = Cursor::new(speaker_id.clone(), conversation_id.clone());
        debug!(%speaker_id, %conversation_id, "conversation added");
        self.mark_dirty();
        Some(conversation_id)
    }

    /// Activates the conversation and the speaker owning it.
    pub fn select_conversation(&mut self, conversation_id: &ConversationId) -> bool {
        let Some((speaker, _)) = self.document.find_conversation(conversation_id) else {
            return false;
        };
        self.cursor = Cursor::new(speaker.id().clone(), conversation_id.clone());
        true
    }

    /// Deletes a conversation unless it is its speaker's last one.
    pub fn delete_conversation(&mut self, conversation_id: &ConversationId) -> bool {
        let Some((speaker, _)) = self.document.find_conversation(conversation_id) else {
            return false;
        };
        let speaker_id = speaker.id().clone();
        let removed = self
            .document
            .speaker_mut(&speaker_id)
            .and_then(|speaker| speaker.remove_conversation(conversation_id));
        if removed.is_none() {
            debug!(%conversation_id, "refusing to delete the last conversation of a speaker");
            return false;
        }

        self.cursor = query::repair_cursor(&self.document, &self.cursor);
        self.mark_dirty();
        true
    }

    /// Renames the conversation; its anchor label follows.
    pub fn rename_conversation(&mut self, conversation_id: &ConversationId, name: &str) -> bool {
        let Some(conversation) = self.document.find_conversation_mut(conversation_id) else {
            return false;
        };
        conversation.rename(name);
        self.mark_dirty();
        true
    }

    // Graph edits

    /// Applies a batch of edits to the active conversation.
    ///
    /// Without an active conversation every edit is rejected. The document is only marked dirty
    /// when the batch actually changed something.
    pub fn apply_changes(&mut self, edits: &[GraphEdit]) -> ApplyResult {
        let Some(conversation) = active_conversation_mut(&mut self.document, &self.cursor) else {
            return ApplyResult {
                rejected: (0..edits.len())
                    .map(|index| Rejection { index, reason: RejectReason::NoActiveConversation })
                    .collect(),
                ..ApplyResult::default()
            };
        };

        let result = apply_edits(conversation, &mut self.authority, edits);
        if !result.is_noop() {
            self.mark_dirty();
        }
        result
    }

    /// Recomputes positions of the active conversation. Returns how many nodes moved.
    pub fn auto_layout(&mut self, axis: LayoutAxis, spacing: LayoutSpacing) -> usize {
        let Some(conversation) = active_conversation_mut(&mut self.document, &self.cursor) else {
            return 0;
        };
        let moved = layout(conversation, axis, spacing).apply_to(conversation);
        if moved > 0 {
            self.mark_dirty();
        }
        moved
    }

    /// [`Self::auto_layout`] with the configured axis and spacing.
    pub fn auto_layout_default(&mut self) -> usize {
        let EditorConfig { axis, spacing, .. } = self.config;
        self.auto_layout(axis, spacing)
    }

    // Import / export

    pub fn export_json(&self) -> Result<String, FormatError> {
        export_document_json(&self.document)
    }

    /// Replaces the whole document. On error the current document is kept untouched.
    pub fn import_json(&mut self, input: &str) -> Result<(), FormatError> {
        let document = import_document_json(input)?;
        self.authority.sync_with_document(&document);
        self.document = document;
        self.cursor = Cursor::first_of(&self.document);
        info!(speakers = self.document.speakers().len(), "document imported");
        self.mark_dirty();
        Ok(())
    }

    /// Writes the current document immediately, cancelling any pending debounced write.
    pub async fn save_now(&self) -> Result<(), PersistError> {
        let handle = self.persistence.as_ref().ok_or(PersistError::NotAttached)?;
        handle.save_now(self.document.clone()).await
    }

    fn mark_dirty(&mut self) {
        self.revision += 1;
        if let Some(handle) = &self.persistence {
            handle.schedule_save(self.document.clone());
        }
    }
}

fn active_conversation_mut<'a>(
    document: &'a mut Document,
    cursor: &Cursor,
) -> Option<&'a mut Conversation> {
    let speaker = document.speaker_mut(cursor.active_speaker_id.as_ref()?)?;
    speaker.conversation_mut(cursor.active_conversation_id.as_ref()?)
}
