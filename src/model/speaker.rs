// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::conversation::Conversation;
use super::ids::{ConversationId, SpeakerId};

/// A dialogue participant (an NPC) and the conversations it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    id: SpeakerId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accent_color: Option<String>,
    #[serde(default)]
    conversations: Vec<Conversation>,
}

impl Speaker {
    pub fn new(id: SpeakerId, name: impl Into<String>, first: Conversation) -> Self {
        Self { id, name: name.into(), image: None, accent_color: None, conversations: vec![first] }
    }

    pub fn id(&self) -> &SpeakerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn set_image<T: Into<String>>(&mut self, image: Option<T>) {
        self.image = image.map(Into::into);
    }

    pub fn accent_color(&self) -> Option<&str> {
        self.accent_color.as_deref()
    }

    pub fn set_accent_color<T: Into<String>>(&mut self, accent_color: Option<T>) {
        self.accent_color = accent_color.map(Into::into);
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversations_mut(&mut self) -> &mut Vec<Conversation> {
        &mut self.conversations
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == conversation_id)
    }

    pub fn conversation_mut(
        &mut self,
        conversation_id: &ConversationId,
    ) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id() == conversation_id)
    }

    /// Removes a conversation unless it is the speaker's last one.
    pub fn remove_conversation(
        &mut self,
        conversation_id: &ConversationId,
    ) -> Option<Conversation> {
        if self.conversations.len() <= 1 {
            return None;
        }
        let index = self.conversations.iter().position(|c| c.id() == conversation_id)?;
        Some(self.conversations.remove(index))
    }
}
