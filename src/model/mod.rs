// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A document holds speakers; each speaker owns conversations made of typed nodes and
//! directed edges. Ids are unique across the whole document.

pub mod authority;
pub mod conversation;
pub mod document;
pub(crate) mod fixtures;
pub mod ids;
pub mod node;
pub mod speaker;

pub use authority::IdAuthority;
pub use conversation::{Conversation, Edge};
pub use document::{Cursor, Document, DocumentError};
pub use ids::{ConversationId, EdgeId, Id, IdError, IdKind, IdTag, NodeId, SpeakerId};
pub use node::{CrossRef, Node, NodeBody, NodeKind, Position};
pub use speaker::Speaker;
