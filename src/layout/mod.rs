// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout for conversation graphs.
//!
//! Computes node coordinates from edge topology: layers along the primary axis, siblings
//! spread along the secondary axis.

pub mod conversation;

pub use conversation::{
    layout, layout_conversation, ConversationLayout, LayoutAxis, LayoutSpacing, NodePlacement,
};
