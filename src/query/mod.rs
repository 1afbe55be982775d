// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read projections over a document and a cursor.
//!
//! Every function here is a pure function of `(Document, Cursor)`; the UI reads through these
//! and never holds on to model internals.

pub mod active;
pub mod cross_refs;

pub use active::{
    active_conversation, active_edges, active_nodes, active_speaker, repair_cursor,
    single_selected_node,
};
pub use cross_refs::{dangling_cross_refs, resolve_cross_ref, DanglingCrossRef};
