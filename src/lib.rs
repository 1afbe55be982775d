// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Colloquy — graph state engine for branching NPC dialogue editors.
//!
//! The crate owns the authoritative document (speakers → conversations → nodes/edges), applies
//! batched graph edits under structural invariants, computes layered layouts, and persists the
//! document through a debounced worker. Rendering and input handling belong to the embedding UI.

pub mod config;
pub mod editor;
pub mod format;
pub mod layout;
pub mod logging;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;

pub use config::EditorConfig;
pub use editor::Editor;
