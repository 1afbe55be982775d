// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document storage and debounced persistence.
//!
//! Storage backends implement [`DocumentStorage`]; the [`PersistenceController`] coalesces
//! mutation bursts into single writes and reports progress through [`SaveStatus`].

pub mod json_file;
pub mod persistence;
pub mod storage;

pub use json_file::{JsonFileStorage, WriteDurability};
pub use persistence::{
    load_document, LoadOutcome, PersistError, PersistenceController, PersistenceHandle, SaveStatus,
};
pub use storage::{DocumentStorage, MemoryStorage, StoreError};
