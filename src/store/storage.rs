// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::model::Document;

/// Durable home of the document.
///
/// Both calls may suspend and may fail. Retrying is the storage's own business; callers
/// report failures and move on.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Reads the stored document, `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Document>, StoreError>;

    async fn save(&self, document: &Document) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid document json at {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
    #[error("storage task failed: {message}")]
    Task { message: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    document: Option<Document>,
    writes: Vec<Document>,
    load_failure: Option<String>,
    write_failure: Option<String>,
}

/// In-process storage, for hosts without a backend and for tests.
///
/// Records every successful write, can simulate write latency and inject failures.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    write_latency: Option<Duration>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        let storage = Self::default();
        storage.state().document = Some(document);
        storage
    }

    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every following load fail with `message` (or succeed again with `None`).
    pub fn set_load_failure(&self, message: Option<&str>) {
        self.state().load_failure = message.map(ToOwned::to_owned);
    }

    /// Makes every following save fail with `message` (or succeed again with `None`).
    pub fn set_write_failure(&self, message: Option<&str>) {
        self.state().write_failure = message.map(ToOwned::to_owned);
    }

    pub fn document(&self) -> Option<Document> {
        self.state().document.clone()
    }

    /// Every successfully written document, oldest first.
    pub fn writes(&self) -> Vec<Document> {
        self.state().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state().writes.len()
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<Document>, StoreError> {
        let state = self.state();
        if let Some(message) = &state.load_failure {
            return Err(StoreError::Unavailable { message: message.clone() });
        }
        Ok(state.document.clone())
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(latency) = self.write_latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        if let Some(message) = &state.write_failure {
            return Err(StoreError::Unavailable { message: message.clone() });
        }
        state.writes.push(document.clone());
        state.document = Some(document.clone());
        Ok(())
    }
}
