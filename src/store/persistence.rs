// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Debounced persistence.
//!
//! A single worker task owns the pending document slot and the debounce deadline. Writes run
//! one at a time on that task: a request that arrives while a write is in flight waits in the
//! command queue until the write settles, so an older snapshot can never land after a newer
//! one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::storage::{DocumentStorage, StoreError};
use crate::model::fixtures::seed_document;
use crate::model::{Document, IdAuthority};

/// Observable save state: `(is_saving, last_saved_at, last_error)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveStatus {
    pub is_saving: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Message of the most recent failure; cleared by the next successful write.
    pub last_error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("persistence worker is no longer running")]
    Closed,
    #[error("no persistence is attached")]
    NotAttached,
}

#[derive(Debug)]
enum Command {
    Schedule(Document),
    SaveNow { document: Document, reply: oneshot::Sender<Result<(), StoreError>> },
    Shutdown,
}

/// Cheap, cloneable front of the persistence worker.
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
}

impl PersistenceHandle {
    /// Marks the document dirty. The snapshot replaces any pending one and restarts the
    /// debounce window.
    pub fn schedule_save(&self, document: Document) {
        if self.commands.send(Command::Schedule(document)).is_err() {
            warn!("dropping scheduled save: persistence worker is gone");
        }
    }

    /// Cancels any pending debounced write and writes `document` right away.
    ///
    /// Resolves once the write has settled. Failures are also reflected in [`SaveStatus`].
    pub async fn save_now(&self, document: Document) -> Result<(), PersistError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::SaveNow { document, reply })
            .map_err(|_| PersistError::Closed)?;
        response.await.map_err(|_| PersistError::Closed)?.map_err(PersistError::from)
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

/// Owns the worker task. Dropping every handle (or calling [`Self::shutdown`]) flushes any
/// pending write before the worker exits.
#[derive(Debug)]
pub struct PersistenceController {
    handle: PersistenceHandle,
    task: JoinHandle<()>,
}

impl PersistenceController {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(storage: Arc<dyn DocumentStorage>, debounce: Duration) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::default());

        let worker = SaveWorker {
            storage,
            debounce,
            commands: commands_rx,
            status: status_tx,
            pending: None,
            deadline: None,
        };
        let task = tokio::spawn(worker.run());

        Self { handle: PersistenceHandle { commands: commands_tx, status: status_rx }, task }
    }

    pub fn handle(&self) -> PersistenceHandle {
        self.handle.clone()
    }

    /// Flushes any pending write and waits for the worker to stop.
    pub async fn shutdown(self) {
        let _ = self.handle.commands.send(Command::Shutdown);
        if let Err(err) = self.task.await {
            warn!(%err, "persistence worker ended abnormally");
        }
    }
}

enum Wake {
    Command(Option<Command>),
    DeadlineElapsed,
}

struct SaveWorker {
    storage: Arc<dyn DocumentStorage>,
    debounce: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<SaveStatus>,
    pending: Option<Document>,
    deadline: Option<Instant>,
}

impl SaveWorker {
    async fn run(mut self) {
        loop {
            let wake = match self.deadline {
                Some(deadline) => tokio::select! {
                    biased;
                    command = self.commands.recv() => Wake::Command(command),
                    () = tokio::time::sleep_until(deadline) => Wake::DeadlineElapsed,
                },
                None => Wake::Command(self.commands.recv().await),
            };

            match wake {
                Wake::DeadlineElapsed => self.flush_pending().await,
                Wake::Command(Some(Command::Schedule(document))) => {
                    self.pending = Some(document);
                    self.deadline = Some(Instant::now() + self.debounce);
                }
                Wake::Command(Some(Command::SaveNow { document, reply })) => {
                    if self.pending.take().is_some() {
                        debug!("immediate save supersedes pending debounced write");
                    }
                    self.deadline = None;
                    let result = self.write(&document).await;
                    let _ = reply.send(result);
                }
                Wake::Command(Some(Command::Shutdown)) | Wake::Command(None) => {
                    self.flush_pending().await;
                    break;
                }
            }
        }
    }

    async fn flush_pending(&mut self) {
        self.deadline = None;
        if let Some(document) = self.pending.take() {
            // Failures are already recorded in the status channel.
            let _ = self.write(&document).await;
        }
    }

    async fn write(&mut self, document: &Document) -> Result<(), StoreError> {
        self.status.send_modify(|status| status.is_saving = true);
        let result = self.storage.save(document).await;

        self.status.send_modify(|status| {
            status.is_saving = false;
            match &result {
                Ok(()) => {
                    status.last_saved_at = Some(Utc::now());
                    status.last_error = None;
                }
                Err(err) => status.last_error = Some(err.to_string()),
            }
        });

        match &result {
            Ok(()) => debug!(speakers = document.speakers().len(), "document saved"),
            Err(err) => warn!(%err, "document save failed"),
        }
        result
    }
}

/// Result of the one-shot startup read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub document: Document,
    /// Why the seed document was substituted, if it was.
    pub fallback_reason: Option<String>,
}

/// Reads the stored document and synchronizes `authority` with it.
///
/// A failed, empty or structurally invalid read yields the built-in seed document instead, with
/// the reason recorded in [`LoadOutcome::fallback_reason`].
pub async fn load_document(
    storage: &dyn DocumentStorage,
    authority: &mut IdAuthority,
) -> LoadOutcome {
    let reason = match storage.load().await {
        Ok(Some(document)) if !document.is_empty() => match document.validate() {
            Ok(()) => {
                authority.sync_with_document(&document);
                info!(speakers = document.speakers().len(), "document loaded");
                return LoadOutcome { document, fallback_reason: None };
            }
            Err(err) => format!("stored document is invalid: {err}"),
        },
        Ok(_) => "no stored document".to_owned(),
        Err(err) => format!("failed to load document: {err}"),
    };

    warn!(%reason, "falling back to seed document");
    let document = seed_document(authority);
    LoadOutcome { document, fallback_reason: Some(reason) }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{load_document, PersistenceController};
    use crate::model::fixtures::guard_document;
    use crate::model::{Document, IdAuthority, IdKind};
    use crate::store::MemoryStorage;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn renamed(name: &str) -> Document {
        let mut document = guard_document();
        document.speakers_mut()[0].set_name(name);
        document
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_schedules_results_in_one_write_of_the_latest_state() {
        let storage = Arc::new(MemoryStorage::new());
        let controller = PersistenceController::spawn(storage.clone(), DEBOUNCE);
        let handle = controller.handle();

        for step in 0..5 {
            handle.schedule_save(renamed(&format!("Guard {step}")));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(storage.write_count(), 0);

        tokio::time::sleep(DEBOUNCE).await;
        assert_eq!(storage.writes(), vec![renamed("Guard 4")]);
        assert!(handle.status().last_saved_at.is_some());
        assert!(!handle.status().is_saving);
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_cancels_the_pending_debounced_write() {
        let storage = Arc::new(MemoryStorage::new());
        let controller = PersistenceController::spawn(storage.clone(), DEBOUNCE);
        let handle = controller.handle();

        handle.schedule_save(renamed("draft"));
        handle.save_now(renamed("final")).await.expect("save now");
        assert_eq!(storage.write_count(), 1);

        tokio::time::sleep(DEBOUNCE * 3).await;
        assert_eq!(storage.writes(), vec![renamed("final")]);
    }

    #[tokio::test(start_paused = true)]
    async fn writes_never_interleave() {
        let storage = Arc::new(MemoryStorage::new().with_write_latency(Duration::from_millis(100)));
        let controller = PersistenceController::spawn(storage.clone(), Duration::from_millis(50));
        let handle = controller.handle();

        handle.schedule_save(renamed("first"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(handle.status().is_saving);

        handle.schedule_save(renamed("second"));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(storage.writes(), vec![renamed("first"), renamed("second")]);
        assert_eq!(storage.document(), Some(renamed("second")));
        assert!(!handle.status().is_saving);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_surface_in_status_and_clear_on_success() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_write_failure(Some("disk full"));
        let controller = PersistenceController::spawn(storage.clone(), DEBOUNCE);
        let handle = controller.handle();

        handle.schedule_save(guard_document());
        tokio::time::sleep(DEBOUNCE * 2).await;
        let status = handle.status();
        assert_eq!(status.last_error.as_deref(), Some("storage unavailable: disk full"));
        assert_eq!(status.last_saved_at, None);

        let err = handle.save_now(guard_document()).await.unwrap_err();
        assert_eq!(err.to_string(), "storage unavailable: disk full");

        storage.set_write_failure(None);
        handle.save_now(guard_document()).await.expect("save now");
        let status = handle.status();
        assert_eq!(status.last_error, None);
        assert!(status.last_saved_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_pending_write() {
        let storage = Arc::new(MemoryStorage::new());
        let controller = PersistenceController::spawn(storage.clone(), DEBOUNCE);

        controller.handle().schedule_save(renamed("closing"));
        controller.shutdown().await;

        assert_eq!(storage.writes(), vec![renamed("closing")]);
    }

    #[tokio::test]
    async fn load_uses_stored_document_and_syncs_ids() {
        let storage = MemoryStorage::with_document(guard_document());
        let mut authority = IdAuthority::new();

        let outcome = load_document(&storage, &mut authority).await;
        assert_eq!(outcome.fallback_reason, None);
        assert_eq!(outcome.document, guard_document());
        assert_eq!(authority.generate_raw(IdKind::Node), "node-3");
    }

    #[tokio::test]
    async fn load_falls_back_to_seed_and_records_why() {
        let mut authority = IdAuthority::new();

        let outcome = load_document(&MemoryStorage::new(), &mut authority).await;
        assert_eq!(outcome.fallback_reason.as_deref(), Some("no stored document"));
        assert_eq!(outcome.document.speakers().len(), 1);
        assert_eq!(outcome.document.validate(), Ok(()));

        let failing = MemoryStorage::with_document(guard_document());
        failing.set_load_failure(Some("offline"));
        let outcome = load_document(&failing, &mut authority).await;
        assert_eq!(
            outcome.fallback_reason.as_deref(),
            Some("failed to load document: storage unavailable: offline")
        );

        let empty = MemoryStorage::with_document(Document::default());
        let outcome = load_document(&empty, &mut authority).await;
        assert_eq!(outcome.fallback_reason.as_deref(), Some("no stored document"));
    }

    #[tokio::test]
    async fn load_rejects_structurally_invalid_documents() {
        let mut document = guard_document();
        document.speakers_mut()[0].conversations_mut()[0].edges_mut().clear();
        let conversation = document.speakers()[0].conversations()[0].clone();
        document.speakers_mut()[0].conversations_mut().push(conversation);

        let mut authority = IdAuthority::new();
        let outcome = load_document(&MemoryStorage::with_document(document), &mut authority).await;
        let reason = outcome.fallback_reason.expect("fallback");
        assert!(reason.starts_with("stored document is invalid"), "{reason}");
    }
}
