// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::storage::{DocumentStorage, StoreError};
use crate::model::Document;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Stores the document as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    durability: WriteDurability,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }
}

#[async_trait]
impl DocumentStorage for JsonFileStorage {
    async fn load(&self) -> Result<Option<Document>, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_document(&path))
            .await
            .map_err(|err| StoreError::Task { message: err.to_string() })?
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let mut contents = serde_json::to_string_pretty(document)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        contents.push('\n');

        let path = self.path.clone();
        let durability = self.durability;
        tokio::task::spawn_blocking(move || write_atomic(&path, contents.as_bytes(), durability))
            .await
            .map_err(|err| StoreError::Task { message: err.to_string() })?
    }
}

fn read_document(path: &Path) -> Result<Option<Document>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Sibling temp file that is deleted on drop unless it was persisted over its target.
struct TempFile {
    path: PathBuf,
    file: Option<fs::File>,
    persisted: bool,
}

impl TempFile {
    fn create_new(path: PathBuf) -> io::Result<Self> {
        let file = fs::OpenOptions::new().write(true).create_new(true).open(&path)?;
        Ok(Self { path, file: Some(file), persisted: false })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, contents: &[u8], durability: WriteDurability) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(|| io::Error::other("temp file is closed"))?;
        file.write_all(contents)?;
        if durability == WriteDurability::Durable {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Closes the handle and renames the temp file over `target`.
    fn persist(mut self, target: &Path) -> io::Result<()> {
        self.file = None;
        rename_overwrite(&self.path, target)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        self.file = None;
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn write_atomic(
    target: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let io_err =
        |path: &Path, source: io::Error| StoreError::Io { path: path.to_path_buf(), source };

    let (Some(dir), Some(file_name)) = (target.parent(), target.file_name()) else {
        let reason = io::Error::other("document path needs a directory and a file name");
        return Err(io_err(target, reason));
    };
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|source| io_err(dir, source))?;
    }

    match fs::symlink_metadata(target) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(io_err(target, io::Error::other("refusing to overwrite a symlink")));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(io_err(target, source)),
    }

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = dir.join(format!(".colloquy.tmp.{}.{nanos}", file_name.to_string_lossy()));

    // From here on every early return drops `temp`, which deletes the partial file.
    let mut temp = TempFile::create_new(tmp_path).map_err(|source| io_err(dir, source))?;
    temp.write(contents, durability).map_err(|source| io_err(temp.path(), source))?;
    temp.persist(target).map_err(|source| io_err(target, source))?;

    #[cfg(unix)]
    {
        if durability == WriteDurability::Durable {
            let dir_handle = fs::File::open(dir).map_err(|source| io_err(dir, source))?;
            dir_handle.sync_all().map_err(|source| io_err(dir, source))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rstest::{fixture, rstest};

    use super::{JsonFileStorage, TempFile, WriteDurability};
    use crate::model::fixtures::guard_document;
    use crate::store::{DocumentStorage, StoreError};

    static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TempDir {
        path: std::path::PathBuf,
    }

    impl TempDir {
        fn new(prefix: &str) -> Self {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
            let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = env::temp_dir();
            path.push(format!("colloquy-{prefix}-{}-{nanos}-{counter}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[fixture]
    fn tmp() -> TempDir {
        TempDir::new("json-file")
    }

    #[rstest]
    #[case(WriteDurability::BestEffort)]
    #[case(WriteDurability::Durable)]
    #[tokio::test]
    async fn saves_and_loads_document(tmp: TempDir, #[case] durability: WriteDurability) {
        let storage = JsonFileStorage::new(tmp.path.join("nested").join("dialogue.json"))
            .with_durability(durability);

        storage.save(&guard_document()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(guard_document()));

        let leftovers = std::fs::read_dir(tmp.path.join("nested"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".colloquy.tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_or_blank_file_loads_as_none(tmp: TempDir) {
        let path = tmp.path.join("dialogue.json");
        let storage = JsonFileStorage::new(&path);
        assert_eq!(storage.load().await.unwrap(), None);

        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_file_is_a_json_error(tmp: TempDir) {
        let path = tmp.path.join("dialogue.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStorage::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    fn temp_leftovers(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".colloquy.tmp."))
            .count()
    }

    #[rstest]
    #[tokio::test]
    async fn failed_write_removes_its_temp_file(tmp: TempDir) {
        // A non-empty directory at the target path makes the final rename fail.
        let target = tmp.path.join("dialogue.json");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = JsonFileStorage::new(&target).save(&guard_document()).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "{err}");
        assert_eq!(temp_leftovers(&tmp.path), 0);
        assert!(target.is_dir());
    }

    #[rstest]
    fn temp_file_is_deleted_unless_persisted(tmp: TempDir) {
        let abandoned = tmp.path.join(".colloquy.tmp.abandoned");
        let mut temp = TempFile::create_new(abandoned.clone()).unwrap();
        temp.write(b"partial", WriteDurability::BestEffort).unwrap();
        drop(temp);
        assert!(!abandoned.exists());

        let target = tmp.path.join("kept.json");
        let mut temp = TempFile::create_new(tmp.path.join(".colloquy.tmp.kept")).unwrap();
        temp.write(b"[]", WriteDurability::Durable).unwrap();
        temp.persist(&target).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "[]");
        assert_eq!(temp_leftovers(&tmp.path), 0);
    }
}
