// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Identifier authority.
//!
//! Hands out ids of the shape `<prefix>-<n>` per [`IdKind`] and remembers every id it has
//! issued or seen, so that ids stay unique across the whole document, including documents
//! written by earlier processes with different counter state.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;
use uuid::Uuid;

use super::document::Document;
use super::ids::{Id, IdKind, IdTag};

const RANDOM_SUFFIX_LEN: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct IdAuthority {
    counters: BTreeMap<IdKind, u64>,
    reserved: HashSet<String>,
    random_kinds: BTreeSet<IdKind>,
}

impl IdAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authority already synchronized with `document`.
    pub fn for_document(document: &Document) -> Self {
        let mut authority = Self::new();
        authority.sync_with_document(document);
        authority
    }

    pub fn generate<T: IdTag>(&mut self) -> Id<T> {
        Id::from_valid(self.generate_raw(T::KIND))
    }

    /// Returns a fresh id string for `kind` that has never been issued or reserved.
    pub fn generate_raw(&mut self, kind: IdKind) -> String {
        if self.random_kinds.contains(&kind) {
            return self.generate_random(kind);
        }

        loop {
            let counter = self.counters.entry(kind).or_insert(0);
            let Some(next) = counter.checked_add(1) else {
                self.random_kinds.insert(kind);
                return self.generate_random(kind);
            };
            *counter = next;

            let candidate = format!("{}-{next}", kind.prefix());
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn generate_random(&mut self, kind: IdKind) -> String {
        loop {
            let uuid = Uuid::new_v4().simple().to_string();
            let candidate = format!("{}-r{}", kind.prefix(), &uuid[..RANDOM_SUFFIX_LEN]);
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Marks an externally supplied id as taken. Returns `false` if it was already known.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.reserved.insert(id.to_owned())
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Reserves every id found in `document` and advances counters past the highest numeric
    /// suffix seen per kind.
    ///
    /// Ids without a parseable `<prefix>-<n>` suffix switch their kind to random suffixes.
    pub fn sync_with_document(&mut self, document: &Document) {
        for (kind, id) in document.ids() {
            self.reserve(id);
            match numeric_suffix(kind, id) {
                Some(value) => {
                    let counter = self.counters.entry(kind).or_insert(0);
                    *counter = (*counter).max(value);
                }
                None => {
                    if self.random_kinds.insert(kind) {
                        debug!(?kind, id, "unparseable id suffix; using random ids for this kind");
                    }
                }
            }
        }
    }

    pub fn uses_random_suffixes(&self, kind: IdKind) -> bool {
        self.random_kinds.contains(&kind)
    }
}

fn numeric_suffix(kind: IdKind, id: &str) -> Option<u64> {
    let rest = id.strip_prefix(kind.prefix())?.strip_prefix('-')?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse::<u64>().ok()
}
