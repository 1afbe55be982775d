// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Batched graph edits for a single conversation.
//!
//! The canvas and inspector emit fine-grained edits (move, select, connect, retype, ...). A
//! batch is applied in order; edits that would break an invariant are skipped and reported
//! as [`Rejection`]s while the rest of the batch still applies.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{
    Conversation, CrossRef, Edge, EdgeId, IdAuthority, Node, NodeBody, NodeId, NodeKind, Position,
    SpeakerId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEdit {
    AddNode {
        kind: NodeKind,
        label: String,
        position: Position,
    },
    Move {
        node_id: NodeId,
        position: Position,
    },
    Select {
        node_id: NodeId,
        selected: bool,
    },
    ClearSelection,
    RemoveNode {
        node_id: NodeId,
    },
    RemoveEdge {
        edge_id: EdgeId,
    },
    AddEdge {
        source: NodeId,
        target: NodeId,
        source_handle: Option<String>,
    },
    Retype {
        node_id: NodeId,
        kind: NodeKind,
    },
    SetLabel {
        node_id: NodeId,
        label: String,
    },
    SetText {
        node_id: NodeId,
        text: String,
    },
    SetSpeakerRef {
        node_id: NodeId,
        speaker_id: Option<SpeakerId>,
    },
    SetCrossRef {
        node_id: NodeId,
        cross_ref: Option<CrossRef>,
    },
}

impl GraphEdit {
    pub fn add_edge(source: NodeId, target: NodeId) -> Self {
        Self::AddEdge { source, target, source_handle: None }
    }
}

/// Identifies a node or edge touched by a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphRef {
    Node(NodeId),
    Edge(EdgeId),
}

/// Coarse record of which nodes and edges a batch added, removed or updated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<GraphRef>,
    pub removed: Vec<GraphRef>,
    pub updated: Vec<GraphRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn added_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.added.iter().filter_map(|r| match r {
            GraphRef::Node(node_id) => Some(node_id),
            GraphRef::Edge(_) => None,
        })
    }

    pub fn added_edges(&self) -> impl Iterator<Item = &EdgeId> {
        self.added.iter().filter_map(|r| match r {
            GraphRef::Edge(edge_id) => Some(edge_id),
            GraphRef::Node(_) => None,
        })
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<GraphRef>,
    removed: BTreeSet<GraphRef>,
    updated: BTreeSet<GraphRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, graph_ref: GraphRef) {
        self.removed.remove(&graph_ref);
        self.updated.remove(&graph_ref);
        self.added.insert(graph_ref);
    }

    fn record_removed(&mut self, graph_ref: GraphRef) {
        // Added and removed within one batch: nothing left to report.
        if self.added.remove(&graph_ref) {
            self.updated.remove(&graph_ref);
            return;
        }
        self.updated.remove(&graph_ref);
        self.removed.insert(graph_ref);
    }

    fn record_updated(&mut self, graph_ref: GraphRef) {
        if self.added.contains(&graph_ref) || self.removed.contains(&graph_ref) {
            return;
        }
        self.updated.insert(graph_ref);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

/// Why a single edit of a batch was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("anchor node {node_id} cannot be removed, retyped or relabelled")]
    AnchorLocked { node_id: NodeId },
    #[error("anchor nodes cannot be added")]
    AnchorNotAllowed,
    #[error("node not found (id={node_id})")]
    NodeNotFound { node_id: NodeId },
    #[error("edge not found (id={edge_id})")]
    EdgeNotFound { edge_id: EdgeId },
    #[error("edge endpoint not found (id={node_id})")]
    MissingEndpoint { node_id: NodeId },
    #[error("an identical edge {edge_id} already exists")]
    DuplicateEdge { edge_id: EdgeId },
    #[error("node {node_id} of kind {kind:?} does not carry this field")]
    FieldNotOnKind { node_id: NodeId, kind: NodeKind },
    #[error("position must be finite")]
    NonFinitePosition,
    #[error("no conversation is active")]
    NoActiveConversation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Index of the edit within the batch.
    pub index: usize,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyResult {
    pub applied: usize,
    pub rejected: Vec<Rejection>,
    pub delta: Delta,
}

impl ApplyResult {
    /// `true` when the batch left the conversation untouched.
    ///
    /// Accepted edits that change nothing (deselecting an unselected node, retyping to the
    /// current kind, ...) count as applied but leave the delta empty.
    pub fn is_noop(&self) -> bool {
        self.delta.is_empty()
    }
}

/// Applies `edits` in order to `conversation`.
///
/// New node and edge ids come from `authority`. Invalid edits never abort the batch.
pub fn apply_edits(
    conversation: &mut Conversation,
    authority: &mut IdAuthority,
    edits: &[GraphEdit],
) -> ApplyResult {
    let mut delta = DeltaBuilder::default();
    let mut result = ApplyResult::default();

    for (index, edit) in edits.iter().enumerate() {
        match apply_edit(conversation, authority, edit, &mut delta) {
            Ok(()) => result.applied += 1,
            Err(reason) => {
                debug!(
                    conversation_id = %conversation.id(),
                    index,
                    %reason,
                    "skipping rejected graph edit"
                );
                result.rejected.push(Rejection { index, reason });
            }
        }
    }

    result.delta = delta.finish();
    result
}

// Per-edit application helpers used by `apply_edits`.
include!("ops_impl.rs");
