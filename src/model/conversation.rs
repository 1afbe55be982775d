// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{ConversationId, EdgeId, NodeId};
use super::node::Node;

/// A directed transition between two nodes of the same conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_handle: Option<String>,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target, source_handle: None }
    }

    pub fn with_source_handle<T: Into<String>>(mut self, handle: Option<T>) -> Self {
        self.source_handle = handle.map(Into::into);
        self
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn source_handle(&self) -> Option<&str> {
        self.source_handle.as_deref()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

/// One branching dialogue graph owned by a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conversation {
    id: ConversationId,
    name: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl Conversation {
    /// Creates a conversation holding only its anchor node, labelled with the conversation name.
    pub fn new(id: ConversationId, name: impl Into<String>, anchor_id: NodeId) -> Self {
        let name = name.into();
        let anchor = Node::anchor(anchor_id, name.clone());
        Self { id, name, nodes: vec![anchor], edges: Vec::new() }
    }

    pub fn from_parts(
        id: ConversationId,
        name: impl Into<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self { id, name: name.into(), nodes, edges }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the conversation and projects the new name onto the anchor label.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        let name = self.name.clone();
        if let Some(anchor) = self.nodes.iter_mut().find(|node| node.is_anchor()) {
            anchor.set_label(name);
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut Vec<Edge> {
        &mut self.edges
    }

    pub fn anchor(&self) -> Option<&Node> {
        self.nodes.iter().find(|node| node.is_anchor())
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id() == node_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id() == edge_id)
    }
}
