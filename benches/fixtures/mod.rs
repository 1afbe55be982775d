// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic benchmark conversations (no RNG).

use colloquy::model::{Conversation, ConversationId, Edge, EdgeId, Node, NodeBody, NodeId, Position};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// Anchor plus a dozen lines in a short chain with one fork.
    Small,
    /// ~200 nodes, three outgoing edges each, with back-edges forming cycles.
    MediumDense,
    /// ~1000 nodes in a wide tree (fan-out 4).
    LargeTree,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::MediumDense, Case::LargeTree];

    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::MediumDense => "medium_dense",
            Case::LargeTree => "large_tree",
        }
    }
}

pub fn node_id(idx: usize) -> NodeId {
    NodeId::new(format!("node-{idx}")).expect("node id")
}

fn edge(idx: usize, source: usize, target: usize) -> Edge {
    let edge_id = EdgeId::new(format!("edge-{idx}")).expect("edge id");
    Edge::new(edge_id, node_id(source), node_id(target))
}

fn line(idx: usize) -> Node {
    let body = if idx % 2 == 0 {
        NodeBody::ActorLine { text: format!("actor line {idx}"), speaker_ref: None }
    } else {
        NodeBody::SelfLine { text: format!("reply {idx}") }
    };
    Node::new(node_id(idx), format!("line {idx}"), body)
        .with_position(Position::new((idx % 17) as f64 * 13.0, (idx % 11) as f64 * 29.0))
}

fn build(node_count: usize, edges: Vec<(usize, usize)>) -> Conversation {
    let mut nodes = Vec::with_capacity(node_count);
    nodes.push(Node::anchor(node_id(0), "bench"));
    nodes.extend((1..node_count).map(line));

    let edges = edges
        .into_iter()
        .enumerate()
        .map(|(idx, (source, target))| edge(idx, source, target))
        .collect();

    let conversation_id = ConversationId::new("conv-bench").expect("conversation id");
    Conversation::from_parts(conversation_id, "bench", nodes, edges)
}

pub fn fixture(case: Case) -> Conversation {
    match case {
        Case::Small => {
            let mut edges = (0..11).map(|idx| (idx, idx + 1)).collect::<Vec<_>>();
            edges.push((3, 9));
            build(12, edges)
        }
        Case::MediumDense => {
            let count = 200;
            let mut edges = Vec::new();
            for idx in 0..count {
                for step in [1usize, 7, 31] {
                    let target = (idx + step) % count;
                    if target != idx {
                        edges.push((idx, target));
                    }
                }
            }
            build(count, edges)
        }
        Case::LargeTree => {
            let count = 1000;
            let edges = (1..count).map(|idx| ((idx - 1) / 4, idx)).collect();
            build(count, edges)
        }
    }
}

pub fn checksum_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> u64 {
    let mut acc = 0u64;
    for position in positions {
        acc = acc.wrapping_mul(131).wrapping_add(position.x.to_bits());
        acc = acc.wrapping_mul(131).wrapping_add(position.y.to_bits());
    }
    acc
}
