// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Conversation, Edge, Node, NodeId, Position};

/// Primary flow direction of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAxis {
    /// Layers stack top to bottom; siblings spread along x.
    #[default]
    Downward,
    /// Layers stack left to right; siblings spread along y.
    Rightward,
}

/// Fixed node box size and gaps used to turn layers into coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSpacing {
    /// Gap between consecutive layers along the primary axis.
    pub layer_gap: f64,
    /// Minimum gap between neighbours of one layer along the secondary axis.
    pub node_gap: f64,
    pub node_width: f64,
    pub node_height: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self { layer_gap: 120.0, node_gap: 40.0, node_width: 220.0, node_height: 90.0 }
    }
}

impl LayoutSpacing {
    fn sanitized(self) -> Self {
        let fallback = Self::default();
        let pick = |value: f64, default: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                default
            }
        };
        let sanitized = Self {
            layer_gap: pick(self.layer_gap, fallback.layer_gap),
            node_gap: pick(self.node_gap, fallback.node_gap),
            node_width: pick(self.node_width, fallback.node_width),
            node_height: pick(self.node_height, fallback.node_height),
        };
        if sanitized != self {
            warn!(spacing = ?self, "invalid layout spacing replaced with defaults");
        }
        sanitized
    }

    /// (layer step, in-layer step, in-layer node extent) for `axis`.
    fn steps(&self, axis: LayoutAxis) -> (f64, f64, f64) {
        match axis {
            LayoutAxis::Downward => {
                let layer_step = self.node_height + self.layer_gap;
                (layer_step, self.node_width + self.node_gap, self.node_width)
            }
            LayoutAxis::Rightward => {
                let layer_step = self.node_width + self.layer_gap;
                (layer_step, self.node_height + self.node_gap, self.node_height)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePlacement {
    layer: usize,
    index_in_layer: usize,
}

impl NodePlacement {
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn index_in_layer(&self) -> usize {
        self.index_in_layer
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationLayout {
    layers: Vec<Vec<NodeId>>,
    placements: BTreeMap<NodeId, NodePlacement>,
    positions: BTreeMap<NodeId, Position>,
}

impl ConversationLayout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    pub fn placement(&self, node_id: &NodeId) -> Option<&NodePlacement> {
        self.placements.get(node_id)
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, Position> {
        &self.positions
    }

    pub fn position(&self, node_id: &NodeId) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    /// Writes the computed positions into `conversation`. Nodes without a position keep theirs.
    pub fn apply_to(&self, conversation: &mut Conversation) -> usize {
        let mut moved = 0;
        for node in conversation.nodes_mut() {
            if let Some(position) = self.positions.get(node.id()) {
                node.set_position(*position);
                moved += 1;
            }
        }
        moved
    }
}

#[derive(Debug, Default)]
struct Adjacency {
    children: BTreeMap<NodeId, Vec<NodeId>>,
    predecessors: BTreeMap<NodeId, Vec<NodeId>>,
}

/// Builds sorted, deduplicated adjacency lists. Self-loops and edges whose endpoints are not
/// in `node_ids` are left out; the latter are logged.
fn adjacency(node_ids: &BTreeSet<NodeId>, edges: &[Edge]) -> Adjacency {
    let mut adjacency = Adjacency::default();
    for node_id in node_ids {
        adjacency.children.insert(node_id.clone(), Vec::new());
        adjacency.predecessors.insert(node_id.clone(), Vec::new());
    }

    for edge in edges {
        if !node_ids.contains(edge.source()) || !node_ids.contains(edge.target()) {
            warn!(
                edge_id = %edge.id(),
                source = %edge.source(),
                target = %edge.target(),
                "layout skips edge with unknown endpoint"
            );
            continue;
        }
        if edge.is_self_loop() {
            continue;
        }
        if let Some(children) = adjacency.children.get_mut(edge.source()) {
            children.push(edge.target().clone());
        }
        if let Some(preds) = adjacency.predecessors.get_mut(edge.target()) {
            preds.push(edge.source().clone());
        }
    }

    for list in adjacency.children.values_mut().chain(adjacency.predecessors.values_mut()) {
        list.sort();
        list.dedup();
    }
    adjacency
}

/// Breadth-first layering from `root`: a node's layer is fixed on first visit, so cycles
/// cannot demote it. Nodes not reachable from the root land in layer 0.
fn assign_layers(
    node_ids: &BTreeSet<NodeId>,
    root: Option<&NodeId>,
    children: &BTreeMap<NodeId, Vec<NodeId>>,
) -> BTreeMap<NodeId, usize> {
    let mut layers = BTreeMap::<NodeId, usize>::new();
    let mut queue = VecDeque::<NodeId>::new();

    if let Some(root) = root {
        layers.insert(root.clone(), 0);
        queue.push_back(root.clone());
    }

    while let Some(current) = queue.pop_front() {
        let current_layer = layers.get(&current).copied().unwrap_or(0);
        let next = children.get(&current).map(|v| v.as_slice()).unwrap_or(&[]);
        for child in next {
            if layers.contains_key(child) {
                continue;
            }
            layers.insert(child.clone(), current_layer + 1);
            queue.push_back(child.clone());
        }
    }

    for node_id in node_ids {
        layers.entry(node_id.clone()).or_insert(0);
    }
    layers
}

fn sort_layer_by_barycenter(
    layer_nodes: &mut [NodeId],
    prev_positions: &BTreeMap<NodeId, usize>,
    predecessors: &BTreeMap<NodeId, Vec<NodeId>>,
) {
    let barycenter = |node_id: &NodeId| {
        predecessors
            .get(node_id)
            .map(|preds| {
                preds
                    .iter()
                    .filter_map(|p| prev_positions.get(p).copied())
                    .fold((0usize, 0usize), |(sum, count), pos| (sum + pos, count + 1))
            })
            .and_then(|(sum, count)| (count > 0).then_some((sum, count)))
    };

    layer_nodes.sort_by(|a, b| match (barycenter(a), barycenter(b)) {
        (None, None) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some((sum_a, count_a)), Some((sum_b, count_b))) => {
            // Compare sum_a/count_a vs sum_b/count_b without floats.
            let left = (sum_a as u128) * (count_b as u128);
            let right = (sum_b as u128) * (count_a as u128);
            left.cmp(&right).then_with(|| a.cmp(b))
        }
    });
}

/// Deterministic layered layout for one conversation.
///
/// - Layer 0 holds the anchor plus every node the anchor cannot reach.
/// - Layer `k` holds nodes first reached at breadth-first distance `k`.
/// - Within a layer nodes start in id order, then one downward barycenter sweep pulls each
///   node towards the mean index of its predecessors in the previous layer.
/// - Each layer is centred on the secondary axis around 0.
pub fn layout_conversation(
    nodes: &[Node],
    edges: &[Edge],
    axis: LayoutAxis,
    spacing: LayoutSpacing,
) -> ConversationLayout {
    if nodes.is_empty() {
        return ConversationLayout::default();
    }

    let spacing = spacing.sanitized();
    let node_ids = nodes.iter().map(|n| n.id().clone()).collect::<BTreeSet<_>>();
    let root = nodes.iter().filter(|n| n.is_anchor()).map(Node::id).min();
    if root.is_none() {
        warn!(nodes = nodes.len(), "layout found no anchor node; every node goes to layer 0");
    }

    let adjacency = adjacency(&node_ids, edges);
    let node_layers = assign_layers(&node_ids, root, &adjacency.children);

    let max_layer = node_layers.values().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::<NodeId>::new(); max_layer + 1];
    for (node_id, layer) in &node_layers {
        layers[*layer].push(node_id.clone());
    }

    for layer_idx in 1..layers.len() {
        let prev_positions = layers[layer_idx - 1]
            .iter()
            .enumerate()
            .map(|(idx, node_id)| (node_id.clone(), idx))
            .collect::<BTreeMap<_, _>>();

        sort_layer_by_barycenter(&mut layers[layer_idx], &prev_positions, &adjacency.predecessors);
    }

    let (layer_step, in_layer_step, extent) = spacing.steps(axis);
    let mut placements = BTreeMap::<NodeId, NodePlacement>::new();
    let mut positions = BTreeMap::<NodeId, Position>::new();
    for (layer, members) in layers.iter().enumerate() {
        let midpoint = (members.len().saturating_sub(1)) as f64 / 2.0;
        for (index_in_layer, node_id) in members.iter().enumerate() {
            let primary = layer as f64 * layer_step;
            let secondary = (index_in_layer as f64 - midpoint) * in_layer_step - extent / 2.0;
            let position = match axis {
                LayoutAxis::Downward => Position::new(secondary, primary),
                LayoutAxis::Rightward => Position::new(primary, secondary),
            };
            placements.insert(node_id.clone(), NodePlacement { layer, index_in_layer });
            positions.insert(node_id.clone(), position);
        }
    }

    ConversationLayout { layers, placements, positions }
}

/// Convenience wrapper over [`layout_conversation`] for a whole conversation.
pub fn layout(
    conversation: &Conversation,
    axis: LayoutAxis,
    spacing: LayoutSpacing,
) -> ConversationLayout {
    layout_conversation(conversation.nodes(), conversation.edges(), axis, spacing)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{layout, layout_conversation, LayoutAxis, LayoutSpacing};
    use crate::model::fixtures::{branching_conversation, guard_document};
    use crate::model::{Edge, EdgeId, Node, NodeBody, NodeId, NodeKind, Position};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn layer_names(layout: &super::ConversationLayout) -> Vec<Vec<String>> {
        layout
            .layers()
            .iter()
            .map(|layer| layer.iter().map(|id| id.as_str().to_owned()).collect())
            .collect()
    }

    #[test]
    fn empty_node_set_yields_empty_layout() {
        let layout = layout_conversation(&[], &[], LayoutAxis::Downward, LayoutSpacing::default());
        assert!(layout.is_empty());
        assert!(layout.layers().is_empty());
    }

    #[test]
    fn child_is_centred_under_the_anchor() {
        let document = guard_document();
        let conversation = &document.speakers()[0].conversations()[0];

        let layout = layout(conversation, LayoutAxis::Downward, LayoutSpacing::default());

        let n1 = layout.position(&nid("node-1")).unwrap();
        let n2 = layout.position(&nid("node-2")).unwrap();
        assert_eq!(layout.placement(&nid("node-1")).unwrap().layer(), 0);
        assert_eq!(layout.placement(&nid("node-2")).unwrap().layer(), 1);
        assert_eq!(n1.x, n2.x);
        assert!(n2.y > n1.y);
    }

    #[test]
    fn cycles_keep_first_visit_layers_and_orphans_fall_back_to_layer_zero() {
        let layout =
            layout(&branching_conversation(), LayoutAxis::Downward, LayoutSpacing::default());

        assert_eq!(
            layer_names(&layout),
            vec![
                vec!["a".to_owned(), "e".to_owned()],
                vec!["b".to_owned(), "c".to_owned()],
                vec!["d".to_owned()],
            ]
        );
    }

    #[test]
    fn orders_nodes_within_layer_using_barycenter_sweep() {
        let line = |id: &str| Node::new(nid(id), id, NodeBody::empty(NodeKind::Generic));
        let nodes = vec![Node::anchor(nid("a"), "A"), line("b"), line("c"), line("d"), line("e")];
        let edge = |id: &str, from: &str, to: &str| {
            Edge::new(EdgeId::new(id).unwrap(), nid(from), nid(to))
        };
        let edges = vec![
            edge("e:ab", "a", "b"),
            edge("e:ac", "a", "c"),
            // These two edges would cross if layer 2 stayed in lexical order [d, e].
            edge("e:be", "b", "e"),
            edge("e:cd", "c", "d"),
        ];

        let layout =
            layout_conversation(&nodes, &edges, LayoutAxis::Downward, LayoutSpacing::default());
        assert_eq!(layer_names(&layout)[2], vec!["e".to_owned(), "d".to_owned()]);
    }

    #[rstest]
    #[case(LayoutAxis::Downward)]
    #[case(LayoutAxis::Rightward)]
    fn layout_is_deterministic_and_non_overlapping(#[case] axis: LayoutAxis) {
        let conversation = branching_conversation();
        let spacing = LayoutSpacing::default();

        let first = layout(&conversation, axis, spacing);
        let second = layout(&conversation, axis, spacing);
        assert_eq!(first, second);
        assert_eq!(first.positions().len(), conversation.nodes().len());

        for members in first.layers() {
            let mut secondary = members
                .iter()
                .map(|id| {
                    let p = first.position(id).unwrap();
                    match axis {
                        LayoutAxis::Downward => p.x,
                        LayoutAxis::Rightward => p.y,
                    }
                })
                .collect::<Vec<_>>();
            secondary.sort_by(f64::total_cmp);
            let extent = match axis {
                LayoutAxis::Downward => spacing.node_width,
                LayoutAxis::Rightward => spacing.node_height,
            };
            for pair in secondary.windows(2) {
                assert!(pair[1] - pair[0] >= extent + spacing.node_gap);
            }
        }
    }

    #[test]
    fn rightward_axis_swaps_coordinates() {
        let conversation = branching_conversation();
        let down = layout(&conversation, LayoutAxis::Downward, LayoutSpacing::default());
        let right = layout(&conversation, LayoutAxis::Rightward, LayoutSpacing::default());

        let d = down.position(&nid("d")).unwrap();
        let r = right.position(&nid("d")).unwrap();
        let spacing = LayoutSpacing::default();
        assert_eq!(d.x, r.y + (spacing.node_height - spacing.node_width) / 2.0);
        assert!(r.x > 0.0);
        assert_eq!(d.y, 2.0 * (90.0 + 120.0));
        assert_eq!(r.x, 2.0 * (220.0 + 120.0));
    }

    #[test]
    fn edges_with_unknown_endpoints_are_skipped() {
        let nodes = vec![
            Node::anchor(nid("a"), "A"),
            Node::new(nid("b"), "B", NodeBody::empty(NodeKind::Generic)),
        ];
        let edges = vec![
            Edge::new(EdgeId::new("e:ax").unwrap(), nid("a"), nid("x")),
            Edge::new(EdgeId::new("e:ab").unwrap(), nid("a"), nid("b")),
        ];

        let layout =
            layout_conversation(&nodes, &edges, LayoutAxis::Downward, LayoutSpacing::default());
        assert_eq!(layout.positions().len(), 2);
        assert_eq!(layout.placement(&nid("b")).unwrap().layer(), 1);
    }

    #[test]
    fn invalid_spacing_falls_back_to_defaults() {
        let conversation = branching_conversation();
        let broken =
            LayoutSpacing { layer_gap: f64::NAN, node_gap: -5.0, ..LayoutSpacing::default() };

        assert_eq!(
            layout(&conversation, LayoutAxis::Downward, broken),
            layout(&conversation, LayoutAxis::Downward, LayoutSpacing::default())
        );
    }

    #[test]
    fn apply_to_moves_every_node() {
        let mut conversation = branching_conversation();
        let computed = layout(&conversation, LayoutAxis::Downward, LayoutSpacing::default());

        assert_eq!(computed.apply_to(&mut conversation), 5);
        assert_eq!(
            conversation.node(&nid("a")).unwrap().position(),
            computed.position(&nid("a")).unwrap()
        );
        assert_ne!(conversation.node(&nid("d")).unwrap().position(), Position::default());
    }
}
