// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn apply_edit(
    conversation: &mut Conversation,
    authority: &mut IdAuthority,
    edit: &GraphEdit,
    delta: &mut DeltaBuilder,
) -> Result<(), RejectReason> {
    match edit {
        GraphEdit::AddNode { kind, label, position } => {
            if *kind == NodeKind::Anchor {
                return Err(RejectReason::AnchorNotAllowed);
            }
            ensure_finite(*position)?;
            let node_id: NodeId = authority.generate();
            let node = Node::new(node_id.clone(), label.clone(), NodeBody::empty(*kind))
                .with_position(*position);
            conversation.nodes_mut().push(node);
            delta.record_added(GraphRef::Node(node_id));
            Ok(())
        }
        GraphEdit::Move { node_id, position } => {
            ensure_finite(*position)?;
            let node = existing_node_mut(conversation, node_id)?;
            if node.position() != *position {
                node.set_position(*position);
                delta.record_updated(GraphRef::Node(node_id.clone()));
            }
            Ok(())
        }
        GraphEdit::Select { node_id, selected } => {
            let node = existing_node_mut(conversation, node_id)?;
            if node.selected() != *selected {
                node.set_selected(*selected);
                delta.record_updated(GraphRef::Node(node_id.clone()));
            }
            Ok(())
        }
        GraphEdit::ClearSelection => {
            for node in conversation.nodes_mut().iter_mut().filter(|n| n.selected()) {
                node.set_selected(false);
                delta.record_updated(GraphRef::Node(node.id().clone()));
            }
            Ok(())
        }
        GraphEdit::RemoveNode { node_id } => {
            let node = existing_node(conversation, node_id)?;
            if node.is_anchor() {
                return Err(RejectReason::AnchorLocked { node_id: node_id.clone() });
            }
            conversation.nodes_mut().retain(|n| n.id() != node_id);

            let removed_edge_ids = conversation
                .edges()
                .iter()
                .filter(|e| e.touches(node_id))
                .map(|e| e.id().clone())
                .collect::<Vec<_>>();
            conversation.edges_mut().retain(|e| !e.touches(node_id));
            for edge_id in removed_edge_ids {
                delta.record_removed(GraphRef::Edge(edge_id));
            }
            delta.record_removed(GraphRef::Node(node_id.clone()));
            Ok(())
        }
        GraphEdit::RemoveEdge { edge_id } => {
            let before_len = conversation.edges().len();
            conversation.edges_mut().retain(|e| e.id() != edge_id);
            if conversation.edges().len() == before_len {
                return Err(RejectReason::EdgeNotFound { edge_id: edge_id.clone() });
            }
            delta.record_removed(GraphRef::Edge(edge_id.clone()));
            Ok(())
        }
        GraphEdit::AddEdge { source, target, source_handle } => {
            for endpoint in [source, target] {
                if !conversation.contains_node(endpoint) {
                    return Err(RejectReason::MissingEndpoint { node_id: endpoint.clone() });
                }
            }
            if let Some(existing) = conversation.edges().iter().find(|e| {
                e.source() == source
                    && e.target() == target
                    && e.source_handle() == source_handle.as_deref()
            }) {
                return Err(RejectReason::DuplicateEdge { edge_id: existing.id().clone() });
            }

            let edge_id: EdgeId = authority.generate();
            let edge = Edge::new(edge_id.clone(), source.clone(), target.clone())
                .with_source_handle(source_handle.clone());
            conversation.edges_mut().push(edge);
            delta.record_added(GraphRef::Edge(edge_id));
            Ok(())
        }
        GraphEdit::Retype { node_id, kind } => {
            let node = unlocked_node_mut(conversation, node_id)?;
            if node.kind() == *kind {
                return Ok(());
            }
            if !node.retype(*kind) {
                return Err(RejectReason::AnchorNotAllowed);
            }
            delta.record_updated(GraphRef::Node(node_id.clone()));
            Ok(())
        }
        GraphEdit::SetLabel { node_id, label } => {
            let node = unlocked_node_mut(conversation, node_id)?;
            node.set_label(label.clone());
            delta.record_updated(GraphRef::Node(node_id.clone()));
            Ok(())
        }
        GraphEdit::SetText { node_id, text } => {
            let node = existing_node_mut(conversation, node_id)?;
            if !node.set_text(text.clone()) {
                return Err(field_not_on_kind(node));
            }
            delta.record_updated(GraphRef::Node(node_id.clone()));
            Ok(())
        }
        GraphEdit::SetSpeakerRef { node_id, speaker_id } => {
            let node = existing_node_mut(conversation, node_id)?;
            if !node.set_speaker_ref(speaker_id.clone()) {
                return Err(field_not_on_kind(node));
            }
            delta.record_updated(GraphRef::Node(node_id.clone()));
            Ok(())
        }
        GraphEdit::SetCrossRef { node_id, cross_ref } => {
            let node = existing_node_mut(conversation, node_id)?;
            if !node.set_cross_ref(cross_ref.clone()) {
                return Err(field_not_on_kind(node));
            }
            delta.record_updated(GraphRef::Node(node_id.clone()));
            Ok(())
        }
    }
}

fn existing_node<'a>(
    conversation: &'a Conversation,
    node_id: &NodeId,
) -> Result<&'a Node, RejectReason> {
    conversation
        .node(node_id)
        .ok_or_else(|| RejectReason::NodeNotFound { node_id: node_id.clone() })
}

fn existing_node_mut<'a>(
    conversation: &'a mut Conversation,
    node_id: &NodeId,
) -> Result<&'a mut Node, RejectReason> {
    conversation
        .node_mut(node_id)
        .ok_or_else(|| RejectReason::NodeNotFound { node_id: node_id.clone() })
}

/// A node whose structure may change; the anchor is refused.
fn unlocked_node_mut<'a>(
    conversation: &'a mut Conversation,
    node_id: &NodeId,
) -> Result<&'a mut Node, RejectReason> {
    let node = existing_node_mut(conversation, node_id)?;
    if node.is_anchor() {
        return Err(RejectReason::AnchorLocked { node_id: node_id.clone() });
    }
    Ok(node)
}

fn field_not_on_kind(node: &Node) -> RejectReason {
    RejectReason::FieldNotOnKind { node_id: node.id().clone(), kind: node.kind() }
}

fn ensure_finite(position: Position) -> Result<(), RejectReason> {
    if position.x.is_finite() && position.y.is_finite() {
        Ok(())
    } else {
        Err(RejectReason::NonFinitePosition)
    }
}
