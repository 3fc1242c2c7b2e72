//! Incrementally maintained parent/child index over ids.

use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Node, NodeId};
use indexmap::IndexSet;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    edges_by_origin: HashMap<NodeId, IndexSet<EdgeId>>,
    nodes_by_edge: HashMap<EdgeId, IndexSet<NodeId>>,
}

impl Adjacency {
    pub(crate) fn rebuild<'a>(
        nodes: impl IntoIterator<Item = &'a Node>,
        edges: impl IntoIterator<Item = &'a Edge>,
    ) -> Self {
        let mut index = Self::default();
        for edge in edges {
            index.link_edge(edge.node_id, edge.id);
        }
        for node in nodes {
            if let Some(edge_id) = node.parent_edge_id {
                index.link_child(edge_id, node.id);
            }
        }
        index
    }

    pub(crate) fn link_edge(&mut self, origin: NodeId, edge_id: EdgeId) {
        self.edges_by_origin
            .entry(origin)
            .or_default()
            .insert(edge_id);
    }

    pub(crate) fn unlink_edge(&mut self, origin: NodeId, edge_id: EdgeId) {
        if let Some(edges) = self.edges_by_origin.get_mut(&origin) {
            edges.shift_remove(&edge_id);
            if edges.is_empty() {
                self.edges_by_origin.remove(&origin);
            }
        }
        self.nodes_by_edge.remove(&edge_id);
    }

    pub(crate) fn link_child(&mut self, edge_id: EdgeId, node_id: NodeId) {
        self.nodes_by_edge.entry(edge_id).or_default().insert(node_id);
    }

    pub(crate) fn unlink_child(&mut self, edge_id: EdgeId, node_id: NodeId) {
        if let Some(children) = self.nodes_by_edge.get_mut(&edge_id) {
            children.shift_remove(&node_id);
            if children.is_empty() {
                self.nodes_by_edge.remove(&edge_id);
            }
        }
    }

    pub(crate) fn edges_from(&self, origin: NodeId) -> Vec<EdgeId> {
        self.edges_by_origin
            .get(&origin)
            .map(|edges| edges.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn nodes_on(&self, edge_id: EdgeId) -> Vec<NodeId> {
        self.nodes_by_edge
            .get(&edge_id)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }
}
