//! Scene store implementation.

use super::adjacency::Adjacency;
use super::{SceneError, SceneResult};
use crate::config::TimelineConfig;
use crate::geometry::Transform;
use crate::history::HistoryState;
use crate::model::document::{
    BirthDetails, DocumentError, EdgeRecord, NodeRecord, TimelineData, DEFAULT_EVENT_LABEL,
};
use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Node, NodeDraft, NodeId};
use crate::model::sphere::Sphere;
use crate::model::validation::validate_age;
use indexmap::IndexMap;
use log::warn;
use std::collections::HashSet;
use uuid::Uuid;

/// Result of removing an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRemoval {
    pub node: Node,
    /// Branches that grew from the event and were removed with it.
    pub removed_edges: Vec<Edge>,
    /// Events that sat on a removed branch and now hang from the main axis.
    pub orphaned: Vec<NodeId>,
}

/// Owned timeline state. Several stores may coexist; nothing here is global.
#[derive(Debug, Clone)]
pub struct SceneStore {
    config: TimelineConfig,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    birth: BirthDetails,
    transform: Transform,
    current_age: f64,
    age_max: f64,
    selected_periodization: Option<String>,
    index: Adjacency,
}

impl SceneStore {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            birth: BirthDetails::default(),
            transform: Transform::default(),
            current_age: config.default_current_age,
            age_max: config.default_age_max,
            selected_periodization: None,
            index: Adjacency::default(),
            config,
        }
    }

    /// Builds a scene from a persisted document.
    ///
    /// Missing positions default to the main axis, missing spheres to `other`.
    /// Parent lines resolve through `parentEdgeId`, falling back to the branch
    /// whose x equals `parentX` (preferring one whose age range covers the event).
    ///
    /// # Errors
    /// - Non-UUID or duplicate ids, branches from missing events.
    /// - Ages or branch starts outside `[0, ageMax]`. Branch ends past `ageMax`
    ///   are clamped to it.
    /// - Parent links that form a cycle.
    pub fn from_document(data: &TimelineData, config: TimelineConfig) -> Result<Self, DocumentError> {
        let age_max = if data.age_max.is_finite() && data.age_max > 0.0 {
            data.age_max
        } else {
            config.default_age_max
        };
        let current_age = validate_age(data.current_age, age_max).map_err(|source| {
            DocumentError::Invalid {
                kind: "timeline",
                id: "currentAge".to_string(),
                source,
            }
        })?;

        let mut node_ids = HashSet::new();
        for record in &data.nodes {
            let id = parse_id("event", &record.id)?;
            if !node_ids.insert(id) {
                return Err(DocumentError::DuplicateId {
                    kind: "event",
                    value: record.id.clone(),
                });
            }
        }

        let mut edges = IndexMap::new();
        for record in &data.edges {
            let mut edge = edge_from_record(record, &data.nodes, &node_ids)?;
            if edge.end_age.is_finite() && edge.end_age > age_max && edge.start_age < age_max {
                warn!(
                    "event=document_load module=scene status=clamped edge_id={} end_age={} age_max={}",
                    edge.id, edge.end_age, age_max
                );
                edge.end_age = age_max;
            }
            edge.validate(age_max).map_err(|source| DocumentError::Invalid {
                kind: "branch",
                id: record.id.clone(),
                source,
            })?;
            if edges.insert(edge.id, edge).is_some() {
                return Err(DocumentError::DuplicateId {
                    kind: "branch",
                    value: record.id.clone(),
                });
            }
        }

        let mut nodes = IndexMap::new();
        for record in &data.nodes {
            let node = node_from_record(record, &edges, &config)?;
            validate_age(node.age, age_max).map_err(|source| DocumentError::Invalid {
                kind: "event",
                id: record.id.clone(),
                source,
            })?;
            nodes.insert(node.id, node);
        }

        let index = Adjacency::rebuild(nodes.values(), edges.values());
        let scene = Self {
            config,
            nodes,
            edges,
            birth: data.birth_details.clone(),
            transform: Transform::default(),
            current_age,
            age_max,
            selected_periodization: data.selected_periodization.clone(),
            index,
        };

        for node in scene.nodes.values() {
            if let Some(edge_id) = node.parent_edge_id {
                if scene.would_cycle(node.id, edge_id) {
                    return Err(DocumentError::Cycle {
                        node_id: node.id.to_string(),
                    });
                }
            }
        }

        Ok(scene)
    }

    /// Frozen document view for persistence and export.
    pub fn to_document(&self) -> TimelineData {
        let nodes = self
            .nodes
            .values()
            .map(|node| NodeRecord {
                id: node.id.to_string(),
                age: node.age,
                x: Some(node.x),
                parent_x: node
                    .parent_edge_id
                    .and_then(|edge_id| self.edges.get(&edge_id))
                    .map(|edge| edge.x),
                parent_edge_id: node.parent_edge_id.map(|edge_id| edge_id.to_string()),
                label: node.label.clone(),
                notes: node.notes.clone(),
                sphere: node.sphere,
                is_decision: node.is_decision,
                icon_id: node.icon_id.clone(),
            })
            .collect();
        let edges = self
            .edges
            .values()
            .map(|edge| EdgeRecord {
                id: edge.id.to_string(),
                x: edge.x,
                start_age: edge.start_age,
                end_age: edge.end_age,
                color: edge.color.clone(),
                node_id: edge.node_id.to_string(),
            })
            .collect();

        TimelineData {
            current_age: self.current_age,
            age_max: self.age_max,
            nodes,
            edges,
            birth_details: self.birth.clone(),
            selected_periodization: self.selected_periodization.clone(),
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn main_axis_x(&self) -> f64 {
        self.config.line_x
    }

    pub fn is_on_main_axis(&self, x: f64) -> bool {
        x == self.config.line_x
    }

    pub fn age_max(&self) -> f64 {
        self.age_max
    }

    pub fn current_age(&self) -> f64 {
        self.current_age
    }

    pub fn set_current_age(&mut self, age: f64) -> SceneResult<()> {
        self.current_age = validate_age(age, self.age_max)?;
        Ok(())
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Stores `transform` with its scale clamped to the configured range.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform.clamped(&self.config);
    }

    pub fn birth_details(&self) -> &BirthDetails {
        &self.birth
    }

    pub fn set_birth_details(&mut self, birth: BirthDetails) {
        self.birth = birth;
    }

    pub fn selected_periodization(&self) -> Option<&str> {
        self.selected_periodization.as_deref()
    }

    pub fn set_selected_periodization(&mut self, periodization: Option<String>) {
        self.selected_periodization = periodization;
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Events in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Branches in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Branches growing from `node_id`.
    pub fn edges_from(&self, node_id: NodeId) -> Vec<EdgeId> {
        self.index.edges_from(node_id)
    }

    /// Events hanging from `edge_id`.
    pub fn nodes_on(&self, edge_id: EdgeId) -> Vec<NodeId> {
        self.index.nodes_on(edge_id)
    }

    /// World x of the line `node` hangs from.
    pub fn parent_line_x(&self, node: &Node) -> f64 {
        node.parent_edge_id
            .and_then(|edge_id| self.edges.get(&edge_id))
            .map_or(self.config.line_x, |edge| edge.x)
    }

    /// Parent branch of the event a branch grows from (`None` = main axis).
    pub fn ancestor_line(&self, edge_id: EdgeId) -> SceneResult<Option<EdgeId>> {
        let edge = self.edges.get(&edge_id).ok_or(SceneError::EdgeNotFound(edge_id))?;
        Ok(self
            .nodes
            .get(&edge.node_id)
            .and_then(|origin| origin.parent_edge_id))
    }

    /// Inserts a fully built event after validating it.
    pub fn insert_node(&mut self, node: Node) -> SceneResult<NodeId> {
        node.validate(self.age_max)?;
        if let Some(edge_id) = node.parent_edge_id {
            if !self.edges.contains_key(&edge_id) {
                return Err(SceneError::EdgeNotFound(edge_id));
            }
            self.index.link_child(edge_id, node.id);
        }
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Replaces editable content; position and parent line stay.
    pub fn update_node_content(&mut self, id: NodeId, draft: &NodeDraft) -> SceneResult<()> {
        let draft = draft.validated(self.age_max)?;
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        node.apply_draft(&draft);
        Ok(())
    }

    pub fn set_node_x(&mut self, id: NodeId, x: f64) -> SceneResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        node.x = x;
        Ok(())
    }

    /// Moves an event under another line, keeping its coordinates.
    pub fn set_node_parent(&mut self, id: NodeId, parent: Option<EdgeId>) -> SceneResult<()> {
        let previous = self
            .nodes
            .get(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent_edge_id;
        if let Some(edge_id) = parent {
            if !self.edges.contains_key(&edge_id) {
                return Err(SceneError::EdgeNotFound(edge_id));
            }
            if self.would_cycle(id, edge_id) {
                return Err(SceneError::CycleDetected(id));
            }
        }
        if let Some(old) = previous {
            self.index.unlink_child(old, id);
        }
        if let Some(new) = parent {
            self.index.link_child(new, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_edge_id = parent;
        }
        Ok(())
    }

    /// Removes an event and every branch growing from it.
    ///
    /// Events on those branches are not deleted; they fall back to the main axis.
    pub fn remove_node(&mut self, id: NodeId) -> SceneResult<NodeRemoval> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        let mut removed_edges = Vec::new();
        let mut orphaned = Vec::new();
        for edge_id in self.index.edges_from(id) {
            let (edge, detached) = self.detach_edge(edge_id)?;
            removed_edges.push(edge);
            orphaned.extend(detached);
        }
        orphaned.retain(|orphan| *orphan != id);

        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(SceneError::NodeNotFound(id))?;
        if let Some(edge_id) = node.parent_edge_id {
            self.index.unlink_child(edge_id, id);
        }
        Ok(NodeRemoval {
            node,
            removed_edges,
            orphaned,
        })
    }

    /// Inserts a branch after validating its range and origin.
    pub fn insert_edge(&mut self, edge: Edge) -> SceneResult<EdgeId> {
        edge.validate(self.age_max)?;
        if !self.nodes.contains_key(&edge.node_id) {
            return Err(SceneError::NodeNotFound(edge.node_id));
        }
        let id = edge.id;
        self.index.link_edge(edge.node_id, id);
        self.edges.insert(id, edge);
        Ok(id)
    }

    pub fn set_edge_x(&mut self, id: EdgeId, x: f64) -> SceneResult<()> {
        let edge = self.edges.get_mut(&id).ok_or(SceneError::EdgeNotFound(id))?;
        edge.x = x;
        Ok(())
    }

    /// Moves a branch end, validating `start < end <= age_max`.
    pub fn set_edge_end_age(&mut self, id: EdgeId, end_age: f64) -> SceneResult<()> {
        let age_max = self.age_max;
        let edge = self.edges.get_mut(&id).ok_or(SceneError::EdgeNotFound(id))?;
        crate::model::validation::validate_branch_range(edge.start_age, end_age, age_max)?;
        edge.end_age = end_age;
        Ok(())
    }

    /// Removes a branch. Events still hanging from it fall back to the main axis.
    pub fn remove_edge(&mut self, id: EdgeId) -> SceneResult<Edge> {
        self.detach_edge(id).map(|(edge, _)| edge)
    }

    /// Drops all events and branches; birth details and settings stay.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index = Adjacency::default();
    }

    /// Deep copy of the undoable state.
    pub fn snapshot(&self) -> HistoryState {
        HistoryState {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            birth: self.birth.clone(),
        }
    }

    /// Replaces the undoable state with `state` and rebuilds the index.
    pub fn restore(&mut self, state: &HistoryState) {
        self.nodes = state
            .nodes
            .iter()
            .map(|node| (node.id, node.clone()))
            .collect();
        self.edges = state
            .edges
            .iter()
            .map(|edge| (edge.id, edge.clone()))
            .collect();
        self.birth = state.birth.clone();
        self.index = Adjacency::rebuild(self.nodes.values(), self.edges.values());
    }

    fn detach_edge(&mut self, id: EdgeId) -> SceneResult<(Edge, Vec<NodeId>)> {
        let edge = self
            .edges
            .shift_remove(&id)
            .ok_or(SceneError::EdgeNotFound(id))?;
        let children = self.index.nodes_on(id);
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent_edge_id = None;
            }
        }
        self.index.unlink_edge(edge.node_id, id);
        Ok((edge, children))
    }

    /// True when hanging `node_id` from `edge_id` makes it its own ancestor.
    fn would_cycle(&self, node_id: NodeId, edge_id: EdgeId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(edge_id);
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return true;
            }
            let Some(edge) = self.edges.get(&current) else {
                return false;
            };
            if edge.node_id == node_id {
                return true;
            }
            cursor = self
                .nodes
                .get(&edge.node_id)
                .and_then(|origin| origin.parent_edge_id);
        }
        false
    }
}

fn parse_id(kind: &'static str, value: &str) -> Result<Uuid, DocumentError> {
    Uuid::parse_str(value.trim()).map_err(|_| DocumentError::InvalidId {
        kind,
        value: value.to_string(),
    })
}

fn edge_from_record(
    record: &EdgeRecord,
    node_records: &[NodeRecord],
    node_ids: &HashSet<NodeId>,
) -> Result<Edge, DocumentError> {
    let id = parse_id("branch", &record.id)?;
    let node_id = parse_id("event", &record.node_id)?;
    if !node_ids.contains(&node_id) {
        return Err(DocumentError::DanglingOrigin {
            edge_id: record.id.clone(),
            node_id: record.node_id.clone(),
        });
    }
    let color = if record.color.trim().is_empty() {
        node_records
            .iter()
            .find(|node| node.id.trim() == record.node_id.trim())
            .and_then(|node| node.sphere)
            .unwrap_or(Sphere::Other)
            .color()
            .to_string()
    } else {
        record.color.clone()
    };
    Ok(Edge {
        id,
        x: record.x,
        start_age: record.start_age,
        end_age: record.end_age,
        color,
        node_id,
    })
}

fn node_from_record(
    record: &NodeRecord,
    edges: &IndexMap<EdgeId, Edge>,
    config: &TimelineConfig,
) -> Result<Node, DocumentError> {
    let id = parse_id("event", &record.id)?;
    let explicit_parent = match record.parent_edge_id.as_deref() {
        Some(text) => Some(parse_id("branch", text)?).filter(|edge_id| edges.contains_key(edge_id)),
        None => None,
    };
    let parent_edge_id = explicit_parent.or_else(|| {
        let parent_x = record.parent_x.filter(|x| *x != config.line_x)?;
        let candidates: Vec<&Edge> = edges
            .values()
            .filter(|edge| edge.x == parent_x && edge.node_id != id)
            .collect();
        candidates
            .iter()
            .find(|edge| edge.covers(record.age))
            .or_else(|| candidates.first())
            .map(|edge| edge.id)
    });
    let label = if record.label.trim().is_empty() {
        DEFAULT_EVENT_LABEL.to_string()
    } else {
        record.label.clone()
    };

    Ok(Node {
        id,
        age: record.age,
        x: record.x.unwrap_or(config.line_x),
        parent_edge_id,
        label,
        notes: record.notes.clone(),
        sphere: Some(record.sphere.unwrap_or(Sphere::Other)),
        is_decision: record.is_decision,
        icon_id: record.icon_id.clone(),
    })
}
