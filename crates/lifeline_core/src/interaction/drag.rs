//! Event dragging with dependent-subtree propagation.
//!
//! # Invariants
//! - Branches growing from the dragged event follow it to the new x.
//! - An event on a moved branch that sat exactly on the old line lands on the
//!   new line; any other event keeps its offset from the line.
//! - Propagation walks ids through the adjacency index and plans every write
//!   before applying any, so corrupted cyclic data fails with no change.

use crate::geometry::Point;
use crate::model::edge::EdgeId;
use crate::model::node::NodeId;
use crate::scene::{SceneError, SceneResult, SceneStore};
use log::{debug, warn};
use std::collections::HashSet;

/// Position changes applied by one subtree move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtreeMove {
    pub nodes: Vec<(NodeId, f64)>,
    pub edges: Vec<(EdgeId, f64)>,
}

/// Moves `node_id` to `new_x` and drags everything hanging from it.
pub fn reposition_subtree(
    scene: &mut SceneStore,
    node_id: NodeId,
    new_x: f64,
) -> SceneResult<SubtreeMove> {
    let plan = plan_subtree_move(scene, node_id, new_x)?;
    for (id, x) in &plan.nodes {
        scene.set_node_x(*id, *x)?;
    }
    for (id, x) in &plan.edges {
        scene.set_edge_x(*id, *x)?;
    }
    Ok(plan)
}

fn plan_subtree_move(scene: &SceneStore, node_id: NodeId, new_x: f64) -> SceneResult<SubtreeMove> {
    let node = scene.node(node_id).ok_or(SceneError::NodeNotFound(node_id))?;
    let delta = new_x - node.x;

    let mut plan = SubtreeMove::default();
    let mut visited_nodes = HashSet::from([node_id]);
    let mut visited_edges = HashSet::new();
    plan.nodes.push((node_id, new_x));

    // (edge, line x before the move, line x after the move)
    let mut pending: Vec<(EdgeId, f64, f64)> = Vec::new();
    for edge_id in scene.edges_from(node_id) {
        let edge = scene.edge(edge_id).ok_or(SceneError::EdgeNotFound(edge_id))?;
        pending.push((edge_id, edge.x, new_x));
    }

    while let Some((edge_id, from_x, to_x)) = pending.pop() {
        if !visited_edges.insert(edge_id) {
            return Err(SceneError::CycleDetected(node_id));
        }
        plan.edges.push((edge_id, to_x));

        for child_id in scene.nodes_on(edge_id) {
            if !visited_nodes.insert(child_id) {
                return Err(SceneError::CycleDetected(child_id));
            }
            let child = scene.node(child_id).ok_or(SceneError::NodeNotFound(child_id))?;
            let child_x = if child.x == from_x {
                to_x
            } else {
                child.x + delta
            };
            plan.nodes.push((child_id, child_x));

            for child_edge_id in scene.edges_from(child_id) {
                let child_edge = scene
                    .edge(child_edge_id)
                    .ok_or(SceneError::EdgeNotFound(child_edge_id))?;
                pending.push((child_edge_id, child_edge.x, child_edge.x + delta));
            }
        }
    }

    Ok(plan)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    node_id: NodeId,
    start_pointer_x: f64,
    start_node_x: f64,
}

/// Result of a finished drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub node_id: NodeId,
    pub from_x: f64,
    pub to_x: f64,
}

impl DragOutcome {
    /// Whether a history snapshot is warranted.
    pub fn moved(&self) -> bool {
        self.from_x != self.to_x
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.active.map(|session| session.node_id)
    }

    /// Starts dragging `node_id` from the world point under the pointer.
    ///
    /// Returns `false` (no-op) when the event no longer exists.
    pub fn begin(&mut self, scene: &SceneStore, node_id: NodeId, world: Point) -> bool {
        let Some(node) = scene.node(node_id) else {
            debug!(
                "event=drag_start module=drag status=noop reason=node_missing node_id={}",
                node_id
            );
            return false;
        };
        self.active = Some(DragSession {
            node_id,
            start_pointer_x: world.x,
            start_node_x: node.x,
        });
        debug!(
            "event=drag_start module=drag status=ok node_id={} x={}",
            node_id, node.x
        );
        true
    }

    /// Moves the dragged event to the pointer's world x.
    pub fn update(&mut self, scene: &mut SceneStore, world: Point) -> SceneResult<Option<SubtreeMove>> {
        let Some(session) = self.active else {
            return Ok(None);
        };
        if scene.node(session.node_id).is_none() {
            debug!(
                "event=drag_move module=drag status=noop reason=node_missing node_id={}",
                session.node_id
            );
            self.active = None;
            return Ok(None);
        }
        match reposition_subtree(scene, session.node_id, world.x) {
            Ok(moved) => Ok(Some(moved)),
            Err(err) => {
                warn!(
                    "event=drag_move module=drag status=error node_id={} error={}",
                    session.node_id, err
                );
                self.active = None;
                Err(err)
            }
        }
    }

    /// Ends the drag.
    pub fn finish(&mut self, scene: &SceneStore) -> Option<DragOutcome> {
        let session = self.active.take()?;
        let to_x = scene.node(session.node_id)?.x;
        let outcome = DragOutcome {
            node_id: session.node_id,
            from_x: session.start_node_x,
            to_x,
        };
        debug!(
            "event=drag_end module=drag status=ok node_id={} moved={} pointer_dx={}",
            outcome.node_id,
            outcome.moved(),
            to_x - session.start_pointer_x
        );
        Some(outcome)
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
