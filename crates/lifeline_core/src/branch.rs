//! Branch lifecycle: grow, resize and delete alternate lines.
//!
//! # Responsibility
//! - Create a branch from an off-axis event that carries a sphere.
//! - Change a branch's length or stretch it to a required age.
//! - Delete a branch, moving its events to the line the branch grew from.
//!
//! # Invariants
//! - `start_age < end_age <= age_max` holds after every operation.
//! - Deletion never leaves an event pointing at the removed branch.
//! - Failures leave the scene untouched.

use crate::model::edge::{Edge, EdgeId};
use crate::model::node::NodeId;
use crate::model::validation::{validate_branch_range, validate_years, ValidationError};
use crate::scene::{SceneError, SceneResult, SceneStore};
use log::info;

/// Grows a branch of `years` from `node_id` at the event's x.
///
/// # Errors
/// - `MissingSphere` when the event has no sphere.
/// - `OnMainAxis` when the event still sits on the main axis.
/// - `InvalidDuration` / `BranchBeyondAgeMax` for bad lengths.
pub fn extend_branch(scene: &mut SceneStore, node_id: NodeId, years: f64) -> SceneResult<EdgeId> {
    let node = scene.node(node_id).ok_or(SceneError::NodeNotFound(node_id))?;
    let sphere = node.sphere.ok_or(ValidationError::MissingSphere)?;
    if scene.is_on_main_axis(node.x) {
        return Err(ValidationError::OnMainAxis.into());
    }
    let years = validate_years(years)?;
    let end_age = node.age + years;
    validate_branch_range(node.age, end_age, scene.age_max())?;

    let edge = Edge::new(node_id, node.x, node.age, end_age, sphere.color());
    let edge_id = scene.insert_edge(edge)?;
    info!(
        "event=branch_extend module=branch status=ok node_id={} edge_id={} years={}",
        node_id, edge_id, years
    );
    Ok(edge_id)
}

/// Sets a branch's length to `years` from its start.
pub fn update_branch_length(scene: &mut SceneStore, edge_id: EdgeId, years: f64) -> SceneResult<()> {
    let edge = scene.edge(edge_id).ok_or(SceneError::EdgeNotFound(edge_id))?;
    let years = validate_years(years)?;
    let end_age = edge.start_age + years;
    scene.set_edge_end_age(edge_id, end_age)?;
    info!(
        "event=branch_resize module=branch status=ok edge_id={} years={}",
        edge_id, years
    );
    Ok(())
}

/// Moves a branch end to `end_age` (used when a bulk import needs room).
pub fn extend_branch_to(scene: &mut SceneStore, edge_id: EdgeId, end_age: f64) -> SceneResult<()> {
    scene.set_edge_end_age(edge_id, end_age)?;
    info!(
        "event=branch_extend_to module=branch status=ok edge_id={} end_age={}",
        edge_id, end_age
    );
    Ok(())
}

/// Current length of a branch, for the length editor.
pub fn branch_length(scene: &SceneStore, edge_id: EdgeId) -> Option<f64> {
    scene.edge(edge_id).map(Edge::length)
}

/// What a branch deletion changed.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchDeletion {
    pub edge: Edge,
    /// Line the branch's events now hang from (`None` = main axis).
    pub new_parent: Option<EdgeId>,
    pub reparented: Vec<NodeId>,
}

/// Removes a branch and reparents its events to the branch's ancestor line.
pub fn delete_branch(scene: &mut SceneStore, edge_id: EdgeId) -> SceneResult<BranchDeletion> {
    let new_parent = scene.ancestor_line(edge_id)?;
    let reparented = scene.nodes_on(edge_id);

    let before = scene.snapshot();
    let result = reparent_and_remove(scene, edge_id, new_parent, &reparented);
    if result.is_err() {
        scene.restore(&before);
    }
    let edge = result?;

    info!(
        "event=branch_delete module=branch status=ok edge_id={} reparented={}",
        edge_id,
        reparented.len()
    );
    Ok(BranchDeletion {
        edge,
        new_parent,
        reparented,
    })
}

fn reparent_and_remove(
    scene: &mut SceneStore,
    edge_id: EdgeId,
    new_parent: Option<EdgeId>,
    children: &[NodeId],
) -> SceneResult<Edge> {
    for child in children {
        scene.set_node_parent(*child, new_parent)?;
    }
    scene.remove_edge(edge_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::model::node::{Node, NodeDraft};
    use crate::model::sphere::Sphere;

    fn scene_with_event(x: f64, sphere: Option<Sphere>) -> (SceneStore, NodeId) {
        let mut scene = SceneStore::new(TimelineConfig::default());
        let mut draft = NodeDraft::new(25.0, "Graduated");
        draft.sphere = sphere;
        let id = scene.insert_node(Node::from_draft(&draft, x, None)).unwrap();
        (scene, id)
    }

    #[test]
    fn extend_requires_sphere_and_off_axis_position() {
        let (mut scene, id) = scene_with_event(2200.0, None);
        assert_eq!(
            extend_branch(&mut scene, id, 5.0),
            Err(SceneError::Validation(ValidationError::MissingSphere))
        );

        let (mut scene, id) = scene_with_event(2000.0, Some(Sphere::Career));
        assert_eq!(
            extend_branch(&mut scene, id, 5.0),
            Err(SceneError::Validation(ValidationError::OnMainAxis))
        );
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn extend_creates_branch_in_sphere_colour() {
        let (mut scene, id) = scene_with_event(2200.0, Some(Sphere::Career));
        let edge_id = extend_branch(&mut scene, id, 5.0).unwrap();
        let edge = scene.edge(edge_id).unwrap();
        assert_eq!((edge.x, edge.start_age, edge.end_age), (2200.0, 25.0, 30.0));
        assert_eq!(edge.color, "#7dd3fc");
        assert_eq!(scene.edges_from(id), vec![edge_id]);
    }

    #[test]
    fn extend_rejects_bad_lengths() {
        let (mut scene, id) = scene_with_event(2200.0, Some(Sphere::Career));
        assert!(extend_branch(&mut scene, id, 0.0).is_err());
        assert!(extend_branch(&mut scene, id, f64::NAN).is_err());
        assert!(matches!(
            extend_branch(&mut scene, id, 80.0),
            Err(SceneError::Validation(ValidationError::BranchBeyondAgeMax { .. }))
        ));
    }

    #[test]
    fn length_update_and_stretch() {
        let (mut scene, id) = scene_with_event(2200.0, Some(Sphere::Career));
        let edge_id = extend_branch(&mut scene, id, 5.0).unwrap();
        update_branch_length(&mut scene, edge_id, 10.0).unwrap();
        assert_eq!(branch_length(&scene, edge_id), Some(10.0));
        assert!(update_branch_length(&mut scene, edge_id, 76.0).is_err());
        extend_branch_to(&mut scene, edge_id, 60.0).unwrap();
        assert_eq!(scene.edge(edge_id).unwrap().end_age, 60.0);
    }

    #[test]
    fn delete_moves_events_to_ancestor_line() {
        let (mut scene, root) = scene_with_event(2200.0, Some(Sphere::Career));
        let outer = extend_branch(&mut scene, root, 20.0).unwrap();
        let middle = scene
            .insert_node(Node::from_draft(
                &NodeDraft::new(30.0, "Moved").with_sphere(Sphere::Place),
                2300.0,
                Some(outer),
            ))
            .unwrap();
        let inner = extend_branch(&mut scene, middle, 5.0).unwrap();
        let leaf = scene
            .insert_node(Node::from_draft(&NodeDraft::new(32.0, "Leaf"), 2300.0, Some(inner)))
            .unwrap();

        let deletion = delete_branch(&mut scene, inner).unwrap();
        assert_eq!(deletion.new_parent, Some(outer));
        assert_eq!(deletion.reparented, vec![leaf]);
        assert_eq!(scene.node(leaf).unwrap().parent_edge_id, Some(outer));
        assert!(scene.edge(inner).is_none());
        assert!(scene
            .nodes()
            .all(|node| node.parent_edge_id.map_or(true, |id| scene.edge(id).is_some())));
    }
}
