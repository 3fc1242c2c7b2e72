//! One interactive editing session over a timeline scene.
//!
//! # Responsibility
//! - Route user intents (forms, pointer, wheel, keyboard) into scene mutations.
//! - Commit history snapshots at user-visible commit points.
//! - Track selection and mark the document dirty for autosave.
//!
//! # Invariants
//! - A baseline snapshot is committed when the session opens, so the first
//!   user change can be undone.
//! - Failed mutations leave scene, history and selection untouched.
//! - Stale selections and lookup misses are no-ops logged with `status=noop`.
//! - User text (labels, notes) never reaches the log.

use crate::branch::{self, BranchDeletion};
use crate::bulk::{apply_bulk_plan, prepare_bulk_import, BulkPlan};
use crate::config::{ExportConfig, Settings, TimelineConfig};
use crate::export::{self, ExportResult, IconCatalog, ImageFetcher, SvgDocument};
use crate::geometry::{initial_transform, screen_to_world, Transform, Viewport};
use crate::history::HistoryManager;
use crate::interaction::{
    DragController, KeyInput, PanZoomController, PointerId, PointerInput, Shortcut,
};
use crate::model::document::{BirthDetails, TimelineData};
use crate::model::edge::EdgeId;
use crate::model::node::{Node, NodeDraft, NodeId};
use crate::note::{format_event_as_note, NoteError, NoteSink, SavedNote};
use crate::scene::{SceneError, SceneResult, SceneStore};
use crate::service::autosave::AutosaveScheduler;
use log::{debug, info};
use std::time::Instant;

/// Canvas size assumed until the front end reports its own.
pub const DEFAULT_VIEWPORT: Viewport = Viewport::new(1280.0, 800.0);

/// Interactive yes/no prompt.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Why a new event did not land where the form asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementNotice {
    /// The selected branch does not span the event's age; it went to the main axis.
    OutsideBranch {
        edge_id: EdgeId,
        start_age: f64,
        end_age: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatedNode {
    pub id: NodeId,
    pub parent_edge_id: Option<EdgeId>,
    pub notice: Option<PlacementNotice>,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Node(NodeId),
}

pub struct TimelineSession {
    scene: SceneStore,
    history: HistoryManager,
    pan_zoom: PanZoomController,
    drag: DragController,
    autosave: AutosaveScheduler,
    export: ExportConfig,
    viewport: Viewport,
    selected_node: Option<NodeId>,
    selected_edge: Option<EdgeId>,
}

impl TimelineSession {
    /// Opens a session over `scene` and commits the baseline snapshot.
    pub fn new(scene: SceneStore, export: ExportConfig) -> Self {
        let config = *scene.config();
        let mut history = HistoryManager::new(config.max_history);
        history.commit(scene.snapshot());
        let mut session = Self {
            pan_zoom: PanZoomController::new(config),
            drag: DragController::new(),
            autosave: AutosaveScheduler::new(config.save_debounce()),
            viewport: DEFAULT_VIEWPORT,
            selected_node: None,
            selected_edge: None,
            history,
            export,
            scene,
        };
        session.reset_view();
        info!(
            "event=session_open module=session status=ok nodes={} edges={}",
            session.scene.node_count(),
            session.scene.edge_count()
        );
        session
    }

    /// Opens a session on a persisted document.
    pub fn from_document(data: &TimelineData, settings: &Settings) -> SceneResult<Self> {
        let scene = SceneStore::from_document(data, settings.timeline)?;
        Ok(Self::new(scene, settings.export.clone()))
    }

    pub fn empty(settings: &Settings) -> Self {
        Self::new(SceneStore::new(settings.timeline), settings.export.clone())
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    pub fn config(&self) -> &TimelineConfig {
        self.scene.config()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.export
    }

    pub fn to_document(&self) -> TimelineData {
        self.scene.to_document()
    }

    pub fn transform(&self) -> Transform {
        self.scene.transform()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Centres the main axis and the age worth looking at.
    ///
    /// That is the current age once the timeline has events or a non-default
    /// current age, otherwise birth.
    pub fn reset_view(&mut self) {
        let config = *self.scene.config();
        let interesting = !self.scene.is_empty()
            || self.scene.current_age() != config.default_current_age;
        let target_age = if interesting {
            self.scene.current_age()
        } else {
            0.0
        };
        let transform = initial_transform(self.viewport, target_age, self.scene.age_max(), &config);
        self.scene.set_transform(transform);
    }

    // --- selection ---------------------------------------------------------

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected_node
    }

    pub fn selected_edge(&self) -> Option<EdgeId> {
        self.selected_edge
    }

    /// Selects an event; unknown ids clear the selection.
    pub fn select_node(&mut self, id: NodeId) -> bool {
        if self.scene.node(id).is_none() {
            debug!(
                "event=select_node module=session status=noop reason=node_missing node_id={}",
                id
            );
            self.selected_node = None;
            return false;
        }
        self.selected_node = Some(id);
        true
    }

    /// Selects a branch and returns its length for the length editor.
    pub fn select_edge(&mut self, id: EdgeId) -> Option<f64> {
        let length = branch::branch_length(&self.scene, id);
        if length.is_none() {
            debug!(
                "event=select_edge module=session status=noop reason=edge_missing edge_id={}",
                id
            );
        }
        self.selected_edge = length.map(|_| id);
        length
    }

    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_edge = None;
    }

    // --- events ------------------------------------------------------------

    /// Creates an event from form input.
    ///
    /// With a selected branch that spans the age, the event lands on it and
    /// inherits the origin's sphere when none was chosen. Otherwise it lands
    /// on the main axis, with a notice when a branch was selected.
    pub fn create_node(
        &mut self,
        draft: &NodeDraft,
        selected_branch: Option<EdgeId>,
    ) -> SceneResult<CreatedNode> {
        let mut draft = draft.validated(self.scene.age_max())?;
        let mut notice = None;
        let mut x = self.scene.main_axis_x();
        let mut parent = None;

        if let Some(edge_id) = selected_branch {
            match self.scene.edge(edge_id) {
                Some(edge) if edge.covers(draft.age) => {
                    x = edge.x;
                    parent = Some(edge_id);
                    if draft.sphere.is_none() {
                        draft.sphere = crate::bulk::branch_sphere(&self.scene, edge_id);
                    }
                }
                Some(edge) => {
                    notice = Some(PlacementNotice::OutsideBranch {
                        edge_id,
                        start_age: edge.start_age,
                        end_age: edge.end_age,
                    });
                }
                None => debug!(
                    "event=node_create module=session status=noop reason=edge_missing edge_id={}",
                    edge_id
                ),
            }
        }

        let id = self.scene.insert_node(Node::from_draft(&draft, x, parent))?;
        self.commit();
        info!(
            "event=node_create module=session status=ok node_id={} on_branch={}",
            id,
            parent.is_some()
        );
        Ok(CreatedNode {
            id,
            parent_edge_id: parent,
            notice,
        })
    }

    /// Replaces an event's content; position and parent line stay.
    pub fn update_node(&mut self, id: NodeId, draft: &NodeDraft) -> SceneResult<()> {
        self.scene.update_node_content(id, draft)?;
        self.commit();
        info!("event=node_update module=session status=ok node_id={}", id);
        Ok(())
    }

    /// Deletes an event and the branches growing from it.
    pub fn delete_node(&mut self, id: NodeId) -> SceneResult<()> {
        let removal = self.scene.remove_node(id)?;
        if self.selected_node == Some(id) {
            self.selected_node = None;
        }
        if let Some(selected) = self.selected_edge {
            if removal.removed_edges.iter().any(|edge| edge.id == selected) {
                self.selected_edge = None;
            }
        }
        self.commit();
        info!(
            "event=node_delete module=session status=ok node_id={} removed_edges={} orphaned={}",
            id,
            removal.removed_edges.len(),
            removal.orphaned.len()
        );
        Ok(())
    }

    /// Removes every event and branch after confirmation.
    pub fn clear_all(&mut self, confirm: &dyn Confirm) -> SceneResult<()> {
        if !confirm.confirm("Delete all events and branches?") {
            return Err(SceneError::Cancelled);
        }
        self.scene.clear();
        self.clear_selection();
        self.commit();
        info!("event=timeline_clear module=session status=ok");
        Ok(())
    }

    pub fn set_birth_details(&mut self, birth: BirthDetails) {
        self.scene.set_birth_details(birth);
        self.commit();
    }

    pub fn set_current_age(&mut self, age: f64) -> SceneResult<()> {
        self.scene.set_current_age(age)?;
        self.touch();
        Ok(())
    }

    pub fn set_selected_periodization(&mut self, periodization: Option<String>) {
        self.scene.set_selected_periodization(periodization);
        self.touch();
    }

    // --- branches ----------------------------------------------------------

    pub fn extend_branch(&mut self, node_id: NodeId, years: f64) -> SceneResult<EdgeId> {
        let edge_id = branch::extend_branch(&mut self.scene, node_id, years)?;
        self.selected_edge = Some(edge_id);
        self.commit();
        Ok(edge_id)
    }

    pub fn update_branch_length(&mut self, edge_id: EdgeId, years: f64) -> SceneResult<()> {
        branch::update_branch_length(&mut self.scene, edge_id, years)?;
        self.commit();
        Ok(())
    }

    /// Deletes a branch after confirmation, moving its events to the ancestor line.
    pub fn delete_branch(
        &mut self,
        edge_id: EdgeId,
        confirm: &dyn Confirm,
    ) -> SceneResult<BranchDeletion> {
        if self.scene.edge(edge_id).is_none() {
            return Err(SceneError::EdgeNotFound(edge_id));
        }
        if !confirm.confirm("Delete this branch? Its events move to the parent line.") {
            return Err(SceneError::Cancelled);
        }
        let deletion = branch::delete_branch(&mut self.scene, edge_id)?;
        if self.selected_edge == Some(edge_id) {
            self.selected_edge = None;
        }
        self.commit();
        Ok(deletion)
    }

    // --- bulk import -------------------------------------------------------

    pub fn prepare_bulk_import(
        &self,
        text: &str,
        selected_branch: Option<EdgeId>,
    ) -> SceneResult<BulkPlan> {
        prepare_bulk_import(&self.scene, text, selected_branch)
    }

    /// Inserts a prepared batch as one undo step.
    ///
    /// A plan that stretches its branch needs confirmation first.
    pub fn apply_bulk_import(
        &mut self,
        plan: &BulkPlan,
        confirm: &dyn Confirm,
    ) -> SceneResult<Vec<NodeId>> {
        if let Some(end_age) = plan.extend_to {
            let message = format!("Extend the branch to age {end_age} and add all events?");
            if !confirm.confirm(&message) {
                return Err(SceneError::Cancelled);
            }
        }
        let ids = apply_bulk_plan(&mut self.scene, plan)?;
        self.commit();
        Ok(ids)
    }

    /// Prepares and applies `text` in one step.
    pub fn bulk_import(
        &mut self,
        text: &str,
        selected_branch: Option<EdgeId>,
        confirm: &dyn Confirm,
    ) -> SceneResult<Vec<NodeId>> {
        let plan = self.prepare_bulk_import(text, selected_branch)?;
        self.apply_bulk_import(&plan, confirm)
    }

    // --- history -----------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            debug!("event=undo module=session status=noop");
            return false;
        };
        self.scene.restore(state);
        self.after_restore();
        debug!("event=undo module=session status=ok");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            debug!("event=redo module=session status=noop");
            return false;
        };
        self.scene.restore(state);
        self.after_restore();
        debug!("event=redo module=session status=ok");
        true
    }

    // --- input -------------------------------------------------------------

    /// Pointer pressed. Presses on events start a drag, anything else pans.
    pub fn pointer_down(&mut self, input: PointerInput, target: PointerTarget) {
        if let PointerTarget::Node(node_id) = target {
            let world = screen_to_world(input.position, &self.scene.transform());
            if self.drag.begin(&self.scene, node_id, world) {
                self.selected_node = Some(node_id);
                return;
            }
        }
        self.pan_zoom.pointer_down(input);
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> SceneResult<()> {
        if self.drag.dragging().is_some() {
            let world = screen_to_world(input.position, &self.scene.transform());
            if self.drag.update(&mut self.scene, world)?.is_some() {
                self.touch();
            }
            return Ok(());
        }
        if let Some(transform) = self.pan_zoom.pointer_move(input, &self.scene.transform()) {
            self.scene.set_transform(transform);
        }
        Ok(())
    }

    /// Pointer released. A drag that moved its event commits one snapshot.
    pub fn pointer_up(&mut self, id: PointerId) {
        if self.drag.dragging().is_some() {
            if let Some(outcome) = self.drag.finish(&self.scene) {
                if outcome.moved() {
                    self.commit();
                }
            }
            return;
        }
        self.pan_zoom.pointer_up(id);
    }

    pub fn pointer_cancel(&mut self) {
        self.drag.cancel();
        self.pan_zoom.reset();
    }

    pub fn wheel(&mut self, delta_y: f64) {
        let transform = self
            .pan_zoom
            .wheel(delta_y, self.viewport, &self.scene.transform());
        self.scene.set_transform(transform);
    }

    /// Applies a keyboard shortcut; returns the one that fired.
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(input)?;
        match shortcut {
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::DeleteSelected => match self.selected_node {
                Some(id) => {
                    if let Err(err) = self.delete_node(id) {
                        debug!(
                            "event=key_delete module=session status=noop node_id={} error={}",
                            id, err
                        );
                        self.selected_node = None;
                    }
                }
                None => debug!("event=key_delete module=session status=noop reason=no_selection"),
            },
            Shortcut::ClearSelection => self.clear_selection(),
        }
        Some(shortcut)
    }

    // --- export & notes ----------------------------------------------------

    pub fn export_json(&self) -> ExportResult<String> {
        export::export_json(&self.scene.to_document())
    }

    pub fn export_svg(&self, icons: &dyn IconCatalog) -> SvgDocument {
        export::render_svg(&self.scene, icons, &self.export)
    }

    pub fn export_png(
        &self,
        icons: &dyn IconCatalog,
        fetcher: &dyn ImageFetcher,
    ) -> ExportResult<Vec<u8>> {
        export::export_png(&self.scene, icons, fetcher, &self.export)
    }

    pub fn export_pdf(
        &self,
        icons: &dyn IconCatalog,
        fetcher: &dyn ImageFetcher,
        header_lines: &[String],
    ) -> ExportResult<Vec<u8>> {
        export::export_pdf(&self.scene, icons, fetcher, &self.export, header_lines)
    }

    /// Files one event as a note in the external note store.
    pub fn save_event_as_note(
        &self,
        node_id: NodeId,
        sink: &mut dyn NoteSink,
        topic_id: Option<&str>,
        topic_title: Option<&str>,
    ) -> Result<SavedNote, NoteError> {
        let node = self
            .scene
            .node(node_id)
            .ok_or_else(|| NoteError::NodeNotFound(node_id.to_string()))?;
        let note = format_event_as_note(node);
        let note_id = sink
            .create_note(&note, topic_id, topic_title)
            .map_err(NoteError::Sink)?;
        info!(
            "event=note_create module=session status=ok node_id={} note_id={}",
            node_id, note_id
        );
        Ok(SavedNote { note_id, note })
    }

    // --- autosave ----------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    /// Consumes a due autosave at `now`.
    pub fn take_autosave_due(&mut self, now: Instant) -> bool {
        self.autosave.take_due(now)
    }

    pub fn mark_saved(&mut self) {
        self.autosave.mark_saved();
    }

    fn commit(&mut self) {
        self.history.commit(self.scene.snapshot());
        self.touch();
    }

    fn touch(&mut self) {
        self.autosave.mark_dirty(Instant::now());
    }

    fn after_restore(&mut self) {
        self.drag.cancel();
        if let Some(id) = self.selected_node {
            if self.scene.node(id).is_none() {
                self.selected_node = None;
            }
        }
        if let Some(id) = self.selected_edge {
            if self.scene.edge(id).is_none() {
                self.selected_edge = None;
            }
        }
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerKind;
    use crate::model::sphere::Sphere;
    use crate::model::validation::ValidationError;
    use crate::note::EventNote;

    fn session() -> TimelineSession {
        TimelineSession::empty(&Settings::default())
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    fn off_axis_event(session: &mut TimelineSession, age: f64) -> NodeId {
        let draft = NodeDraft::new(age, "Moved").with_sphere(Sphere::Place);
        let id = session.create_node(&draft, None).unwrap().id;
        let screen = crate::geometry::world_to_screen(
            crate::geometry::Point::new(2000.0, 0.0),
            &session.transform(),
        );
        let target = crate::geometry::world_to_screen(
            crate::geometry::Point::new(2200.0, 0.0),
            &session.transform(),
        );
        session.pointer_down(
            PointerInput::new(1, PointerKind::Mouse, screen.x, screen.y),
            PointerTarget::Node(id),
        );
        session
            .pointer_move(PointerInput::new(1, PointerKind::Mouse, target.x, target.y))
            .unwrap();
        session.pointer_up(1);
        id
    }

    #[test]
    fn baseline_makes_first_change_undoable() {
        let mut session = session();
        assert!(!session.can_undo());
        session
            .create_node(&NodeDraft::new(25.0, "Graduated"), None)
            .unwrap();
        assert!(session.can_undo());
        assert!(session.undo());
        assert!(session.scene().is_empty());
    }

    #[test]
    fn invalid_draft_changes_nothing() {
        let mut session = session();
        let err = session
            .create_node(&NodeDraft::new(25.0, "   "), None)
            .unwrap_err();
        assert_eq!(err, SceneError::Validation(ValidationError::EmptyLabel));
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_dirty());
    }

    #[test]
    fn branch_that_misses_the_age_sends_event_to_main_axis() {
        let mut session = session();
        let origin = off_axis_event(&mut session, 20.0);
        let edge_id = session.extend_branch(origin, 5.0).unwrap();

        let inside = session
            .create_node(&NodeDraft::new(22.0, "Inside"), Some(edge_id))
            .unwrap();
        assert_eq!(inside.parent_edge_id, Some(edge_id));
        assert_eq!(inside.notice, None);
        let node = session.scene().node(inside.id).unwrap();
        assert_eq!(node.x, 2200.0);
        assert_eq!(node.sphere, Some(Sphere::Place));

        let outside = session
            .create_node(&NodeDraft::new(40.0, "Outside"), Some(edge_id))
            .unwrap();
        assert_eq!(outside.parent_edge_id, None);
        assert!(matches!(
            outside.notice,
            Some(PlacementNotice::OutsideBranch { .. })
        ));
        assert_eq!(session.scene().node(outside.id).unwrap().x, 2000.0);
    }

    #[test]
    fn declined_confirmation_keeps_everything() {
        let mut session = session();
        let origin = off_axis_event(&mut session, 20.0);
        let edge_id = session.extend_branch(origin, 5.0).unwrap();
        let history_len = session.history().len();

        assert_eq!(session.clear_all(&no), Err(SceneError::Cancelled));
        assert_eq!(
            session.delete_branch(edge_id, &no).unwrap_err(),
            SceneError::Cancelled
        );
        assert_eq!(session.history().len(), history_len);
        assert!(session.scene().edge(edge_id).is_some());

        session.clear_all(&yes).unwrap();
        assert!(session.scene().is_empty());
    }

    #[test]
    fn click_without_movement_commits_nothing() {
        let mut session = session();
        let id = session
            .create_node(&NodeDraft::new(30.0, "Still"), None)
            .unwrap()
            .id;
        let before = session.history().len();
        session.pointer_down(
            PointerInput::new(7, PointerKind::Mouse, 10.0, 10.0),
            PointerTarget::Node(id),
        );
        session.pointer_up(7);
        assert_eq!(session.history().len(), before);
    }

    #[test]
    fn delete_key_respects_text_focus() {
        let mut session = session();
        let id = session
            .create_node(&NodeDraft::new(30.0, "Doomed"), None)
            .unwrap()
            .id;
        assert!(session.select_node(id));

        assert_eq!(
            session.handle_key(&KeyInput::new("Delete").in_text_field()),
            None
        );
        assert!(session.scene().node(id).is_some());

        assert_eq!(
            session.handle_key(&KeyInput::new("Delete")),
            Some(Shortcut::DeleteSelected)
        );
        assert!(session.scene().node(id).is_none());
        assert_eq!(session.selected_node(), None);

        session.handle_key(&KeyInput::new("z").with_ctrl().in_text_field());
        assert!(session.scene().node(id).is_some());
    }

    #[test]
    fn undo_drops_selection_of_vanished_branch() {
        let mut session = session();
        let origin = off_axis_event(&mut session, 20.0);
        let edge_id = session.extend_branch(origin, 5.0).unwrap();
        assert_eq!(session.selected_edge(), Some(edge_id));
        session.undo();
        assert_eq!(session.selected_edge(), None);
        assert_eq!(session.select_edge(edge_id), None);
    }

    #[test]
    fn bulk_extension_asks_first() {
        let mut session = session();
        let origin = off_axis_event(&mut session, 20.0);
        let edge_id = session.extend_branch(origin, 5.0).unwrap();

        let err = session
            .bulk_import("21, A\n30, B", Some(edge_id), &no)
            .unwrap_err();
        assert_eq!(err, SceneError::Cancelled);
        assert_eq!(session.scene().node_count(), 1);

        let ids = session
            .bulk_import("21, A\n30, B", Some(edge_id), &yes)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(session.scene().edge(edge_id).unwrap().end_age, 30.0);
    }

    #[test]
    fn wheel_keeps_main_axis_on_screen_x() {
        let mut session = session();
        let before = session.transform();
        let axis_before = before.x + 2000.0 * before.k;
        session.wheel(-120.0);
        let after = session.transform();
        assert!((after.x + 2000.0 * after.k - axis_before).abs() < 1e-9);
        assert!(after.k > before.k);
    }

    #[test]
    fn note_sink_receives_formatted_event() {
        struct Collect(Vec<(String, Option<String>)>);
        impl NoteSink for Collect {
            fn create_note(
                &mut self,
                note: &EventNote,
                topic_id: Option<&str>,
                _topic_title: Option<&str>,
            ) -> Result<String, String> {
                self.0.push((note.title.clone(), topic_id.map(str::to_string)));
                Ok(format!("note-{}", self.0.len()))
            }
        }

        let mut session = session();
        let id = session
            .create_node(&NodeDraft::new(18.0, "Graduated"), None)
            .unwrap()
            .id;
        let mut sink = Collect(Vec::new());
        let saved = session
            .save_event_as_note(id, &mut sink, Some("topic-1"), None)
            .unwrap();
        assert_eq!(saved.note_id, "note-1");
        assert_eq!(saved.note.title, "Graduated");
        assert_eq!(
            sink.0,
            vec![("Graduated".to_string(), Some("topic-1".to_string()))]
        );

        let missing = session.save_event_as_note(uuid::Uuid::new_v4(), &mut sink, None, None);
        assert!(matches!(missing, Err(NoteError::NodeNotFound(_))));
    }
}
