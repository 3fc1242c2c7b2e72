//! Bulk event import from `age, label` text.
//!
//! # Responsibility
//! - Parse one event per line, collecting per-line errors.
//! - Validate ages against the target line (main axis or a selected branch).
//! - Turn a clean batch into an insertion plan, stretching the branch when
//!   events fall past its end.
//!
//! # Invariants
//! - Line numbers are 1-based and count blank lines.
//! - A batch with any hard error inserts nothing.
//! - Events past a branch end are soft: they need the branch extended first.

use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Node, NodeDraft, NodeId};
use crate::model::sphere::Sphere;
use crate::model::validation::{parse_age, ValidationError};
use crate::scene::{SceneError, SceneResult, SceneStore};
use log::info;

const SEPARATORS: [char; 3] = [',', ';', ':'];

/// One non-blank input line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBulkEvent {
    pub line: usize,
    pub raw: String,
    pub age: Option<f64>,
    pub label: Option<String>,
    pub error: Option<String>,
    pub needs_extension: bool,
}

impl ParsedBulkEvent {
    fn failed(line: usize, raw: &str, message: &str) -> Self {
        Self {
            line,
            raw: raw.to_string(),
            age: None,
            label: None,
            error: Some(line_error(line, message)),
            needs_extension: false,
        }
    }
}

fn line_error(line: usize, message: &str) -> String {
    format!("Line {line}: {message}")
}

/// Parses `age<sep>label` lines where `<sep>` is the first of `,` `;` `:`.
pub fn parse_bulk_events(text: &str) -> Vec<ParsedBulkEvent> {
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            let Some(split) = trimmed.find(SEPARATORS) else {
                return Some(ParsedBulkEvent::failed(
                    line,
                    raw,
                    "missing separator; use \",\", \";\" or \":\"",
                ));
            };
            let age_part = trimmed[..split].trim();
            let label_part = trimmed[split + 1..].trim();
            if age_part.is_empty() || label_part.is_empty() {
                return Some(ParsedBulkEvent::failed(
                    line,
                    raw,
                    "age and label are required",
                ));
            }
            let Ok(age) = parse_age(age_part) else {
                return Some(ParsedBulkEvent::failed(line, raw, "age is not a number"));
            };
            Some(ParsedBulkEvent {
                line,
                raw: raw.to_string(),
                age: Some(age),
                label: Some(label_part.to_string()),
                error: None,
                needs_extension: false,
            })
        })
        .collect()
}

/// Outcome of range-checking a parsed batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub needs_extension: bool,
    /// Branch end needed to hold every event (the current end when none is needed).
    pub max_required_age: f64,
}

/// Checks ages against the selected branch, or `[0, age_max]` without one.
///
/// Lines that already carry an error are skipped. Range errors and
/// `needs_extension` are recorded on the events in place.
pub fn validate_bulk_events(
    events: &mut [ParsedBulkEvent],
    age_max: f64,
    selected: Option<&Edge>,
) -> BulkValidation {
    let mut errors = Vec::new();
    let mut needs_extension = false;
    let mut max_required_age = selected.map_or(age_max, |edge| edge.end_age);

    for event in events.iter_mut() {
        let Some(age) = event.age.filter(|_| event.error.is_none()) else {
            continue;
        };
        let problem = match selected {
            Some(edge) if age < edge.start_age => Some(format!(
                "age {age} is before the branch start ({})",
                edge.start_age
            )),
            Some(_) if age > age_max => Some(format!("age {age} is past the maximum age {age_max}")),
            Some(edge) if age > edge.end_age => {
                event.needs_extension = true;
                needs_extension = true;
                max_required_age = max_required_age.max(age);
                None
            }
            None if age < 0.0 || age > age_max => {
                Some(format!("age {age} must be between 0 and {age_max}"))
            }
            _ => None,
        };
        if let Some(problem) = problem {
            let message = line_error(event.line, &problem);
            event.error = Some(message.clone());
            errors.push(message);
        }
    }

    BulkValidation {
        valid: errors.is_empty(),
        errors,
        needs_extension,
        max_required_age,
    }
}

/// Ready-to-apply import batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPlan {
    pub drafts: Vec<NodeDraft>,
    /// Target branch; `None` inserts on the main axis.
    pub branch: Option<EdgeId>,
    pub x: f64,
    /// New branch end to apply before inserting, when events run past it.
    pub extend_to: Option<f64>,
}

impl BulkPlan {
    pub fn needs_extension(&self) -> bool {
        self.extend_to.is_some()
    }
}

/// Parses and validates `text` for insertion on `selected` (or the main axis).
///
/// # Errors
/// - `BulkLines` with every parse and range error, in line order.
/// - `EmptyBulkImport` when nothing remains to insert.
pub fn prepare_bulk_import(
    scene: &SceneStore,
    text: &str,
    selected: Option<EdgeId>,
) -> SceneResult<BulkPlan> {
    let edge = match selected {
        Some(edge_id) => Some(scene.edge(edge_id).ok_or(SceneError::EdgeNotFound(edge_id))?),
        None => None,
    };

    let mut events = parse_bulk_events(text);
    let validation = validate_bulk_events(&mut events, scene.age_max(), edge);

    let errors: Vec<String> = events
        .iter()
        .filter_map(|event| event.error.clone())
        .collect();
    if !errors.is_empty() {
        return Err(ValidationError::BulkLines(errors).into());
    }
    if events.is_empty() {
        return Err(ValidationError::EmptyBulkImport.into());
    }

    let sphere = selected.and_then(|edge_id| branch_sphere(scene, edge_id));
    let drafts = events
        .iter()
        .filter_map(|event| {
            let mut draft = NodeDraft::new(event.age?, event.label.clone()?);
            draft.sphere = sphere;
            Some(draft)
        })
        .collect();

    Ok(BulkPlan {
        drafts,
        branch: selected,
        x: edge.map_or(scene.main_axis_x(), |edge| edge.x),
        extend_to: edge
            .filter(|_| validation.needs_extension)
            .map(|_| validation.max_required_age),
    })
}

/// Applies a plan: stretches the branch if required, then inserts every event.
///
/// Either every event lands or the scene is left as it was.
pub fn apply_bulk_plan(scene: &mut SceneStore, plan: &BulkPlan) -> SceneResult<Vec<NodeId>> {
    let before = scene.snapshot();
    let result = insert_batch(scene, plan);
    match result {
        Ok(ids) => {
            info!(
                "event=bulk_import module=bulk status=ok count={} extended={}",
                ids.len(),
                plan.needs_extension()
            );
            Ok(ids)
        }
        Err(err) => {
            scene.restore(&before);
            Err(err)
        }
    }
}

fn insert_batch(scene: &mut SceneStore, plan: &BulkPlan) -> SceneResult<Vec<NodeId>> {
    if let (Some(edge_id), Some(end_age)) = (plan.branch, plan.extend_to) {
        crate::branch::extend_branch_to(scene, edge_id, end_age)?;
    }
    let mut ids = Vec::with_capacity(plan.drafts.len());
    for draft in &plan.drafts {
        let draft = draft.validated(scene.age_max())?;
        let node = Node::from_draft(&draft, plan.x, plan.branch);
        ids.push(scene.insert_node(node)?);
    }
    Ok(ids)
}

/// Sphere new bulk events inherit on `edge_id`.
pub fn branch_sphere(scene: &SceneStore, edge_id: EdgeId) -> Option<Sphere> {
    scene
        .edge(edge_id)
        .and_then(|edge| scene.node(edge.node_id))
        .and_then(|origin| origin.sphere)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;

    #[test]
    fn parses_each_separator() {
        let parsed = parse_bulk_events("18, Graduated\n22.5: First job\n30; Moved city");
        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().all(|event| event.error.is_none()));
        let ages: Vec<f64> = parsed.iter().filter_map(|event| event.age).collect();
        assert_eq!(ages, vec![18.0, 22.5, 30.0]);
        assert_eq!(parsed[1].label.as_deref(), Some("First job"));
    }

    #[test]
    fn earliest_separator_wins_and_blank_lines_count() {
        let parsed = parse_bulk_events("\n  \n20; Job, part time");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].line, 3);
        assert_eq!(parsed[0].label.as_deref(), Some("Job, part time"));
    }

    #[test]
    fn line_errors_name_the_problem() {
        let parsed = parse_bulk_events("10 bad line\n, no age\nabc: label");
        assert_eq!(parsed.len(), 3);
        assert!(parsed[0].error.as_deref().unwrap().contains("separator"));
        assert!(parsed[1].error.as_deref().unwrap().contains("required"));
        assert!(parsed[2].error.as_deref().unwrap().starts_with("Line 3:"));
    }

    #[test]
    fn decimal_comma_needs_another_separator() {
        // The first comma splits the line, so "22,5" cannot carry a label with a comma separator.
        let parsed = parse_bulk_events("22,5: Job");
        assert_eq!(parsed[0].age, Some(22.0));
        assert_eq!(parsed[0].label.as_deref(), Some("5: Job"));
    }

    #[test]
    fn branch_validation_splits_hard_and_soft() {
        let edge = Edge::new(uuid::Uuid::new_v4(), 2200.0, 20.0, 30.0, "#7dd3fc");
        let mut events = parse_bulk_events("15, Early\n25, Inside\n34, Late\n38, Later");
        let validation = validate_bulk_events(&mut events, 100.0, Some(&edge));
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].starts_with("Line 1:"));
        assert!(validation.needs_extension);
        assert_eq!(validation.max_required_age, 38.0);
        assert!(events[2].needs_extension);
        assert!(!events[1].needs_extension);
    }

    #[test]
    fn main_axis_validation_uses_age_range() {
        let mut events = parse_bulk_events("101, Too late\n50, Fine");
        let validation = validate_bulk_events(&mut events, 100.0, None);
        assert_eq!(validation.errors.len(), 1);
        assert!(!validation.needs_extension);
        assert_eq!(validation.max_required_age, 100.0);
    }

    #[test]
    fn prepare_rejects_batches_with_any_error() {
        let scene = SceneStore::new(TimelineConfig::default());
        let err = prepare_bulk_import(&scene, "18, ok\nbroken", None).unwrap_err();
        match err {
            SceneError::Validation(ValidationError::BulkLines(lines)) => {
                assert_eq!(lines.len(), 1);
                assert!(lines[0].starts_with("Line 2:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            prepare_bulk_import(&scene, "\n\n", None).unwrap_err(),
            SceneError::Validation(ValidationError::EmptyBulkImport)
        );
    }

    #[test]
    fn plan_on_main_axis_inserts_every_event() {
        let mut scene = SceneStore::new(TimelineConfig::default());
        let plan = prepare_bulk_import(&scene, "18, A\n22, B", None).unwrap();
        assert!(!plan.needs_extension());
        let ids = apply_bulk_plan(&mut scene, &plan).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(scene.nodes().all(|node| node.x == 2000.0 && node.parent_edge_id.is_none()));
    }
}
