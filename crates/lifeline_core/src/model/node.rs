//! Timeline event model.

use crate::model::edge::EdgeId;
use crate::model::sphere::Sphere;
use crate::model::validation::{normalize_label, validate_age, ValidationError};
use uuid::Uuid;

/// Stable event identifier.
pub type NodeId = Uuid;

/// One event on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Age in years; `0 <= age <= age_max`.
    pub age: f64,
    /// World x of the event dot.
    pub x: f64,
    /// Branch this event hangs from. `None` means the main axis.
    pub parent_edge_id: Option<EdgeId>,
    pub label: String,
    pub notes: String,
    pub sphere: Option<Sphere>,
    pub is_decision: bool,
    pub icon_id: Option<String>,
}

impl Node {
    /// Builds an event from validated draft content at `x`.
    pub fn from_draft(draft: &NodeDraft, x: f64, parent_edge_id: Option<EdgeId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            age: draft.age,
            x,
            parent_edge_id,
            label: draft.label.clone(),
            notes: draft.notes.clone(),
            sphere: draft.sphere,
            is_decision: draft.is_decision,
            icon_id: draft.icon_id.clone(),
        }
    }

    pub fn validate(&self, age_max: f64) -> Result<(), ValidationError> {
        validate_age(self.age, age_max)?;
        normalize_label(&self.label)?;
        Ok(())
    }

    /// Overwrites user-editable content, keeping identity and position.
    pub fn apply_draft(&mut self, draft: &NodeDraft) {
        self.age = draft.age;
        self.label = draft.label.clone();
        self.notes = draft.notes.clone();
        self.sphere = draft.sphere;
        self.is_decision = draft.is_decision;
        self.icon_id = draft.icon_id.clone();
    }
}

/// Editable event content as submitted by a form or importer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeDraft {
    pub age: f64,
    pub label: String,
    pub notes: String,
    pub sphere: Option<Sphere>,
    pub is_decision: bool,
    pub icon_id: Option<String>,
}

impl NodeDraft {
    pub fn new(age: f64, label: impl Into<String>) -> Self {
        Self {
            age,
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.sphere = Some(sphere);
        self
    }

    /// Validates age range and label, returning the normalized draft.
    pub fn validated(&self, age_max: f64) -> Result<NodeDraft, ValidationError> {
        let label = normalize_label(&self.label)?;
        let age = validate_age(self.age, age_max)?;
        Ok(NodeDraft {
            age,
            label,
            notes: self.notes.clone(),
            sphere: self.sphere,
            is_decision: self.is_decision,
            icon_id: self
                .icon_id
                .as_ref()
                .map(|icon| icon.trim().to_string())
                .filter(|icon| !icon.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NodeDraft;
    use crate::model::validation::ValidationError;

    #[test]
    fn validated_draft_trims_label_and_drops_blank_icon() {
        let mut draft = NodeDraft::new(25.0, "  Graduated ");
        draft.icon_id = Some("  ".to_string());
        let validated = draft.validated(100.0).unwrap();
        assert_eq!(validated.label, "Graduated");
        assert_eq!(validated.icon_id, None);
    }

    #[test]
    fn validated_draft_rejects_out_of_range_age() {
        let err = NodeDraft::new(120.0, "Too old").validated(100.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::AgeOutOfRange {
                age: 120.0,
                age_max: 100.0
            }
        );
    }
}
