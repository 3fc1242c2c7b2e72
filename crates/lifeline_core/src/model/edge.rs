//! Branch model: an alternate vertical line growing from one event.

use crate::model::node::NodeId;
use crate::model::validation::{validate_branch_range, ValidationError};
use uuid::Uuid;

/// Stable branch identifier.
pub type EdgeId = Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    /// World x of the branch line.
    pub x: f64,
    pub start_age: f64,
    pub end_age: f64,
    /// CSS colour inherited from the origin event's sphere.
    pub color: String,
    /// Event the branch grows from.
    pub node_id: NodeId,
}

impl Edge {
    pub fn new(node_id: NodeId, x: f64, start_age: f64, end_age: f64, color: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            start_age,
            end_age,
            color: color.to_string(),
            node_id,
        }
    }

    pub fn length(&self) -> f64 {
        self.end_age - self.start_age
    }

    pub fn covers(&self, age: f64) -> bool {
        age >= self.start_age && age <= self.end_age
    }

    pub fn validate(&self, age_max: f64) -> Result<(), ValidationError> {
        validate_branch_range(self.start_age, self.end_age, age_max)
    }
}

#[cfg(test)]
mod tests {
    use super::Edge;
    use uuid::Uuid;

    #[test]
    fn covers_is_inclusive() {
        let edge = Edge::new(Uuid::new_v4(), 2200.0, 20.0, 25.0, "#7dd3fc");
        assert!(edge.covers(20.0));
        assert!(edge.covers(25.0));
        assert!(!edge.covers(25.5));
        assert_eq!(edge.length(), 5.0);
    }
}
