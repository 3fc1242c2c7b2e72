//! In-memory scene: the single source of truth for one timeline.
//!
//! # Responsibility
//! - Own events, branches, birth details, transform and age bounds.
//! - Maintain the id-keyed adjacency index (branches per event, events per branch).
//! - Convert to and from the persisted `TimelineData` document.
//!
//! # Invariants
//! - Every mutation validates before it writes; failures leave the scene untouched.
//! - The adjacency index always mirrors `parent_edge_id` / `node_id` fields.
//! - Parent links never form a cycle.

mod adjacency;
mod store;

pub use store::{NodeRemoval, SceneStore};

use crate::model::document::DocumentError;
use crate::model::edge::EdgeId;
use crate::model::node::NodeId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SceneResult<T> = Result<T, SceneError>;

/// Scene mutation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Input rejected by a validation rule.
    Validation(ValidationError),
    /// Referenced event does not exist.
    NodeNotFound(NodeId),
    /// Referenced branch does not exist.
    EdgeNotFound(EdgeId),
    /// Re-parenting would make an event its own ancestor.
    CycleDetected(NodeId),
    /// The user declined a confirmation prompt.
    Cancelled,
    /// Document could not be loaded into the scene.
    Document(DocumentError),
}

impl Display for SceneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NodeNotFound(id) => write!(f, "event not found: {id}"),
            Self::EdgeNotFound(id) => write!(f, "branch not found: {id}"),
            Self::CycleDetected(id) => write!(f, "event {id} would become its own ancestor"),
            Self::Cancelled => write!(f, "cancelled by user"),
            Self::Document(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SceneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Document(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SceneError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DocumentError> for SceneError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}
