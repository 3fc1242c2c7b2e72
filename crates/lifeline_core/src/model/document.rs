//! Persisted timeline document (the only shape crossing into storage).
//!
//! # Responsibility
//! - Define the camelCase wire format read once per session and upserted on save.
//! - Apply field defaults for documents written by older clients.
//!
//! # Invariants
//! - Unknown fields are ignored; missing ones default
//!   (`sphere -> other`, `isDecision -> false`, `x -> main axis`).
//! - `parentX` is derived from the parent branch on write; `parentEdgeId`
//!   is authoritative on read when present.

use crate::config::{DEFAULT_AGE_MAX, DEFAULT_CURRENT_AGE};
use crate::model::sphere::Sphere;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fallback label for persisted events that lost theirs.
pub const DEFAULT_EVENT_LABEL: &str = "Event";

/// Optional facts attached to age zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BirthDetails {
    pub fn is_empty(&self) -> bool {
        [&self.date, &self.place, &self.notes]
            .into_iter()
            .all(|field| field.as_deref().map_or(true, |text| text.trim().is_empty()))
    }
}

/// Persisted event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub age: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_edge_id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<Sphere>,
    #[serde(default)]
    pub is_decision: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
}

/// Persisted branch record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    pub x: f64,
    pub start_age: f64,
    pub end_age: f64,
    #[serde(default)]
    pub color: String,
    pub node_id: String,
}

/// Whole-timeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
    #[serde(default = "default_current_age")]
    pub current_age: f64,
    #[serde(default = "default_age_max")]
    pub age_max: f64,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub birth_details: BirthDetails,
    #[serde(default)]
    pub selected_periodization: Option<String>,
}

impl Default for TimelineData {
    fn default() -> Self {
        Self {
            current_age: DEFAULT_CURRENT_AGE,
            age_max: DEFAULT_AGE_MAX,
            nodes: Vec::new(),
            edges: Vec::new(),
            birth_details: BirthDetails::default(),
            selected_periodization: None,
        }
    }
}

impl TimelineData {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(text).map_err(|err| DocumentError::Malformed(err.to_string()))
    }

    /// Whether the document carries anything worth persisting.
    pub fn has_content(&self) -> bool {
        !self.nodes.is_empty()
            || !self.edges.is_empty()
            || !self.birth_details.is_empty()
            || self.selected_periodization.is_some()
    }
}

fn default_current_age() -> f64 {
    DEFAULT_CURRENT_AGE
}

fn default_age_max() -> f64 {
    DEFAULT_AGE_MAX
}

/// Document could not be turned into a consistent scene.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// JSON syntax or shape error.
    Malformed(String),
    /// Record id is not a UUID.
    InvalidId { kind: &'static str, value: String },
    /// Two records share one id.
    DuplicateId { kind: &'static str, value: String },
    /// Branch points at an event that does not exist.
    DanglingOrigin { edge_id: String, node_id: String },
    /// Parent references form a loop.
    Cycle { node_id: String },
    /// Record violates a range invariant.
    Invalid {
        kind: &'static str,
        id: String,
        source: ValidationError,
    },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed timeline document: {message}"),
            Self::InvalidId { kind, value } => write!(f, "invalid {kind} id `{value}`"),
            Self::DuplicateId { kind, value } => write!(f, "duplicate {kind} id `{value}`"),
            Self::DanglingOrigin { edge_id, node_id } => write!(
                f,
                "branch {edge_id} grows from missing event {node_id}"
            ),
            Self::Cycle { node_id } => write!(f, "event {node_id} is its own ancestor"),
            Self::Invalid { kind, id, source } => write!(f, "invalid {kind} {id}: {source}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BirthDetails, TimelineData};

    #[test]
    fn missing_fields_take_defaults() {
        let data = TimelineData::from_json(
            r#"{"nodes":[{"id":"n","age":3}],"edges":[],"unknown":true}"#,
        )
        .unwrap();
        assert_eq!(data.current_age, 25.0);
        assert_eq!(data.age_max, 100.0);
        let node = &data.nodes[0];
        assert_eq!(node.x, None);
        assert_eq!(node.sphere, None);
        assert!(!node.is_decision);
        assert!(node.label.is_empty());
    }

    #[test]
    fn birth_details_with_blank_fields_are_empty() {
        let birth = BirthDetails {
            place: Some("  ".to_string()),
            ..BirthDetails::default()
        };
        assert!(birth.is_empty());
        assert!(!TimelineData::default().has_content());
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let mut data = TimelineData::default();
        data.selected_periodization = Some("erikson".to_string());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["currentAge"], 25.0);
        assert_eq!(json["ageMax"], 100.0);
        assert_eq!(json["selectedPeriodization"], "erikson");
        assert!(json["birthDetails"].as_object().unwrap().is_empty());
    }
}
