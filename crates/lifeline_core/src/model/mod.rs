//! Timeline domain model.
//!
//! # Responsibility
//! - Define events (nodes), branches (edges) and birth details.
//! - Define the persisted `TimelineData` document and its defaults.
//! - Own the validation rules every mutation path shares.
//!
//! # Invariants
//! - Every node and edge is identified by a stable UUID, never by coordinates.
//! - `0 <= node.age <= age_max`.
//! - `edge.start_age < edge.end_age <= age_max`.

pub mod document;
pub mod edge;
pub mod node;
pub mod sphere;
pub mod validation;
