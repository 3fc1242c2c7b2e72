//! Use-case services over the timeline core.
//!
//! # Responsibility
//! - Drive one interactive editing session (`TimelineSession`).
//! - Load and persist session documents through a repository.
//! - Schedule debounced autosaves.

pub mod autosave;
pub mod session;
pub mod timeline_service;

pub use autosave::AutosaveScheduler;
pub use session::{
    Confirm, CreatedNode, PlacementNotice, PointerTarget, TimelineSession, DEFAULT_VIEWPORT,
};
pub use timeline_service::{SaveOutcome, ServiceError, ServiceResult, TimelineService};
