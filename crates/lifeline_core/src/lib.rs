//! Core domain logic for the Lifeline timeline.
//! This crate is the single source of truth for every timeline invariant.

pub mod branch;
pub mod bulk;
pub mod config;
pub mod db;
pub mod export;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod note;
pub mod repo;
pub mod scene;
pub mod service;

pub use config::{ExportConfig, Settings, TimelineConfig};
pub use export::{ExportError, ExportFormat, ExportResult, FetchedImage, IconCatalog, ImageFetcher};
pub use history::{HistoryManager, HistoryState};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{BirthDetails, TimelineData};
pub use model::edge::{Edge, EdgeId};
pub use model::node::{Node, NodeDraft, NodeId};
pub use model::sphere::Sphere;
pub use model::validation::ValidationError;
pub use repo::{RepoError, SqliteTimelineRepository, TimelineRepository};
pub use scene::{SceneError, SceneResult, SceneStore};
pub use service::{Confirm, TimelineService, TimelineSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
