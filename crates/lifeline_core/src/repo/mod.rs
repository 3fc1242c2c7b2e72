//! Timeline document storage.
//!
//! # Responsibility
//! - Define the load/save contract the session layer persists through.
//! - Keep SQL and JSON encoding details out of services.
//!
//! # Invariants
//! - One document per owner; saving replaces the previous document.
//! - Documents that fail to decode are reported, never silently replaced.

pub mod timeline_repo;

pub use timeline_repo::{
    RepoError, RepoResult, SqliteTimelineRepository, StoredTimeline, TimelineRepository,
};
