//! Pointer, wheel and keyboard interaction over a scene.
//!
//! # Responsibility
//! - Translate raw input samples into transform changes (`pan_zoom`).
//! - Move events and their dependent subtrees (`drag`).
//! - Map key presses to timeline commands (`keyboard`).
//!
//! # Invariants
//! - Controllers hold only gesture state; the scene is passed in per call.
//! - History commits are decided by the caller from the returned outcomes.

pub mod drag;
pub mod keyboard;
pub mod pan_zoom;

pub use drag::{reposition_subtree, DragController, DragOutcome, SubtreeMove};
pub use keyboard::{KeyInput, Shortcut};
pub use pan_zoom::{PanZoomController, PanZoomMode, PointerId, PointerInput, PointerKind};
