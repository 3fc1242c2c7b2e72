//! Pan/zoom gesture state machine.
//!
//! # Invariants
//! - Wheel zoom keeps the main axis at the same screen x.
//! - Two touch pointers switch to pinch mode; lifting one returns to panning
//!   with the remaining pointer.
//! - Resulting scales are clamped to `[min_scale, max_scale]`.

use crate::config::TimelineConfig;
use crate::geometry::{clamp, Point, Transform, Viewport};
use indexmap::IndexMap;
use log::debug;

pub type PointerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// One pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub id: PointerId,
    pub kind: PointerKind,
    pub position: Point,
}

impl PointerInput {
    pub fn new(id: PointerId, kind: PointerKind, x: f64, y: f64) -> Self {
        Self {
            id,
            kind,
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanZoomMode {
    Idle,
    Panning {
        pointer: PointerId,
        last: Point,
    },
    Pinching {
        first: PointerId,
        second: PointerId,
        last_distance: f64,
        last_midpoint: Point,
    },
}

#[derive(Debug, Clone)]
pub struct PanZoomController {
    config: TimelineConfig,
    pointers: IndexMap<PointerId, PointerInput>,
    mode: PanZoomMode,
}

impl PanZoomController {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            pointers: IndexMap::new(),
            mode: PanZoomMode::Idle,
        }
    }

    pub fn mode(&self) -> PanZoomMode {
        self.mode
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.mode, PanZoomMode::Panning { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.mode, PanZoomMode::Pinching { .. })
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Zoom step for one wheel notch.
    ///
    /// The main axis keeps its screen x; vertically the zoom is anchored on
    /// the viewport's centre line.
    pub fn wheel(&self, delta_y: f64, viewport: Viewport, transform: &Transform) -> Transform {
        let scale_by = 1.0 + (-delta_y * self.config.wheel_sensitivity);
        let new_k = clamp(
            transform.k * scale_by,
            self.config.min_scale,
            self.config.max_scale,
        );
        let center_y = viewport.height / 2.0;
        let line_screen_x = transform.x + self.config.line_x * transform.k;
        Transform::new(
            line_screen_x - self.config.line_x * new_k,
            transform.y + (center_y - transform.y) * (1.0 - new_k / transform.k),
            new_k,
        )
    }

    pub fn pointer_down(&mut self, input: PointerInput) {
        self.pointers.insert(input.id, input);
        match self.mode {
            PanZoomMode::Idle => {
                self.mode = PanZoomMode::Panning {
                    pointer: input.id,
                    last: input.position,
                };
            }
            PanZoomMode::Panning { pointer, .. } if input.kind == PointerKind::Touch => {
                let Some(first) = self.pointers.get(&pointer).copied() else {
                    return;
                };
                if first.kind != PointerKind::Touch {
                    return;
                }
                self.mode = PanZoomMode::Pinching {
                    first: first.id,
                    second: input.id,
                    last_distance: first.position.distance_to(input.position),
                    last_midpoint: first.position.midpoint(input.position),
                };
                debug!("event=pinch_start module=pan_zoom status=ok pointers=2");
            }
            _ => {}
        }
    }

    /// Applies a pointer move. Returns the new transform when the gesture changed it.
    pub fn pointer_move(&mut self, input: PointerInput, transform: &Transform) -> Option<Transform> {
        let tracked = self.pointers.get_mut(&input.id)?;
        tracked.position = input.position;

        match self.mode {
            PanZoomMode::Idle => None,
            PanZoomMode::Panning { pointer, last } => {
                if pointer != input.id {
                    return None;
                }
                self.mode = PanZoomMode::Panning {
                    pointer,
                    last: input.position,
                };
                Some(Transform::new(
                    transform.x + (input.position.x - last.x),
                    transform.y + (input.position.y - last.y),
                    transform.k,
                ))
            }
            PanZoomMode::Pinching {
                first,
                second,
                last_distance,
                last_midpoint,
            } => {
                let a = self.pointers.get(&first)?.position;
                let b = self.pointers.get(&second)?.position;
                let distance = a.distance_to(b);
                let midpoint = a.midpoint(b);
                self.mode = PanZoomMode::Pinching {
                    first,
                    second,
                    last_distance: distance,
                    last_midpoint: midpoint,
                };
                if last_distance <= f64::EPSILON || distance <= f64::EPSILON {
                    return None;
                }
                Some(self.pinch(transform, distance / last_distance, last_midpoint, midpoint))
            }
        }
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.pointers.shift_remove(&id);
        match self.mode {
            PanZoomMode::Panning { pointer, .. } if pointer == id => {
                self.mode = PanZoomMode::Idle;
            }
            PanZoomMode::Pinching { first, second, .. } if first == id || second == id => {
                let remaining = if first == id { second } else { first };
                self.mode = match self.pointers.get(&remaining) {
                    Some(pointer) => PanZoomMode::Panning {
                        pointer: remaining,
                        last: pointer.position,
                    },
                    None => PanZoomMode::Idle,
                };
                debug!("event=pinch_end module=pan_zoom status=ok");
            }
            _ => {}
        }
    }

    /// Drops every tracked pointer (pointer cancel, focus loss).
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.mode = PanZoomMode::Idle;
    }

    fn pinch(&self, transform: &Transform, scale_by: f64, from: Point, to: Point) -> Transform {
        let new_k = clamp(
            transform.k * scale_by,
            self.config.min_scale,
            self.config.max_scale,
        );
        let ratio = new_k / transform.k;
        // World point under the previous midpoint lands under the current one.
        Transform::new(
            to.x - (from.x - transform.x) * ratio,
            to.y - (from.y - transform.y) * ratio,
            new_k,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{screen_to_world, world_to_screen};

    fn controller() -> PanZoomController {
        PanZoomController::new(TimelineConfig::default())
    }

    #[test]
    fn wheel_keeps_main_axis_screen_x() {
        let pan_zoom = controller();
        let viewport = Viewport::new(1280.0, 720.0);
        let before = Transform::new(-1340.0, -7250.0, 1.0);
        for delta in [-240.0, -100.0, 53.0, 100.0, 900.0] {
            let after = pan_zoom.wheel(delta, viewport, &before);
            let axis_before = before.x + 2000.0 * before.k;
            let axis_after = after.x + 2000.0 * after.k;
            assert!((axis_before - axis_after).abs() < 1e-9);
        }
    }

    #[test]
    fn wheel_clamps_scale() {
        let pan_zoom = controller();
        let viewport = Viewport::new(800.0, 600.0);
        let zoomed_in = pan_zoom.wheel(-5000.0, viewport, &Transform::new(0.0, 0.0, 2.5));
        assert_eq!(zoomed_in.k, 3.0);
        let zoomed_out = pan_zoom.wheel(5000.0, viewport, &Transform::new(0.0, 0.0, 0.5));
        assert_eq!(zoomed_out.k, 0.2);
    }

    #[test]
    fn pan_adds_pointer_deltas_until_release() {
        let mut pan_zoom = controller();
        let start = Transform::new(10.0, 20.0, 1.5);
        pan_zoom.pointer_down(PointerInput::new(1, PointerKind::Mouse, 100.0, 100.0));
        let moved = pan_zoom
            .pointer_move(PointerInput::new(1, PointerKind::Mouse, 130.0, 90.0), &start)
            .unwrap();
        assert_eq!(moved, Transform::new(40.0, 10.0, 1.5));

        pan_zoom.pointer_up(1);
        assert_eq!(pan_zoom.mode(), PanZoomMode::Idle);
        assert!(pan_zoom
            .pointer_move(PointerInput::new(1, PointerKind::Mouse, 200.0, 200.0), &moved)
            .is_none());
    }

    #[test]
    fn two_touches_pinch_around_midpoint() {
        let mut pan_zoom = controller();
        let start = Transform::new(0.0, 0.0, 1.0);
        pan_zoom.pointer_down(PointerInput::new(1, PointerKind::Touch, 100.0, 100.0));
        pan_zoom.pointer_down(PointerInput::new(2, PointerKind::Touch, 200.0, 100.0));
        assert!(pan_zoom.is_pinching());

        let anchor_world = screen_to_world(Point::new(150.0, 100.0), &start);
        let zoomed = pan_zoom
            .pointer_move(PointerInput::new(2, PointerKind::Touch, 300.0, 100.0), &start)
            .unwrap();
        assert!((zoomed.k - 2.0).abs() < 1e-9);
        let anchor_screen = world_to_screen(anchor_world, &zoomed);
        assert!((anchor_screen.x - 200.0).abs() < 1e-9);
        assert!((anchor_screen.y - 100.0).abs() < 1e-9);

        pan_zoom.pointer_up(1);
        assert!(pan_zoom.is_panning());
    }

    #[test]
    fn mouse_then_touch_does_not_pinch() {
        let mut pan_zoom = controller();
        pan_zoom.pointer_down(PointerInput::new(1, PointerKind::Mouse, 0.0, 0.0));
        pan_zoom.pointer_down(PointerInput::new(2, PointerKind::Touch, 50.0, 0.0));
        assert!(pan_zoom.is_panning());
    }
}
