//! World/screen coordinate math.
//!
//! World coordinates are the untransformed space nodes and edges live in.
//! Screen coordinates are canvas pixels after pan (`x`, `y`) and zoom (`k`).
//! Age grows upward: age zero sits at the bottom of the world.

use crate::config::TimelineConfig;
use serde::{Deserialize, Serialize};

/// A 2-D point in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Pan offset and zoom scale mapping world to screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 100.0,
            k: 1.0,
        }
    }
}

impl Transform {
    pub const fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    /// Same pan offset with `k` clamped to the configured scale range.
    pub fn clamped(self, config: &TimelineConfig) -> Self {
        Self {
            k: clamp(self.k, config.min_scale, config.max_scale),
            ..self
        }
    }
}

/// Canvas size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub fn screen_to_world(point: Point, transform: &Transform) -> Point {
    Point::new(
        (point.x - transform.x) / transform.k,
        (point.y - transform.y) / transform.k,
    )
}

pub fn world_to_screen(point: Point, transform: &Transform) -> Point {
    Point::new(
        point.x * transform.k + transform.x,
        point.y * transform.k + transform.y,
    )
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// World y of an age line.
pub fn age_to_world_y(age: f64, age_max: f64, config: &TimelineConfig) -> f64 {
    config.world_height(age_max) - age * config.year_px
}

/// Transform that centres the main axis horizontally and `target_age` vertically.
pub fn initial_transform(
    viewport: Viewport,
    target_age: f64,
    age_max: f64,
    config: &TimelineConfig,
) -> Transform {
    let target_y = age_to_world_y(target_age, age_max, config);
    Transform::new(
        viewport.width / 2.0 - config.line_x,
        viewport.height / 2.0 - target_y,
        1.0,
    )
}
