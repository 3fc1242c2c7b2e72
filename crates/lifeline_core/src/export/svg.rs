//! Standalone SVG rendering of a scene.
//!
//! Content is drawn in world coordinates; the padding is applied through a
//! negative `viewBox` origin, so the output does not depend on the on-screen
//! pan/zoom transform.

use crate::config::ExportConfig;
use crate::geometry::age_to_world_y;
use crate::model::node::Node;
use crate::model::sphere::Sphere;
use crate::scene::SceneStore;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const GRID_STEP_YEARS: usize = 5;
const GRID_COLOR: &str = "#e2e8f0";
const AXIS_LABEL_COLOR: &str = "#475569";
const LIVED_AXIS_COLOR: &str = "#93c5fd";
const FUTURE_AXIS_COLOR: &str = "#cbd5e1";
const AXIS_WIDTH: f64 = 16.0;
const INK_COLOR: &str = "#0f172a";
const NOW_COLOR: &str = "#3b82f6";
const NOW_LABEL_COLOR: &str = "#1d4ed8";

/// Maps event icon ids to image hrefs.
pub trait IconCatalog {
    fn icon_href(&self, icon_id: &str) -> Option<String>;
}

/// Catalog without icons; every event renders as a circle.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconCatalog for NoIcons {
    fn icon_href(&self, _icon_id: &str) -> Option<String> {
        None
    }
}

/// Rendered markup plus its CSS pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub markup: String,
    pub width: f64,
    pub height: f64,
}

pub fn render_svg(scene: &SceneStore, icons: &dyn IconCatalog, export: &ExportConfig) -> SvgDocument {
    let config = scene.config();
    let age_max = scene.age_max();
    let world_height = config.world_height(age_max);
    let width = config.world_width + export.padding_x * 2.0;
    let height = world_height + export.padding_top + export.padding_bottom;
    let font = escape_xml(&export.font_family);
    let line_x = config.line_x;
    let radius = config.node_radius;
    let y_of = |age: f64| age_to_world_y(age, age_max, config);

    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n");
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="-{} -{} {width} {height}">"#,
        export.padding_x, export.padding_top
    );
    let _ = writeln!(
        out,
        r##"<rect x="-{}" y="-{}" width="{width}" height="{height}" fill="#ffffff"/>"##,
        export.padding_x, export.padding_top
    );

    // Age grid.
    let birth_year = birth_year(scene);
    let last_age = age_max.floor().max(0.0) as usize;
    for age in (0..=last_age).step_by(GRID_STEP_YEARS) {
        let y = y_of(age as f64);
        let stroke = if age % 10 == 0 { 2 } else { 1 };
        let _ = writeln!(
            out,
            r#"<line x1="0" y1="{y}" x2="{}" y2="{y}" stroke="{GRID_COLOR}" stroke-width="{stroke}"/>"#,
            config.world_width
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="42" text-anchor="end" fill="{AXIS_LABEL_COLOR}" font-family="{font}">{age}</text>"#,
            line_x - 35.0,
            y + 5.0
        );
        if let Some(year) = birth_year {
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="42" text-anchor="start" fill="{AXIS_LABEL_COLOR}" font-family="{font}">{}</text>"#,
                line_x + 35.0,
                y + 5.0,
                year + age as i32
            );
        }
    }

    // Main axis: lived part solid, future part dashed.
    let now_y = y_of(scene.current_age());
    let _ = writeln!(
        out,
        r#"<line x1="{line_x}" y1="{world_height}" x2="{line_x}" y2="{now_y}" stroke="{LIVED_AXIS_COLOR}" stroke-width="{AXIS_WIDTH}" stroke-linecap="round"/>"#
    );
    let _ = writeln!(
        out,
        r#"<line x1="{line_x}" y1="{now_y}" x2="{line_x}" y2="{}" stroke="{FUTURE_AXIS_COLOR}" stroke-width="{AXIS_WIDTH}" stroke-linecap="round" stroke-dasharray="10 5"/>"#,
        y_of(age_max)
    );

    // Birth marker.
    let _ = writeln!(
        out,
        r##"<circle cx="{line_x}" cy="{world_height}" r="{}" fill="#ffffff" stroke="{INK_COLOR}" stroke-width="3"/>"##,
        radius * 0.8
    );
    let birth_label = scene
        .birth_details()
        .date
        .as_deref()
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .map_or_else(|| "Birth".to_string(), |date| format!("Birth {date}"));
    let _ = writeln!(
        out,
        r#"<text x="{line_x}" y="{}" font-size="16" text-anchor="middle" fill="{INK_COLOR}" font-family="{font}">{}</text>"#,
        world_height + radius * 1.8,
        escape_xml(&birth_label)
    );

    // Current age marker.
    let _ = writeln!(
        out,
        r#"<circle cx="{line_x}" cy="{now_y}" r="{}" fill="{NOW_COLOR}"/>"#,
        radius * 0.5
    );
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="16" text-anchor="end" fill="{NOW_LABEL_COLOR}" font-family="{font}">Now</text>"#,
        line_x - radius,
        now_y + 4.0
    );

    for edge in scene.edges() {
        let _ = writeln!(
            out,
            r#"<line x1="{x}" y1="{}" x2="{x}" y2="{}" stroke="{}" stroke-width="4" stroke-linecap="round" opacity="0.8"/>"#,
            y_of(edge.start_age),
            y_of(edge.end_age),
            escape_xml(&edge.color),
            x = edge.x
        );
    }

    for node in scene.nodes() {
        render_node(&mut out, scene, node, icons, &font, y_of(node.age));
    }

    out.push_str("</svg>\n");
    SvgDocument {
        markup: out,
        width,
        height,
    }
}

fn render_node(
    out: &mut String,
    scene: &SceneStore,
    node: &Node,
    icons: &dyn IconCatalog,
    font: &str,
    y: f64,
) {
    let radius = scene.config().node_radius;
    let color = node.sphere.unwrap_or(Sphere::Other).color();
    let x = node.x;
    let parent_x = scene.parent_line_x(node);

    if parent_x != x {
        let _ = writeln!(
            out,
            r#"<line x1="{parent_x}" y1="{y}" x2="{x}" y2="{y}" stroke="{color}" stroke-width="3" stroke-linecap="round" opacity="0.6"/>"#
        );
    }

    let icon = node
        .icon_id
        .as_deref()
        .and_then(|icon_id| icons.icon_href(icon_id).map(|href| (icon_id, href)));
    match icon {
        Some((icon_id, href)) => {
            let _ = writeln!(
                out,
                r#"<image data-icon-id="{}" href="{}" x="{}" y="{}" width="{size}" height="{size}" preserveAspectRatio="xMidYMid meet"/>"#,
                escape_xml(icon_id),
                escape_xml(&href),
                x - radius,
                y - radius,
                size = radius * 2.0
            );
        }
        None => {
            let _ = writeln!(
                out,
                r##"<circle cx="{x}" cy="{y}" r="{radius}" fill="#ffffff" stroke="{color}" stroke-width="4"/>"##
            );
            if node.is_decision {
                let arm = radius * 0.4;
                for (dy1, dy2) in [(-arm, arm), (arm, -arm)] {
                    let _ = writeln!(
                        out,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="3" stroke-linecap="round"/>"#,
                        x - arm,
                        y + dy1,
                        x + arm,
                        y + dy2
                    );
                }
            }
        }
    }

    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="28" fill="{INK_COLOR}" font-family="{font}">{}</text>"#,
        x + radius + 10.0,
        y - radius - 5.0,
        escape_xml(&node.label)
    );
}

/// Year of birth from an ISO `YYYY-MM-DD` birth date.
fn birth_year(scene: &SceneStore) -> Option<i32> {
    let date = scene.birth_details().date.as_deref()?;
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.year())
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
