//! SVG rasterization through `usvg`/`resvg` into a `tiny-skia` pixmap.

use super::{ExportError, ExportResult};
use crate::config::ExportConfig;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Device pixel ratio; output pixels per CSS pixel.
    pub scale: f32,
    /// Fallback family for text without a resolvable font.
    pub font_family: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl RasterOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        let family = config
            .font_family
            .split(',')
            .next()
            .map(str::trim)
            .filter(|family| !family.is_empty())
            .unwrap_or("sans-serif");
        Self {
            scale: config.pixel_ratio,
            font_family: family.to_string(),
        }
    }
}

/// Baseline JPEG with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> ExportResult<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options)?;
    encode_png(&pixmap)
}

pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> ExportResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|err| ExportError::PngEncode(err.to_string()))
}

/// Renders on white and encodes RGB JPEG at `quality` (1-100).
pub fn svg_to_jpeg(svg: &str, options: &RasterOptions, quality: u8) -> ExportResult<JpegImage> {
    let pixmap = svg_to_pixmap(svg, options)?;
    let (width, height) = (pixmap.width(), pixmap.height());

    // The background is opaque white, so dropping alpha loses nothing.
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    let mut bytes = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder
        .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|err| ExportError::JpegEncode(err.to_string()))?;
    Ok(JpegImage {
        bytes,
        width,
        height,
    })
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> ExportResult<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = options.font_family.clone();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| ExportError::SvgParse(err.to_string()))?;
    let size = tree.size();
    let scale = if options.scale.is_finite() && options.scale > 0.0 {
        options.scale
    } else {
        1.0
    };
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyRaster);
    }

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc { width, height })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!(
        "event=rasterize module=export status=ok width={} height={} scale={}",
        width, height, scale
    );
    Ok(pixmap)
}
