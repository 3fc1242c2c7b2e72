//! Timeline export: JSON document, SVG markup, PNG raster and single-page PDF.
//!
//! # Responsibility
//! - Render the scene to standalone SVG and rasterize it.
//! - Inline every external image before rasterizing.
//! - Wrap a JPEG rendering into a hand-assembled PDF.
//!
//! # Invariants
//! - Exports read the scene; they never mutate it.
//! - Raster exports abort when any image cannot be fetched.

pub mod inline;
pub mod json;
pub mod pdf;
pub mod raster;
pub mod svg;

pub use inline::{inline_images, FetchedImage, ImageFetcher};
pub use json::export_json;
pub use pdf::{build_pdf_with_image, PdfDocument};
pub use raster::{encode_png, svg_to_jpeg, svg_to_png, JpegImage, RasterOptions};
pub use svg::{render_svg, IconCatalog, NoIcons, SvgDocument};

use crate::config::ExportConfig;
use crate::scene::SceneStore;
use chrono::{DateTime, Local, TimeZone};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

pub type ExportResult<T> = Result<T, ExportError>;

/// Export pipeline failure.
#[derive(Debug)]
pub enum ExportError {
    /// JSON serialization failed.
    Json(serde_json::Error),
    /// Rendered SVG could not be parsed for rasterization.
    SvgParse(String),
    /// Raster target could not be allocated (zero or oversized).
    PixmapAlloc { width: u32, height: u32 },
    PngEncode(String),
    JpegEncode(String),
    /// An `<image>` source could not be fetched for inlining.
    ImageFetch { href: String, source: io::Error },
    /// Rendering produced no pixels.
    EmptyRaster,
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "cannot serialize timeline: {err}"),
            Self::SvgParse(message) => write!(f, "cannot parse rendered svg: {message}"),
            Self::PixmapAlloc { width, height } => {
                write!(f, "cannot allocate {width}x{height} raster")
            }
            Self::PngEncode(message) => write!(f, "cannot encode png: {message}"),
            Self::JpegEncode(message) => write!(f, "cannot encode jpeg: {message}"),
            Self::ImageFetch { href, source } => write!(f, "cannot fetch image `{href}`: {source}"),
            Self::EmptyRaster => write!(f, "rendered raster is empty"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::ImageFetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    /// Fixed fallback name, e.g. `timeline.pdf`.
    pub fn default_file_name(self) -> String {
        format!("timeline.{}", self.extension())
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// `timeline_YYYY-MM-DD_HH-MM-SS.<ext>` for the given local time.
pub fn generate_filename<Tz: TimeZone>(extension: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("timeline_{}.{extension}", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Timestamped file name for `format` at the current local time.
pub fn timestamped_filename(format: ExportFormat) -> String {
    generate_filename(format.extension(), &Local::now())
}

/// Renders the scene, inlines its images and encodes a PNG.
pub fn export_png(
    scene: &SceneStore,
    icons: &dyn IconCatalog,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
) -> ExportResult<Vec<u8>> {
    let result = rasterizable_svg(scene, icons, fetcher, config)
        .and_then(|document| svg_to_png(&document.markup, &RasterOptions::from_config(config)));
    log_export("png", &result);
    result
}

/// Renders the scene to JPEG and wraps it in a one-page A4 PDF.
pub fn export_pdf(
    scene: &SceneStore,
    icons: &dyn IconCatalog,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
    header_lines: &[String],
) -> ExportResult<Vec<u8>> {
    let result = rasterizable_svg(scene, icons, fetcher, config).and_then(|document| {
        let jpeg = svg_to_jpeg(
            &document.markup,
            &RasterOptions::from_config(config),
            config.jpeg_quality,
        )?;
        Ok(build_pdf_with_image(
            &jpeg,
            document.width,
            document.height,
            header_lines,
        ))
    });
    log_export("pdf", &result);
    result
}

fn rasterizable_svg(
    scene: &SceneStore,
    icons: &dyn IconCatalog,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
) -> ExportResult<SvgDocument> {
    let mut document = render_svg(scene, icons, config);
    document.markup = inline_images(&document.markup, fetcher)?;
    Ok(document)
}

fn log_export(format: &str, result: &ExportResult<Vec<u8>>) {
    match result {
        Ok(bytes) => info!(
            "event=export module=export status=ok format={} bytes={}",
            format,
            bytes.len()
        ),
        Err(err) => error!(
            "event=export module=export status=error format={} error={}",
            format, err
        ),
    }
}
