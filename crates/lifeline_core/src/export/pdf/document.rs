//! PDF object graph: pure data, no byte offsets.

use crate::export::raster::JpegImage;

pub const A4_WIDTH_PT: f64 = 595.28;
pub const A4_HEIGHT_PT: f64 = 841.89;
pub const PAGE_MARGIN_PT: f64 = 36.0;
pub const PX_TO_PT: f64 = 72.0 / 96.0;
const TEXT_LEFT_PT: f64 = 50.0;
const TEXT_TOP_GAP_PT: f64 = 20.0;
const FONT_SIZE_PT: u32 = 12;
const LEADING_PT: u32 = 14;
const IMAGE_NAME: &str = "Im1";
const FONT_NAME: &str = "F1";

/// Placement of the image on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayout {
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

/// Fits a `width_px` x `height_px` CSS-pixel image inside the A4 margins.
///
/// The image is never enlarged; it is centred horizontally and rests on the
/// bottom margin.
pub fn fit_image(width_px: f64, height_px: f64) -> ImageLayout {
    let width_pt = width_px * PX_TO_PT;
    let height_pt = height_px * PX_TO_PT;
    let max_width = A4_WIDTH_PT - PAGE_MARGIN_PT * 2.0;
    let max_height = A4_HEIGHT_PT - PAGE_MARGIN_PT * 2.0;
    let scale = (max_width / width_pt).min(max_height / height_pt).min(1.0);
    let width = width_pt * scale;
    let height = height_pt * scale;
    ImageLayout {
        width,
        height,
        x: (A4_WIDTH_PT - width) / 2.0,
        y: PAGE_MARGIN_PT,
    }
}

/// Content-stream operators used by the single page.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOp {
    /// Helvetica text block, one entry per line, starting at `top` (points from the bottom).
    Text { lines: Vec<String>, top: f64 },
    /// Paint the named image XObject into `layout`.
    Image { name: String, layout: ImageLayout },
}

impl ContentOp {
    fn render(&self, out: &mut Vec<String>) {
        match self {
            Self::Text { lines, top } => {
                if lines.is_empty() {
                    return;
                }
                out.push("BT".to_string());
                out.push(format!("/{FONT_NAME} {FONT_SIZE_PT} Tf"));
                out.push(format!("{LEADING_PT} TL"));
                out.push(format!("1 0 0 1 {TEXT_LEFT_PT} {top:.2} Tm"));
                for (index, line) in lines.iter().enumerate() {
                    if index > 0 {
                        out.push("T*".to_string());
                    }
                    out.push(format!("({}) Tj", escape_text(line)));
                }
                out.push("ET".to_string());
            }
            Self::Image { name, layout } => {
                out.push("q".to_string());
                out.push(format!(
                    "{:.2} 0 0 {:.2} {:.2} {:.2} cm",
                    layout.width, layout.height, layout.x, layout.y
                ));
                out.push(format!("/{name} Do"));
                out.push("Q".to_string());
            }
        }
    }
}

/// Serializes content operators into stream bytes (newline separated, no trailing newline).
pub fn content_stream(ops: &[ContentOp]) -> Vec<u8> {
    let mut lines = Vec::new();
    for op in ops {
        op.render(&mut lines);
    }
    lines.join("\n").into_bytes()
}

/// Body of one indirect object.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObjectBody {
    /// Dictionary source text, e.g. `<< /Type /Catalog /Pages 2 0 R >>`.
    Dictionary(String),
    /// Stream; `/Length` is appended to `dictionary` entries on write.
    Stream { dictionary: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfObject {
    pub number: u32,
    pub body: PdfObjectBody,
}

/// Object graph of a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument {
    pub objects: Vec<PdfObject>,
    pub root: u32,
}

impl PdfDocument {
    /// One A4 page showing a JPEG image, with optional header text.
    ///
    /// Layout uses the CSS size (`css_width` x `css_height`); the XObject
    /// declares the JPEG's real pixel size.
    pub fn single_image_page(
        image: &JpegImage,
        css_width: f64,
        css_height: f64,
        header_lines: &[String],
    ) -> Self {
        let layout = fit_image(css_width, css_height);
        let mut ops = Vec::new();
        let lines: Vec<String> = header_lines.iter().map(|line| sanitize_text(line)).collect();
        if !lines.is_empty() {
            ops.push(ContentOp::Text {
                lines,
                top: A4_HEIGHT_PT - PAGE_MARGIN_PT - TEXT_TOP_GAP_PT,
            });
        }
        ops.push(ContentOp::Image {
            name: IMAGE_NAME.to_string(),
            layout,
        });

        let objects = vec![
            PdfObject {
                number: 1,
                body: PdfObjectBody::Dictionary("<< /Type /Catalog /Pages 2 0 R >>".to_string()),
            },
            PdfObject {
                number: 2,
                body: PdfObjectBody::Dictionary(
                    "<< /Type /Pages /Count 1 /Kids [3 0 R] >>".to_string(),
                ),
            },
            PdfObject {
                number: 3,
                body: PdfObjectBody::Dictionary(format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {A4_WIDTH_PT:.2} {A4_HEIGHT_PT:.2}] /Contents 4 0 R /Resources << /Font << /{FONT_NAME} 6 0 R >> /XObject << /{IMAGE_NAME} 5 0 R >> >> >>"
                )),
            },
            PdfObject {
                number: 4,
                body: PdfObjectBody::Stream {
                    dictionary: String::new(),
                    data: content_stream(&ops),
                },
            },
            PdfObject {
                number: 5,
                body: PdfObjectBody::Stream {
                    dictionary: format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                        image.width, image.height
                    ),
                    data: image.bytes.clone(),
                },
            },
            PdfObject {
                number: 6,
                body: PdfObjectBody::Dictionary(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
                ),
            },
        ];

        Self { objects, root: 1 }
    }
}

/// Base-14 fonts only cover ASCII here; anything else prints as `?`.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|ch| if (' '..='~').contains(&ch) { ch } else { '?' })
        .collect()
}

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
