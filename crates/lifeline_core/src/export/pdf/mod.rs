//! Minimal single-page PDF writer with an embedded JPEG.
//!
//! Building happens in two phases: `document` assembles the object graph
//! (page geometry, content operators, image bytes) and `writer` turns it into
//! bytes while tracking offsets for the xref table.
//!
//! # Invariants
//! - Output starts with `%PDF-1.4` and ends with `%%EOF`.
//! - Every xref offset points at the first byte of its `N 0 obj` line.
//! - JPEG bytes are embedded verbatim under `/DCTDecode`.

pub mod document;
pub mod writer;

pub use document::{fit_image, ContentOp, ImageLayout, PdfDocument, PdfObject, PdfObjectBody};
pub use writer::serialize;

use crate::export::raster::JpegImage;

/// A4 PDF showing `image`, laid out from its CSS size.
pub fn build_pdf_with_image(
    image: &JpegImage,
    css_width: f64,
    css_height: f64,
    header_lines: &[String],
) -> Vec<u8> {
    serialize(&PdfDocument::single_image_page(
        image,
        css_width,
        css_height,
        header_lines,
    ))
}
