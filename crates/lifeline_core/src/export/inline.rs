//! Replaces external `<image>` sources with base64 `data:` URIs.
//!
//! # Invariants
//! - Every distinct href is fetched once; repeated hrefs reuse the result.
//! - All fetches finish before any markup is rewritten; one failure aborts
//!   the export with the failing href.
//! - `data:` hrefs are left as they are.

use super::{ExportError, ExportResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::io;

static IMAGE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<image\b[^>]*>").expect("valid image tag regex"));
static HREF_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<attr>\b(?:xlink:)?href)="(?P<href>[^"]*)""#).expect("valid href regex")
});

/// Image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FetchedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Resolves image hrefs to bytes (filesystem, HTTP, embedded table).
pub trait ImageFetcher {
    fn fetch(&self, href: &str) -> io::Result<FetchedImage>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&str) -> io::Result<FetchedImage>,
{
    fn fetch(&self, href: &str) -> io::Result<FetchedImage> {
        self(href)
    }
}

/// Returns `svg` with every external image href inlined.
pub fn inline_images(svg: &str, fetcher: &dyn ImageFetcher) -> ExportResult<String> {
    let mut resolved: HashMap<String, String> = HashMap::new();
    for tag in IMAGE_TAG_RE.find_iter(svg) {
        for captures in HREF_ATTR_RE.captures_iter(tag.as_str()) {
            let href = unescape_xml(&captures["href"]);
            if href.is_empty() || href.starts_with("data:") || resolved.contains_key(&href) {
                continue;
            }
            let image = fetcher.fetch(&href).map_err(|source| {
                warn!(
                    "event=image_inline module=export status=error error={}",
                    source
                );
                ExportError::ImageFetch {
                    href: href.clone(),
                    source,
                }
            })?;
            resolved.insert(href, image.to_data_uri());
        }
    }

    if resolved.is_empty() {
        return Ok(svg.to_string());
    }
    debug!(
        "event=image_inline module=export status=ok images={}",
        resolved.len()
    );

    let rewritten = IMAGE_TAG_RE.replace_all(svg, |tag: &Captures<'_>| {
        HREF_ATTR_RE
            .replace_all(&tag[0], |attr: &Captures<'_>| {
                let href = unescape_xml(&attr["href"]);
                match resolved.get(&href) {
                    Some(data_uri) => format!("{}=\"{}\"", &attr["attr"], data_uri),
                    None => attr[0].to_string(),
                }
            })
            .into_owned()
    });
    Ok(rewritten.into_owned())
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn png_fetcher(calls: &Cell<usize>) -> impl Fn(&str) -> io::Result<FetchedImage> + '_ {
        move |_href: &str| {
            calls.set(calls.get() + 1);
            Ok(FetchedImage {
                bytes: vec![1, 2, 3],
                mime: "image/png".to_string(),
            })
        }
    }

    #[test]
    fn external_hrefs_become_data_uris_once() {
        let calls = Cell::new(0);
        let fetcher = png_fetcher(&calls);
        let svg = r#"<svg><image href="/a.png" x="1"/><image href="/a.png"/><image href="data:image/png;base64,AA=="/></svg>"#;
        let inlined = inline_images(svg, &fetcher).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(inlined.matches("data:image/png;base64,AQID").count(), 2);
        assert!(inlined.contains("data:image/png;base64,AA=="));
        assert!(!inlined.contains("/a.png"));
    }

    #[test]
    fn any_failed_fetch_aborts() {
        let failing = |href: &str| -> io::Result<FetchedImage> {
            Err(io::Error::new(io::ErrorKind::NotFound, href.to_string()))
        };
        let err = inline_images(r#"<image href="/missing.png"/>"#, &failing).unwrap_err();
        match err {
            ExportError::ImageFetch { href, .. } => assert_eq!(href, "/missing.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_image_hrefs_are_untouched() {
        let calls = Cell::new(0);
        let fetcher = png_fetcher(&calls);
        let svg = r#"<a href="/x">link</a>"#;
        assert_eq!(inline_images(svg, &fetcher).unwrap(), svg);
        assert_eq!(calls.get(), 0);
    }
}
