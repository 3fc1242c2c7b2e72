//! Filesystem-backed icon catalog and image fetcher.

use anyhow::{Context, Result};
use lifeline_core::{FetchedImage, IconCatalog, ImageFetcher};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Icon ids mapped to file names, loaded from a JSON object.
#[derive(Debug, Default)]
pub struct FileIconCatalog {
    files: HashMap<String, String>,
}

impl FileIconCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read icon table {}", path.display()))?;
        let files: HashMap<String, String> = serde_json::from_str(&text)
            .with_context(|| format!("icon table {} is not a JSON object of strings", path.display()))?;
        Ok(Self { files })
    }
}

impl IconCatalog for FileIconCatalog {
    fn icon_href(&self, icon_id: &str) -> Option<String> {
        self.files.get(icon_id).cloned()
    }
}

/// Resolves image hrefs as paths under one root directory.
#[derive(Debug, Clone)]
pub struct DirImageFetcher {
    root: PathBuf,
}

impl DirImageFetcher {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, href: &str) -> io::Result<PathBuf> {
        let relative = Path::new(href.trim_start_matches('/'));
        if relative
            .components()
            .any(|part| matches!(part, std::path::Component::ParentDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("`{href}` leaves the asset directory"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageFetcher for DirImageFetcher {
    fn fetch(&self, href: &str) -> io::Result<FetchedImage> {
        let path = self.resolve(href)?;
        let bytes = fs::read(&path)?;
        Ok(FetchedImage {
            bytes,
            mime: mime_for(&path).to_string(),
        })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::{mime_for, DirImageFetcher};
    use lifeline_core::ImageFetcher;
    use std::path::{Path, PathBuf};

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("icons/cap.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn parent_segments_are_refused() {
        let fetcher = DirImageFetcher::new(PathBuf::from("/tmp/assets"));
        let err = fetcher.fetch("../secret.png").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }
}
