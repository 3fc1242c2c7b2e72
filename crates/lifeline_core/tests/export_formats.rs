use lifeline_core::export::pdf::document::A4_HEIGHT_PT;
use lifeline_core::export::pdf::{build_pdf_with_image, fit_image};
use lifeline_core::export::{export_json, ExportFormat, FetchedImage, JpegImage, NoIcons};
use lifeline_core::{
    ExportError, IconCatalog, NodeDraft, Settings, Sphere, TimelineConfig, TimelineData,
    TimelineSession,
};
use std::io;

fn small_settings() -> Settings {
    Settings {
        timeline: TimelineConfig {
            line_x: 200.0,
            world_width: 400.0,
            default_age_max: 10.0,
            default_current_age: 5.0,
            ..TimelineConfig::default()
        },
        ..Settings::default()
    }
}

struct OneIcon;

impl IconCatalog for OneIcon {
    fn icon_href(&self, icon_id: &str) -> Option<String> {
        (icon_id == "cap").then(|| "/icons/cap.png".to_string())
    }
}

fn tiny_png() -> Vec<u8> {
    let mut pixmap = tiny_skia::Pixmap::new(2, 2).unwrap();
    pixmap.fill(tiny_skia::Color::BLACK);
    pixmap.encode_png().unwrap()
}

/// Offsets listed in the xref table, in object order.
fn xref_offsets(pdf: &[u8]) -> Vec<usize> {
    let text = String::from_utf8_lossy(pdf);
    let start = text.rfind("\nxref\n").unwrap() + "\nxref\n".len();
    text[start..]
        .lines()
        .skip(2)
        .take_while(|line| line.ends_with(" n "))
        .map(|line| line[..10].parse().unwrap())
        .collect()
}

#[test]
fn pdf_xref_points_at_every_object() {
    let jpeg = JpegImage {
        bytes: vec![0xFF, 0xD8, 0x00, b'(', b')', 0xFF, 0xD9],
        width: 720,
        height: 1940,
    };
    let header = vec!["Life timeline".to_string()];
    let pdf = build_pdf_with_image(&jpeg, 720.0, 1940.0, &header);

    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF"));

    let offsets = xref_offsets(&pdf);
    assert_eq!(offsets.len(), 6);
    for (index, offset) in offsets.iter().enumerate() {
        let token = format!("{} 0 obj", index + 1);
        assert_eq!(&pdf[*offset..*offset + token.len()], token.as_bytes());
    }

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Root 1 0 R /Size 7"));
    assert!(text.contains("/Width 720 /Height 1940"));
    let startxref: usize = text
        .rsplit("startxref\n")
        .next()
        .and_then(|tail| tail.lines().next())
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(&pdf[startxref..startxref + 4], b"xref");

    let jpeg_at = pdf
        .windows(jpeg.bytes.len())
        .position(|window| window == jpeg.bytes.as_slice());
    assert!(jpeg_at.is_some());
}

#[test]
fn tall_timelines_fit_the_page_height() {
    let layout = fit_image(720.0, 1940.0);
    assert!((layout.height - (A4_HEIGHT_PT - 72.0)).abs() < 1e-9);
}

#[test]
fn json_export_is_the_camel_case_document() {
    let mut session = TimelineSession::empty(&Settings::default());
    session
        .create_node(
            &NodeDraft::new(18.0, "Graduated").with_sphere(Sphere::Education),
            None,
        )
        .unwrap();
    let json = session.export_json().unwrap();
    assert!(json.contains("\n  \"currentAge\": 25.0"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["ageMax"], 100.0);
    assert_eq!(value["nodes"][0]["sphere"], "education");
    assert_eq!(value["nodes"][0]["isDecision"], false);

    let round_trip = TimelineData::from_json(&json).unwrap();
    assert_eq!(export_json(&round_trip).unwrap(), json);
}

#[test]
fn raster_exports_inline_icons_before_rendering() {
    let mut session = TimelineSession::empty(&small_settings());
    let mut draft = NodeDraft::new(4.0, "Kindergarten");
    draft.icon_id = Some("cap".to_string());
    session.create_node(&draft, None).unwrap();

    let png_bytes = tiny_png();
    let fetcher = |href: &str| -> io::Result<FetchedImage> {
        assert_eq!(href, "/icons/cap.png");
        Ok(FetchedImage {
            bytes: png_bytes.clone(),
            mime: "image/png".to_string(),
        })
    };

    let png = session.export_png(&OneIcon, &fetcher).unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));

    let pdf = session.export_pdf(&OneIcon, &fetcher, &[]).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF"));
}

#[test]
fn failed_icon_fetch_aborts_the_export() {
    let mut session = TimelineSession::empty(&small_settings());
    let mut draft = NodeDraft::new(4.0, "Kindergarten");
    draft.icon_id = Some("cap".to_string());
    session.create_node(&draft, None).unwrap();

    let offline = |_: &str| -> io::Result<FetchedImage> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "offline"))
    };
    let err = session.export_png(&OneIcon, &offline).unwrap_err();
    assert!(matches!(err, ExportError::ImageFetch { .. }));

    // Without icons there is nothing to fetch.
    assert!(session.export_png(&NoIcons, &offline).is_ok());
}

#[test]
fn export_file_names() {
    assert_eq!(ExportFormat::Pdf.default_file_name(), "timeline.pdf");
    assert_eq!(ExportFormat::from_extension("PNG"), Some(ExportFormat::Png));
    let name = lifeline_core::export::timestamped_filename(ExportFormat::Json);
    assert!(name.starts_with("timeline_") && name.ends_with(".json"));
    assert_eq!(name.len(), "timeline_2024-01-15_14-30-45.json".len());
}
