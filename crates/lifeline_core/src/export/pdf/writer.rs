//! Byte serialization of a `PdfDocument`: offsets, xref table and trailer.

use super::document::{PdfDocument, PdfObjectBody};

const HEADER: &[u8] = b"%PDF-1.4\n";

struct PdfWriter {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            offsets: Vec::new(),
        }
    }

    fn push_str(&mut self, text: &str) {
        self.buffer.extend_from_slice(text.as_bytes());
    }

    fn begin_object(&mut self, number: u32) {
        self.offsets.push(self.buffer.len());
        self.push_str(&format!("{number} 0 obj\n"));
    }

    fn write_body(&mut self, body: &PdfObjectBody) {
        match body {
            PdfObjectBody::Dictionary(dictionary) => {
                self.push_str(dictionary);
                self.push_str("\nendobj\n");
            }
            PdfObjectBody::Stream { dictionary, data } => {
                if dictionary.is_empty() {
                    self.push_str(&format!("<< /Length {} >>\nstream\n", data.len()));
                } else {
                    self.push_str(&format!(
                        "<< {dictionary} /Length {} >>\nstream\n",
                        data.len()
                    ));
                }
                self.buffer.extend_from_slice(data);
                self.push_str("\nendstream\nendobj\n");
            }
        }
    }

    fn finish(mut self, root: u32) -> Vec<u8> {
        let xref_offset = self.buffer.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        self.push_str(&xref);
        self.push_str(&format!(
            "trailer\n<< /Root {root} 0 R /Size {size} >>\nstartxref\n{xref_offset}\n%%EOF"
        ));
        self.buffer
    }
}

/// Writes `document` in object order.
///
/// Objects must be numbered `1..=n` in sequence so the single xref
/// subsection lines up with them.
pub fn serialize(document: &PdfDocument) -> Vec<u8> {
    debug_assert!(document
        .objects
        .iter()
        .enumerate()
        .all(|(index, object)| object.number as usize == index + 1));

    let mut writer = PdfWriter::new();
    writer.buffer.extend_from_slice(HEADER);
    for object in &document.objects {
        writer.begin_object(object.number);
        writer.write_body(&object.body);
    }
    writer.finish(document.root)
}

#[cfg(test)]
mod tests {
    use super::serialize;
    use crate::export::pdf::document::{PdfDocument, PdfObject, PdfObjectBody};

    #[test]
    fn minimal_document_layout() {
        let document = PdfDocument {
            objects: vec![
                PdfObject {
                    number: 1,
                    body: PdfObjectBody::Dictionary("<< /Type /Catalog >>".to_string()),
                },
                PdfObject {
                    number: 2,
                    body: PdfObjectBody::Stream {
                        dictionary: String::new(),
                        data: b"abc".to_vec(),
                    },
                },
            ],
            root: 1,
        };
        let bytes = serialize(&document);
        let text = String::from_utf8(bytes).unwrap();
        let expected = "%PDF-1.4\n\
1 0 obj\n<< /Type /Catalog >>\nendobj\n\
2 0 obj\n<< /Length 3 >>\nstream\nabc\nendstream\nendobj\n\
xref\n0 3\n0000000000 65535 f \n0000000009 00000 n \n0000000045 00000 n \n\
trailer\n<< /Root 1 0 R /Size 3 >>\nstartxref\n97\n%%EOF";
        assert_eq!(text, expected);
    }
}
