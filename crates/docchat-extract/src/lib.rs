//! Plain-text extraction for uploaded documents.
//!
//! PDFs are handed to [`lopdf`] page by page; text files are taken verbatim.
//! There is no layout analysis and no recovery: if the library fails on any
//! page, the whole extraction fails.

pub mod error;

use std::path::Path;

pub use error::{Error, Result};

pub const PDF: &str = "application/pdf";
pub const PLAIN_TEXT: &str = "text/plain";
pub const MARKDOWN: &str = "text/markdown";

/// Separator placed between the text of consecutive PDF pages.
const PAGE_SEPARATOR: &str = "\n";

/// Guess a supported MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  match ext.as_str() {
    "pdf" => Some(PDF),
    "txt" | "text" => Some(PLAIN_TEXT),
    "md" | "markdown" => Some(MARKDOWN),
    _ => None,
  }
}

/// Extract the plain text of a document.
///
/// Text types are decoded as UTF-8 without any normalisation, so the result
/// is byte-for-byte the uploaded file.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String> {
  match mime_type {
    PDF => extract_pdf(bytes),
    PLAIN_TEXT | MARKDOWN => Ok(String::from_utf8(bytes.to_vec())?),
    other => Err(Error::UnsupportedType(other.to_owned())),
  }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
  let doc = lopdf::Document::load_mem(bytes)?;
  // `get_pages` is keyed by 1-based page number, in order.
  let pages: Vec<u32> = doc.get_pages().into_keys().collect();

  let mut text = String::new();
  for (i, page) in pages.iter().enumerate() {
    if i > 0 {
      text.push_str(PAGE_SEPARATOR);
    }
    text.push_str(&doc.extract_text(&[*page])?);
  }

  tracing::debug!(pages = pages.len(), bytes = text.len(), "extracted pdf text");
  Ok(text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use lopdf::{
    Object, Stream,
    content::{Content, Operation},
    dictionary,
  };

  /// Build a PDF with one page per entry in `pages`, each showing that text.
  fn make_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
      "Type"     => "Font",
      "Subtype"  => "Type1",
      "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
      "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
      let content = Content {
        operations: vec![
          Operation::new("BT", vec![]),
          Operation::new("Tf", vec!["F1".into(), 24.into()]),
          Operation::new("Td", vec![72.into(), 700.into()]),
          Operation::new("Tj", vec![Object::string_literal(*text)]),
          Operation::new("ET", vec![]),
        ],
      };
      let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
      let page_id = doc.add_object(dictionary! {
        "Type"      => "Page",
        "Parent"    => pages_id,
        "Contents"  => content_id,
        "Resources" => resources_id,
      });
      kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
      pages_id,
      Object::Dictionary(dictionary! {
        "Type"     => "Pages",
        "Kids"     => kids,
        "Count"    => count,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
      }),
    );
    let catalog_id = doc.add_object(dictionary! {
      "Type"  => "Catalog",
      "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
  }

  #[test]
  fn plain_text_is_taken_verbatim() {
    let raw = "  Title\r\n\nBody with trailing space \n\tend\n";
    assert_eq!(extract_text(raw.as_bytes(), PLAIN_TEXT).unwrap(), raw);
    assert_eq!(extract_text(raw.as_bytes(), MARKDOWN).unwrap(), raw);
  }

  #[test]
  fn invalid_utf8_text_is_rejected() {
    assert!(matches!(extract_text(&[0xff, 0xfe, 0x00], PLAIN_TEXT), Err(Error::Utf8(_))));
  }

  #[test]
  fn unsupported_type_is_rejected() {
    let err = extract_text(b"PK", "application/zip").unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(t) if t == "application/zip"));
  }

  #[test]
  fn pdf_pages_are_extracted_in_order() {
    let pdf = make_pdf(&["Hello first page", "Goodbye second page"]);
    let text = extract_text(&pdf, PDF).unwrap();

    let first = text.find("Hello first page").expect("first page text");
    let second = text.find("Goodbye second page").expect("second page text");
    assert!(first < second, "pages out of order: {text:?}");

    let between = &text[first + "Hello first page".len()..second];
    assert!(between.contains(PAGE_SEPARATOR), "no separator between pages: {text:?}");
  }

  #[test]
  fn garbage_pdf_propagates_library_error() {
    assert!(matches!(extract_text(b"not a pdf at all", PDF), Err(Error::Pdf(_))));
  }

  #[test]
  fn mime_from_extension() {
    assert_eq!(mime_for_path(Path::new("report.PDF")), Some(PDF));
    assert_eq!(mime_for_path(Path::new("notes.txt")), Some(PLAIN_TEXT));
    assert_eq!(mime_for_path(Path::new("README.md")), Some(MARKDOWN));
    assert_eq!(mime_for_path(Path::new("archive.zip")), None);
    assert_eq!(mime_for_path(Path::new("no_extension")), None);
  }
}
