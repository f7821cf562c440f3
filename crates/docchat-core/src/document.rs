//! Documents: uploaded files reduced to their extracted text.
//!
//! A document is immutable once stored. There is no edit operation; the only
//! lifecycle event is deletion, which takes its chat sessions with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored document including its full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub document_id: Uuid,
  pub owner_id:    Uuid,
  pub title:       String,
  /// Plain text extracted from the uploaded file.
  pub content:     String,
  pub mime_type:   String,
  /// Size in bytes of the file the text was extracted from.
  pub size_bytes:  u64,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// A [`Document`] without its content, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
  pub document_id: Uuid,
  pub owner_id:    Uuid,
  pub title:       String,
  pub mime_type:   String,
  pub size_bytes:  u64,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl From<Document> for DocumentSummary {
  fn from(d: Document) -> Self {
    DocumentSummary {
      document_id: d.document_id,
      owner_id:    d.owner_id,
      title:       d.title,
      mime_type:   d.mime_type,
      size_bytes:  d.size_bytes,
      created_at:  d.created_at,
      updated_at:  d.updated_at,
    }
  }
}

/// Input to [`DocumentStore::create_document`](crate::store::DocumentStore::create_document).
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
  pub title:      String,
  pub content:    String,
  pub mime_type:  String,
  pub size_bytes: u64,
}

impl NewDocument {
  /// A plain-text document whose size is the length of its content.
  pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
    let content = content.into();
    NewDocument {
      title:      title.into(),
      size_bytes: content.len() as u64,
      content,
      mime_type:  "text/plain".to_owned(),
    }
  }
}
