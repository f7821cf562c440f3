//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! fraction, so that string order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use docchat_core::{
  document::{Document, DocumentSummary},
  session::{ChatMessage, ChatSession, Role},
  user::{User, UserRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sizes ────────────────────────────────────────────────────────────────────

pub fn encode_size(size: u64) -> Result<i64> {
  i64::try_from(size).map_err(|_| Error::Decode(format!("size out of range: {size}")))
}

pub fn decode_size(size: i64) -> Result<u64> {
  u64::try_from(size).map_err(|_| Error::Decode(format!("negative size: {size}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_record(self) -> Result<UserRecord> {
    Ok(UserRecord {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        username:   self.username,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

/// Raw values read from a `documents` row. `content` is `None` when the
/// query only selected summary columns.
pub struct RawDocument {
  pub document_id: String,
  pub owner_id:    String,
  pub title:       String,
  pub content:     Option<String>,
  pub mime_type:   String,
  pub size_bytes:  i64,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawDocument {
  pub fn into_summary(self) -> Result<DocumentSummary> {
    Ok(DocumentSummary {
      document_id: decode_uuid(&self.document_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      title:       self.title,
      mime_type:   self.mime_type,
      size_bytes:  decode_size(self.size_bytes)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }

  pub fn into_document(mut self) -> Result<Document> {
    let content = self
      .content
      .take()
      .ok_or_else(|| Error::Decode("document row without content".to_owned()))?;
    let summary = self.into_summary()?;
    Ok(Document {
      document_id: summary.document_id,
      owner_id:    summary.owner_id,
      title:       summary.title,
      content,
      mime_type:   summary.mime_type,
      size_bytes:  summary.size_bytes,
      created_at:  summary.created_at,
      updated_at:  summary.updated_at,
    })
  }
}

/// Raw values read directly from a `chat_sessions` row.
pub struct RawSession {
  pub session_id:  String,
  pub owner_id:    String,
  pub document_id: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSession {
      session_id:  row.get(0)?,
      owner_id:    row.get(1)?,
      document_id: row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
    })
  }

  pub fn into_session(self) -> Result<ChatSession> {
    Ok(ChatSession {
      session_id:  decode_uuid(&self.session_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      document_id: decode_uuid(&self.document_id)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `chat_messages` row.
pub struct RawMessage {
  pub message_id: String,
  pub session_id: String,
  pub role:       String,
  pub content:    String,
  pub created_at: String,
}

impl RawMessage {
  pub fn into_message(self) -> Result<ChatMessage> {
    Ok(ChatMessage {
      message_id: decode_uuid(&self.message_id)?,
      session_id: decode_uuid(&self.session_id)?,
      role:       self.role.parse::<Role>()?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
