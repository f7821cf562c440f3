//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use docchat_core::{
  document::{Document, DocumentSummary, NewDocument},
  session::{ChatMessage, ChatSession, Role},
  store::DocumentStore,
  user::{User, UserRecord},
};

use crate::{
  encode::{
    encode_dt, encode_size, encode_uuid, now, RawDocument, RawMessage, RawSession, RawUser,
  },
  schema::SCHEMA,
  Result,
};

const SESSION_COLUMNS: &str = "session_id, owner_id, document_id, created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A docchat store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// statements run on the connection's background thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a session query that binds `(document_id, owner_id)` as `?1, ?2`.
  async fn query_sessions(
    &self,
    sql:         String,
    owner:       Uuid,
    document_id: Uuid,
  ) -> Result<Vec<ChatSession>> {
    let owner_str = encode_uuid(owner);
    let doc_str   = encode_uuid(document_id);

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![doc_str, owner_str], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  #[cfg(test)]
  pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(n)
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
    let user = User {
      user_id:    Uuid::new_v4(),
      username:   username.to_owned(),
      created_at: now(),
    };

    let id_str = encode_uuid(user.user_id);
    let name   = user.username.clone();
    let hash   = password_hash.to_owned();
    let at_str = encode_dt(user.created_at);

    // Check and insert in one call; the connection thread serialises them.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            rusqlite::params![name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, hash, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(user))
  }

  async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, password_hash, created_at
             FROM users WHERE username = ?1",
            rusqlite::params![name],
            |row| {
              Ok(RawUser {
                user_id:       row.get(0)?,
                username:      row.get(1)?,
                password_hash: row.get(2)?,
                created_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_record).transpose()
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(&self, owner: Uuid, input: NewDocument) -> Result<Document> {
    let created_at = now();
    let document = Document {
      document_id: Uuid::new_v4(),
      owner_id:    owner,
      title:       input.title,
      content:     input.content,
      mime_type:   input.mime_type,
      size_bytes:  input.size_bytes,
      created_at,
      updated_at:  created_at,
    };

    let id_str    = encode_uuid(document.document_id);
    let owner_str = encode_uuid(owner);
    let title     = document.title.clone();
    let content   = document.content.clone();
    let mime_type = document.mime_type.clone();
    let size      = encode_size(document.size_bytes)?;
    let at_str    = encode_dt(created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (
             document_id, owner_id, title, content, mime_type,
             size_bytes, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![id_str, owner_str, title, content, mime_type, size, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(document)
  }

  async fn list_documents(&self, owner: Uuid) -> Result<Vec<DocumentSummary>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT document_id, owner_id, title, mime_type, size_bytes, created_at, updated_at
           FROM documents
           WHERE owner_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawDocument {
              document_id: row.get(0)?,
              owner_id:    row.get(1)?,
              title:       row.get(2)?,
              content:     None,
              mime_type:   row.get(3)?,
              size_bytes:  row.get(4)?,
              created_at:  row.get(5)?,
              updated_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_summary).collect()
  }

  async fn get_document(&self, owner: Uuid, document_id: Uuid) -> Result<Option<Document>> {
    let owner_str = encode_uuid(owner);
    let id_str    = encode_uuid(document_id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT document_id, owner_id, title, content, mime_type,
                    size_bytes, created_at, updated_at
             FROM documents
             WHERE document_id = ?1 AND owner_id = ?2",
            rusqlite::params![id_str, owner_str],
            |row| {
              Ok(RawDocument {
                document_id: row.get(0)?,
                owner_id:    row.get(1)?,
                title:       row.get(2)?,
                content:     Some(row.get(3)?),
                mime_type:   row.get(4)?,
                size_bytes:  row.get(5)?,
                created_at:  row.get(6)?,
                updated_at:  row.get(7)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn delete_document(&self, owner: Uuid, document_id: Uuid) -> Result<bool> {
    let owner_str = encode_uuid(owner);
    let id_str    = encode_uuid(document_id);

    // Sessions and messages are removed by ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE document_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, owner: Uuid, document_id: Uuid) -> Result<Option<ChatSession>> {
    let created_at = now();
    let session = ChatSession {
      session_id:  Uuid::new_v4(),
      owner_id:    owner,
      document_id,
      created_at,
      updated_at:  created_at,
    };

    let id_str    = encode_uuid(session.session_id);
    let owner_str = encode_uuid(owner);
    let doc_str   = encode_uuid(document_id);
    let at_str    = encode_dt(created_at);

    let created: bool = self
      .conn
      .call(move |conn| {
        let visible = conn
          .query_row(
            "SELECT 1 FROM documents WHERE document_id = ?1 AND owner_id = ?2",
            rusqlite::params![doc_str, owner_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !visible {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO chat_sessions (session_id, owner_id, document_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, owner_str, doc_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(created.then_some(session))
  }

  async fn latest_session(&self, owner: Uuid, document_id: Uuid) -> Result<Option<ChatSession>> {
    let sql = format!(
      "SELECT {SESSION_COLUMNS} FROM chat_sessions
       WHERE document_id = ?1 AND owner_id = ?2
       ORDER BY created_at DESC, rowid DESC
       LIMIT 1"
    );
    Ok(self.query_sessions(sql, owner, document_id).await?.into_iter().next())
  }

  async fn latest_or_create_session(
    &self,
    owner:       Uuid,
    document_id: Uuid,
  ) -> Result<Option<(ChatSession, bool)>> {
    let id_str    = encode_uuid(Uuid::new_v4());
    let owner_str = encode_uuid(owner);
    let doc_str   = encode_uuid(document_id);
    let at_str    = encode_dt(now());
    let select = format!(
      "SELECT {SESSION_COLUMNS} FROM chat_sessions
       WHERE document_id = ?1 AND owner_id = ?2
       ORDER BY created_at DESC, rowid DESC
       LIMIT 1"
    );

    let found: Option<(RawSession, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let existing = tx
          .query_row(&select, rusqlite::params![doc_str, owner_str], RawSession::from_row)
          .optional()?;
        if let Some(raw) = existing {
          return Ok(Some((raw, false)));
        }

        let visible = tx
          .query_row(
            "SELECT 1 FROM documents WHERE document_id = ?1 AND owner_id = ?2",
            rusqlite::params![doc_str, owner_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !visible {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO chat_sessions (session_id, owner_id, document_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, owner_str, doc_str, at_str],
        )?;
        let created = tx.query_row(&select, rusqlite::params![doc_str, owner_str], RawSession::from_row)?;
        tx.commit()?;
        Ok(Some((created, true)))
      })
      .await?;

    found
      .map(|(raw, created)| Ok((raw.into_session()?, created)))
      .transpose()
  }

  async fn list_sessions(&self, owner: Uuid, document_id: Uuid) -> Result<Vec<ChatSession>> {
    let sql = format!(
      "SELECT {SESSION_COLUMNS} FROM chat_sessions
       WHERE document_id = ?1 AND owner_id = ?2
       ORDER BY created_at DESC, rowid DESC"
    );
    self.query_sessions(sql, owner, document_id).await
  }

  async fn get_session(&self, owner: Uuid, session_id: Uuid) -> Result<Option<ChatSession>> {
    let owner_str = encode_uuid(owner);
    let id_str    = encode_uuid(session_id);
    let sql = format!(
      "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE session_id = ?1 AND owner_id = ?2"
    );

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str, owner_str], RawSession::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  // ── Messages (append-only) ────────────────────────────────────────────────

  async fn append_message(
    &self,
    owner:      Uuid,
    session_id: Uuid,
    role:       Role,
    content:    String,
  ) -> Result<Option<ChatMessage>> {
    let message = ChatMessage {
      message_id: Uuid::new_v4(),
      session_id,
      role,
      content,
      created_at: now(),
    };

    let id_str      = encode_uuid(message.message_id);
    let session_str = encode_uuid(session_id);
    let owner_str   = encode_uuid(owner);
    let role_str    = role.as_str();
    let body        = message.content.clone();
    let at_str      = encode_dt(message.created_at);

    let appended: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let visible = tx
          .query_row(
            "SELECT 1 FROM chat_sessions WHERE session_id = ?1 AND owner_id = ?2",
            rusqlite::params![session_str, owner_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !visible {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO chat_messages (message_id, session_id, role, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, session_str, role_str, body, at_str],
        )?;
        tx.execute(
          "UPDATE chat_sessions SET updated_at = ?1 WHERE session_id = ?2",
          rusqlite::params![at_str, session_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(appended.then_some(message))
  }

  async fn list_messages(&self, owner: Uuid, session_id: Uuid) -> Result<Vec<ChatMessage>> {
    let owner_str   = encode_uuid(owner);
    let session_str = encode_uuid(session_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.message_id, m.session_id, m.role, m.content, m.created_at
           FROM chat_messages m
           JOIN chat_sessions s ON s.session_id = m.session_id
           WHERE m.session_id = ?1 AND s.owner_id = ?2
           ORDER BY m.created_at, m.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![session_str, owner_str], |row| {
            Ok(RawMessage {
              message_id: row.get(0)?,
              session_id: row.get(1)?,
              role:       row.get(2)?,
              content:    row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }
}
