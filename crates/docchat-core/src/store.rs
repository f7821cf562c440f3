//! The `DocumentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `docchat-store-sqlite`).
//! The server depends on this abstraction, not on any concrete backend.
//!
//! # Ownership
//!
//! Every document, session and message operation takes the id of the
//! authenticated owner. Backends must treat rows belonging to another owner
//! exactly like rows that do not exist: reads return `None` or an empty list
//! and writes report "not found". This is the only authorization layer.

use std::future::Future;

use uuid::Uuid;

use crate::{
  document::{Document, DocumentSummary, NewDocument},
  session::{ChatMessage, ChatSession, Role},
  user::{User, UserRecord},
};

/// Abstraction over a docchat storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Returns `None` if `username` is already taken.
  fn create_user<'a>(
    &'a self,
    username: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Look a user up by username, including the stored password hash.
  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Persist a new document; the store assigns its id and timestamps.
  fn create_document(
    &self,
    owner: Uuid,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// All of the owner's documents, newest first.
  fn list_documents(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<DocumentSummary>, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Delete a document together with its sessions and messages.
  ///
  /// Returns `false` if the document does not exist for this owner.
  fn delete_document(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Open a new session on a document. Returns `None` if the document does
  /// not exist for this owner.
  fn create_session(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Option<ChatSession>, Self::Error>> + Send + '_;

  /// The most recently created session on a document, if any.
  fn latest_session(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Option<ChatSession>, Self::Error>> + Send + '_;

  /// The most recently created session on a document, opening one if there
  /// is none yet. Lookup and creation are atomic, so concurrent callers on
  /// a fresh document share a single session. The flag is `true` when this
  /// call created it.
  ///
  /// Returns `None` if the document does not exist for this owner.
  fn latest_or_create_session(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Option<(ChatSession, bool)>, Self::Error>> + Send + '_;

  /// All sessions on a document, newest first.
  fn list_sessions(
    &self,
    owner: Uuid,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChatSession>, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    owner: Uuid,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Option<ChatSession>, Self::Error>> + Send + '_;

  // ── Messages (append-only) ────────────────────────────────────────────

  /// Append a message to a session and bump the session's `updated_at`.
  ///
  /// Returns `None` if the session does not exist for this owner.
  fn append_message(
    &self,
    owner: Uuid,
    session_id: Uuid,
    role: Role,
    content: String,
  ) -> impl Future<Output = Result<Option<ChatMessage>, Self::Error>> + Send + '_;

  /// Messages of a session in creation order. Empty if the session does not
  /// exist for this owner.
  fn list_messages(
    &self,
    owner: Uuid,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;
}
