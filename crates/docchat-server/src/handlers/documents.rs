//! Handlers for `/api/documents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/documents` | Summaries, newest first |
//! | `POST`   | `/api/documents` | Body: [`CreateDocumentBody`]; returns 201 + stored document |
//! | `GET`    | `/api/documents/{id}` | Full document including content |
//! | `DELETE` | `/api/documents/{id}` | 204; sessions and messages go with it |
//! | `GET`    | `/api/documents/{id}/sessions` | Sessions, newest first |
//! | `GET`    | `/api/documents/{id}/messages` | Messages of the latest session |
//! | `POST`   | `/api/documents/{id}/chat` | Body: `{"message":"..."}`; returns the exchange |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use docchat_core::{
  answer::Answerer,
  document::{Document, DocumentSummary, NewDocument},
  session::{ChatExchange, ChatMessage, ChatSession},
  store::DocumentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, chat, error::ApiError};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("document {id} not found")) }

/// Fail with 404 unless the document exists for `owner`.
async fn require_document<S>(store: &S, owner: Uuid, id: Uuid) -> Result<Document, ApiError>
where
  S: DocumentStore,
{
  store
    .get_document(owner, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/documents`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
) -> Result<Json<Vec<DocumentSummary>>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let documents = state
    .store
    .list_documents(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(documents))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/documents`. The text has already been
/// extracted by the client.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentBody {
  pub title:      String,
  pub content:    String,
  /// Defaults to `text/plain`.
  pub mime_type:  Option<String>,
  /// Size of the original file; defaults to the length of `content`.
  pub size_bytes: Option<u64>,
}

impl CreateDocumentBody {
  fn into_new_document(self) -> Result<NewDocument, ApiError> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(ApiError::BadRequest("title must not be empty".to_owned()));
    }
    if self.content.trim().is_empty() {
      return Err(ApiError::BadRequest("document has no text content".to_owned()));
    }
    Ok(NewDocument {
      title:      title.to_owned(),
      size_bytes: self.size_bytes.unwrap_or(self.content.len() as u64),
      mime_type:  self.mime_type.unwrap_or_else(|| "text/plain".to_owned()),
      content:    self.content,
    })
  }
}

/// `POST /api/documents` — returns 201 + the stored [`Document`].
pub async fn create<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Json(body): Json<CreateDocumentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let input = body.into_new_document()?;
  let document = state
    .store
    .create_document(user.user_id, input)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    document_id = %document.document_id,
    mime_type = %document.mime_type,
    size_bytes = document.size_bytes,
    "stored document"
  );
  Ok((StatusCode::CREATED, Json(document)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/documents/{id}`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let document = require_document(state.store.as_ref(), user.user_id, id).await?;
  Ok(Json(document))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/documents/{id}` — 204, or 404 if not visible.
pub async fn delete_one<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let deleted = state
    .store
    .delete_document(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found(id));
  }
  tracing::info!(document_id = %id, "deleted document");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Sessions & history ───────────────────────────────────────────────────────

/// `GET /api/documents/{id}/sessions`
pub async fn sessions<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatSession>>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  require_document(state.store.as_ref(), user.user_id, id).await?;
  let sessions = state
    .store
    .list_sessions(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

/// `GET /api/documents/{id}/messages` — the conversation a chat view opens
/// with. Empty until the first question.
pub async fn messages<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  require_document(state.store.as_ref(), user.user_id, id).await?;
  let latest = state
    .store
    .latest_session(user.user_id, id)
    .await
    .map_err(ApiError::store)?;

  let messages = match latest {
    Some(session) => state
      .store
      .list_messages(user.user_id, session.session_id)
      .await
      .map_err(ApiError::store)?,
    None => Vec::new(),
  };
  Ok(Json(messages))
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  pub message: String,
}

/// `POST /api/documents/{id}/chat`
pub async fn ask<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
  Json(body): Json<ChatBody>,
) -> Result<Json<ChatExchange>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let exchange = chat::ask(
    state.store.as_ref(),
    state.answerer.as_ref(),
    user.user_id,
    id,
    body.message,
  )
  .await?;
  Ok(Json(exchange))
}
