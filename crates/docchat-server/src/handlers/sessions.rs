//! Handler for `GET /api/sessions/{id}/messages`.

use axum::{
  Json,
  extract::{Path, State},
};
use docchat_core::{answer::Answerer, session::ChatMessage, store::DocumentStore};
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

/// `GET /api/sessions/{id}/messages` — creation order; 404 if the session is
/// not the caller's.
pub async fn messages<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  state
    .store
    .get_session(user.user_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))?;

  let messages = state
    .store
    .list_messages(user.user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(messages))
}
