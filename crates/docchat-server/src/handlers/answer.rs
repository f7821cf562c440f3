//! `POST /api/answer` — the bare AI proxy.
//!
//! Takes a message, the full document text and a session id, and returns
//! the answer. Nothing is persisted; the server-held credential never leaves
//! the process.

use axum::{Json, extract::State};
use docchat_core::{
  answer::{AnswerRequest, Answerer},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerBody {
  pub answer: String,
}

pub async fn handler<S, A>(
  State(state): State<AppState<S, A>>,
  AuthUser(user): AuthUser,
  Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerBody>, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  if request.message.trim().is_empty() {
    return Err(ApiError::BadRequest("message must not be empty".to_owned()));
  }

  let answer = state.answerer.answer(&request).await.map_err(|e| {
    tracing::warn!(user_id = %user.user_id, session_id = %request.session_id, error = %e, "answer request failed");
    ApiError::Upstream(e.to_string())
  })?;
  Ok(Json(AnswerBody { answer }))
}
