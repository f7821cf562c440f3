//! The chat round trip: store the question, ask the AI, store the answer.

use docchat_core::{
  answer::{AnswerRequest, Answerer},
  session::{ChatExchange, Role},
  store::DocumentStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Ask a question about one of `owner`'s documents.
///
/// The most recent session on the document is reused; the first question
/// opens one. The user message is persisted before the AI is called, so a
/// failed call leaves it in place with no assistant reply. Nothing is
/// retried.
pub async fn ask<S, A>(
  store:       &S,
  answerer:    &A,
  owner:       Uuid,
  document_id: Uuid,
  message:     String,
) -> Result<ChatExchange, ApiError>
where
  S: DocumentStore,
  A: Answerer,
{
  if message.trim().is_empty() {
    return Err(ApiError::BadRequest("message must not be empty".to_owned()));
  }

  let not_found = || ApiError::NotFound(format!("document {document_id} not found"));

  let document = store
    .get_document(owner, document_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;

  let (session, created) = store
    .latest_or_create_session(owner, document_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  if created {
    tracing::info!(%document_id, session_id = %session.session_id, "opened chat session");
  }

  let user_message = store
    .append_message(owner, session.session_id, Role::User, message)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {} not found", session.session_id)))?;

  let request = AnswerRequest {
    message:          user_message.content.clone(),
    document_content: document.content,
    session_id:       session.session_id,
  };

  let answer = match answerer.answer(&request).await {
    Ok(answer) => answer,
    Err(e) => {
      tracing::warn!(session_id = %session.session_id, error = %e, "answer request failed");
      return Err(ApiError::Upstream(e.to_string()));
    }
  };

  let assistant_message = store
    .append_message(owner, session.session_id, Role::Assistant, answer)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {} not found", session.session_id)))?;

  Ok(ChatExchange { session, user_message, assistant_message })
}
