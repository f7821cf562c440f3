//! The `Answerer` trait turns a question about a document into an answer.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question about one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
  pub message:          String,
  /// The full extracted text of the document being asked about.
  pub document_content: String,
  pub session_id:       Uuid,
}

/// Produces a single answer string per request. Implementations make one
/// attempt; callers decide what a failure means.
pub trait Answerer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn answer<'a>(
    &'a self,
    request: &'a AnswerRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
