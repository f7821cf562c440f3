//! Error type for `docchat-ai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-success status; `message` is its body.
  #[error("ai api error: {status} - {message}")]
  Api { status: u16, message: String },

  #[error("ai api returned no answer")]
  EmptyAnswer,
}

pub type Result<T, E = AiError> = std::result::Result<T, E>;
