//! Error type for `docchat-extract`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("pdf error: {0}")]
  Pdf(#[from] lopdf::Error),

  #[error("text is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),

  #[error("unsupported document type: {0}")]
  UnsupportedType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
