//! Chat sessions and the messages exchanged in them.
//!
//! A session is a conversation thread scoped to one document and one user.
//! Messages are append-only and ordered by creation time. The round trip
//! produces alternating user/assistant messages, but alternation is not
//! enforced: a failed AI call leaves a user message without a reply.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
  pub session_id:  Uuid,
  pub owner_id:    Uuid,
  pub document_id: Uuid,
  pub created_at:  DateTime<Utc>,
  /// Bumped whenever a message is appended.
  pub updated_at:  DateTime<Utc>,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Assistant => "assistant",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "user" => Ok(Role::User),
      "assistant" => Ok(Role::Assistant),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub message_id: Uuid,
  pub session_id: Uuid,
  pub role:       Role,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// The outcome of one question: the session it landed in, the stored
/// question and the stored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
  pub session:           ChatSession,
  pub user_message:      ChatMessage,
  pub assistant_message: ChatMessage,
}
