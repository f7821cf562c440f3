//! Registered users. Every document, session and message belongs to exactly
//! one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
}

/// A user together with the credential used to authenticate them.
///
/// Never serialised: the hash stays inside the server.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub user:          User,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
