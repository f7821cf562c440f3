//! Handlers for `/api/users` and `/api/me`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/users` | Body: `{"username":"...","password":"..."}`; no auth; 409 if taken |
//! | `GET`  | `/api/me` | The authenticated user |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use docchat_core::{answer::Answerer, store::DocumentStore, user::User};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{AuthUser, hash_password},
  error::ApiError,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub username: String,
  pub password: String,
}

/// Usernames travel inside Basic credentials, so they cannot contain `:`.
pub fn validate_signup(body: &SignupBody) -> Result<(), ApiError> {
  let name = body.username.as_str();
  if name.trim().is_empty() || name.trim() != name {
    return Err(ApiError::BadRequest(
      "username must be non-empty without surrounding whitespace".to_owned(),
    ));
  }
  if name.chars().count() > MAX_USERNAME_LEN {
    return Err(ApiError::BadRequest(format!(
      "username must be at most {MAX_USERNAME_LEN} characters"
    )));
  }
  if name.contains(':') {
    return Err(ApiError::BadRequest("username must not contain ':'".to_owned()));
  }
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

/// Validate, hash and store a new account. Shared by signup and the
/// server's `--add-user` flag.
pub async fn register<S>(store: &S, body: &SignupBody) -> Result<User, ApiError>
where
  S: DocumentStore,
{
  validate_signup(body)?;

  let hash = hash_password(&body.password)?;
  let user = store
    .create_user(&body.username, &hash)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict(format!("username {:?} is taken", body.username)))?;

  tracing::info!(user_id = %user.user_id, username = %user.username, "registered user");
  Ok(user)
}

/// `POST /api/users` — returns 201 + the new [`User`].
pub async fn signup<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  if !state.config.allow_signup {
    return Err(ApiError::Forbidden("signup is disabled".to_owned()));
  }
  let user = register(state.store.as_ref(), &body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/me`
pub async fn me(AuthUser(user): AuthUser) -> Json<User> { Json(user) }

#[cfg(test)]
mod tests {
  use super::*;
  use docchat_store_sqlite::SqliteStore;

  fn body(username: &str, password: &str) -> SignupBody {
    SignupBody { username: username.to_owned(), password: password.to_owned() }
  }

  #[test]
  fn accepts_ordinary_credentials() {
    assert!(validate_signup(&body("alice", "long-enough")).is_ok());
  }

  #[test]
  fn rejects_bad_usernames() {
    let long = "x".repeat(MAX_USERNAME_LEN + 1);
    for name in ["", " alice", "alice ", "a:b", long.as_str()] {
      assert!(
        matches!(validate_signup(&body(name, "long-enough")), Err(ApiError::BadRequest(_))),
        "accepted {name:?}"
      );
    }
  }

  #[test]
  fn rejects_short_password() {
    let short = "x".repeat(MIN_PASSWORD_LEN - 1);
    assert!(matches!(validate_signup(&body("alice", &short)), Err(ApiError::BadRequest(_))));
  }

  #[tokio::test]
  async fn register_refuses_colon_username_without_storing() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = register(&store, &body("a:b", "long-enough")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert!(store.find_user("a:b").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn register_stores_hash_and_refuses_duplicates() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let user = register(&store, &body("alice", "long-enough")).await.unwrap();
    let record = store.find_user("alice").await.unwrap().unwrap();
    assert_eq!(record.user, user);
    assert!(record.password_hash.starts_with("$argon2"));

    let err = register(&store, &body("alice", "another-one")).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
  }
}
