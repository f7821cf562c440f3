//! HTTP Basic-auth extractor backed by the user table.
//!
//! Each request carries `username:password`; the password is checked against
//! the user's argon2 hash. The resulting [`AuthUser`] is the owner id every
//! store call is scoped to.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use docchat_core::{answer::Answerer, store::DocumentStore, user::User};
use rand_core::OsRng;

use crate::{AppState, error::ApiError};

/// The authenticated caller. Present in a handler means the request carried
/// valid credentials.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Produce an argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Split a `Basic` authorization header into username and password.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// Verify credentials from headers against the store.
pub async fn verify_auth<S>(headers: &HeaderMap, store: &S) -> Result<User, ApiError>
where
  S: DocumentStore,
{
  let (username, password) = basic_credentials(headers)?;

  let record = store
    .find_user(&username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&record.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(record.user)
}

impl<S, A> FromRequestParts<AppState<S, A>> for AuthUser
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    let user = verify_auth(&parts.headers, state.store.as_ref()).await?;
    Ok(AuthUser(user))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::header;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, value.parse().unwrap());
    h
  }

  #[test]
  fn parses_basic_credentials() {
    let h = headers(&format!("Basic {}", B64.encode("alice:pa:ss")));
    let (user, pass) = basic_credentials(&h).unwrap();
    assert_eq!(user, "alice");
    assert_eq!(pass, "pa:ss");
  }

  #[test]
  fn missing_header() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let h = headers("Basic !!!not-base64!!!");
    assert!(matches!(basic_credentials(&h), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn wrong_scheme() {
    let h = headers("Bearer abc");
    assert!(matches!(basic_credentials(&h), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn no_colon() {
    let h = headers(&format!("Basic {}", B64.encode("alice")));
    assert!(matches!(basic_credentials(&h), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn hashed_password_verifies() {
    let hash = hash_password("secret").unwrap();
    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(Argon2::default().verify_password(b"secret", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
  }
}
