//! HTTP service for docchat.
//!
//! Exposes an axum [`Router`] with a JSON API backed by any
//! [`DocumentStore`] and any [`Answerer`]. Every `/api` route except signup
//! requires HTTP Basic credentials of a registered user, and every store call
//! is scoped to that user.

pub mod auth;
pub mod chat;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use docchat_ai::AiConfig;
use docchat_core::{answer::Answerer, store::DocumentStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{answer, documents, health, sessions, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DOCCHAT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  #[serde(default = "default_allow_signup")]
  pub allow_signup:     bool,
  /// Largest accepted request body, which bounds document uploads.
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
  #[serde(default = "default_ai_base_url")]
  pub ai_base_url:      String,
  #[serde(default)]
  pub ai_api_key:       String,
  #[serde(default = "default_ai_model")]
  pub ai_model:         String,
  #[serde(default = "default_ai_timeout_secs")]
  pub ai_timeout_secs:  u64,
  #[serde(default = "default_ai_max_tokens")]
  pub ai_max_tokens:    u32,
}

fn default_allow_signup() -> bool { true }
fn default_max_upload_bytes() -> usize { 16 * 1024 * 1024 }
fn default_ai_base_url() -> String { "https://api.openai.com/v1".to_owned() }
fn default_ai_model() -> String { "gpt-4o-mini".to_owned() }
fn default_ai_timeout_secs() -> u64 { 60 }
fn default_ai_max_tokens() -> u32 { 1024 }

impl ServerConfig {
  pub fn ai_config(&self) -> AiConfig {
    AiConfig {
      base_url:     self.ai_base_url.clone(),
      api_key:      self.ai_api_key.clone(),
      model:        self.ai_model.clone(),
      timeout_secs: self.ai_timeout_secs,
      max_tokens:   self.ai_max_tokens,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: DocumentStore, A: Answerer> {
  pub store:    Arc<S>,
  pub answerer: Arc<A>,
  pub config:   Arc<ServerConfig>,
}

impl<S: DocumentStore, A: Answerer> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    AppState {
      store:    self.store.clone(),
      answerer: self.answerer.clone(),
      config:   self.config.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the service.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
  S: DocumentStore + 'static,
  A: Answerer + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    .route("/health",                       get(health::handler))
    // Users
    .route("/api/users",                    post(users::signup::<S, A>))
    .route("/api/me",                       get(users::me))
    // Documents
    .route("/api/documents",                get(documents::list::<S, A>).post(documents::create::<S, A>))
    .route("/api/documents/{id}",           get(documents::get_one::<S, A>).delete(documents::delete_one::<S, A>))
    .route("/api/documents/{id}/sessions",  get(documents::sessions::<S, A>))
    .route("/api/documents/{id}/messages",  get(documents::messages::<S, A>))
    .route("/api/documents/{id}/chat",      post(documents::ask::<S, A>))
    // Sessions
    .route("/api/sessions/{id}/messages",   get(sessions::messages::<S, A>))
    // AI proxy
    .route("/api/answer",                   post(answer::handler::<S, A>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
