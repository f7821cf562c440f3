//! Async HTTP client wrapping the docchat JSON API.

use anyhow::{Context, Result, anyhow};
use docchat_core::{
  document::{Document, DocumentSummary, NewDocument},
  session::{ChatExchange, ChatMessage, ChatSession},
  user::User,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the docchat API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the docchat JSON REST API.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    // Chat requests wait on the AI service, so allow more than a plain CRUD call.
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Decode a success body, or turn the server's `{"error": ...}` into an
  /// error carrying its message.
  async fn decode<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
    let resp = check(what, resp).await?;
    resp.json().await.with_context(|| format!("deserialising {what} response"))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /api/users`
  pub async fn signup(&self) -> Result<User> {
    let resp = self
      .client
      .post(self.url("/users"))
      .json(&json!({
        "username": self.config.username,
        "password": self.config.password,
      }))
      .send()
      .await
      .context("POST /users failed")?;
    Self::decode("POST /users", resp).await
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// `GET /api/documents`
  pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
    let resp = self
      .auth(self.client.get(self.url("/documents")))
      .send()
      .await
      .context("GET /documents failed")?;
    Self::decode("GET /documents", resp).await
  }

  /// `POST /api/documents`
  pub async fn upload(&self, document: &NewDocument) -> Result<Document> {
    let resp = self
      .auth(self.client.post(self.url("/documents")))
      .json(document)
      .send()
      .await
      .context("POST /documents failed")?;
    Self::decode("POST /documents", resp).await
  }

  /// `GET /api/documents/{id}`
  pub async fn get_document(&self, id: Uuid) -> Result<Document> {
    let path = format!("/documents/{id}");
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::decode(&format!("GET {path}"), resp).await
  }

  /// `DELETE /api/documents/{id}`
  pub async fn delete_document(&self, id: Uuid) -> Result<()> {
    let path = format!("/documents/{id}");
    let resp = self
      .auth(self.client.delete(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;
    check(&format!("DELETE {path}"), resp).await?;
    Ok(())
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  /// `POST /api/documents/{id}/chat`
  pub async fn ask(&self, document_id: Uuid, message: &str) -> Result<ChatExchange> {
    let path = format!("/documents/{document_id}/chat");
    let resp = self
      .auth(self.client.post(self.url(&path)))
      .json(&json!({ "message": message }))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::decode(&format!("POST {path}"), resp).await
  }

  /// `GET /api/documents/{id}/messages`
  pub async fn history(&self, document_id: Uuid) -> Result<Vec<ChatMessage>> {
    let path = format!("/documents/{document_id}/messages");
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::decode(&format!("GET {path}"), resp).await
  }

  /// `GET /api/documents/{id}/sessions`
  pub async fn sessions(&self, document_id: Uuid) -> Result<Vec<ChatSession>> {
    let path = format!("/documents/{document_id}/sessions");
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::decode(&format!("GET {path}"), resp).await
  }
}

async fn check(what: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = match resp.text().await {
    Ok(body) => error_message(&body),
    Err(e) => format!("failed to read error body: {e}"),
  };
  Err(anyhow!("{what} → {status}: {message}"))
}

/// The `error` field of a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v.get("error")?.as_str().map(str::to_owned))
    .unwrap_or_else(|| body.trim().to_owned())
}
