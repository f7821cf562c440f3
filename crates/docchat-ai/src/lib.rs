//! Hosted generative-AI backend for docchat.
//!
//! [`HostedAnswerer`] implements [`Answerer`] against an OpenAI-compatible
//! `chat/completions` endpoint. The API key lives only in the server's
//! configuration; clients never see it.
//!
//! One request per question, no streaming, no retries. Timeouts are the
//! [`reqwest`] client's.

pub mod error;

use std::time::Duration;

use docchat_core::answer::{AnswerRequest, Answerer};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use error::{AiError, Result};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about a \
document the user has uploaded. Base your answers on the document below. If the document \
does not contain the answer, say so plainly.";

/// Connection settings for the hosted API.
#[derive(Debug, Clone)]
pub struct AiConfig {
  /// Base URL up to and including the version segment, e.g.
  /// `https://api.openai.com/v1`.
  pub base_url:     String,
  /// Bearer token; omitted from requests when empty (local gateways).
  pub api_key:      String,
  pub model:        String,
  pub timeout_secs: u64,
  pub max_tokens:   u32,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
  model:      &'a str,
  messages:   Vec<WireMessage<'a>>,
  max_tokens: u32,
  stream:     bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WireMessage<'a> {
  role:    &'static str,
  content: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

/// The system message carries the instructions and the full document text;
/// the user message is the question as typed.
fn build_messages(request: &AnswerRequest) -> Vec<WireMessage<'_>> {
  vec![
    WireMessage {
      role:    "system",
      content: format!("{SYSTEM_PROMPT}\n\nDocument:\n{}", request.document_content).into(),
    },
    WireMessage {
      role:    "user",
      content: request.message.as_str().into(),
    },
  ]
}

fn first_answer(response: CompletionResponse) -> Result<String> {
  response
    .choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .filter(|c| !c.trim().is_empty())
    .ok_or(AiError::EmptyAnswer)
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the hosted chat-completions API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HostedAnswerer {
  client: Client,
  config: AiConfig,
}

impl HostedAnswerer {
  pub fn new(config: AiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  async fn complete(&self, request: &AnswerRequest) -> Result<String> {
    let body = CompletionRequest {
      model:      &self.config.model,
      messages:   build_messages(request),
      max_tokens: self.config.max_tokens,
      stream:     false,
    };

    let mut req = self.client.post(self.url()).json(&body);
    if !self.config.api_key.is_empty() {
      req = req.bearer_auth(&self.config.api_key);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let message = match resp.text().await {
        Ok(text) => text,
        Err(e) => format!("failed to read error body: {e}"),
      };
      return Err(AiError::Api { status: status.as_u16(), message });
    }

    let data: CompletionResponse = resp.json().await?;
    first_answer(data)
  }
}

impl Answerer for HostedAnswerer {
  type Error = AiError;

  async fn answer(&self, request: &AnswerRequest) -> Result<String> {
    tracing::debug!(
      session_id = %request.session_id,
      model = %self.config.model,
      document_bytes = request.document_content.len(),
      "requesting answer"
    );
    self.complete(request).await
  }
}
