//! `docchat` — command-line client for the docchat server.
//!
//! # Usage
//!
//! ```
//! docchat --user alice --password secret upload paper.pdf
//! docchat --config ~/.config/docchat/config.toml ask <document-id> "What is the main claim?"
//! ```

mod client;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use docchat_core::{
  document::NewDocument,
  session::{ChatMessage, Role},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "docchat", about = "Ask questions about your documents")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the docchat server (default: http://localhost:8080).
  #[arg(long, env = "DOCCHAT_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "DOCCHAT_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "DOCCHAT_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register the configured username and password.
  Signup,
  /// Extract the text of a PDF or text file and upload it.
  Upload {
    file:  PathBuf,
    /// Title to store; defaults to the file name.
    #[arg(long)]
    title: Option<String>,
  },
  /// List your documents.
  List,
  /// Print a document's extracted text.
  Show { id: Uuid },
  /// Delete a document with its conversation.
  Delete { id: Uuid },
  /// Ask a question about a document.
  Ask { document: Uuid, message: String },
  /// Print the conversation on a document.
  History { document: Uuid },
  /// List the chat sessions on a document.
  Sessions { document: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  if let Err(e) = run(Args::parse()).await {
    eprintln!("error: {e:#}");
    std::process::exit(1);
  }
}

async fn run(args: Args) -> Result<()> {
  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Signup => {
      let user = client.signup().await?;
      println!("registered {} ({})", user.username, user.user_id);
    }
    Command::Upload { file, title } => {
      let document = read_document(&file, title)?;
      let stored = client.upload(&document).await?;
      println!("{}\t{}", stored.document_id, stored.title);
    }
    Command::List => {
      for doc in client.list_documents().await? {
        println!(
          "{}\t{}\t{}\t{} bytes\t{}",
          doc.document_id,
          doc.title,
          doc.mime_type,
          doc.size_bytes,
          doc.created_at.format("%Y-%m-%d %H:%M"),
        );
      }
    }
    Command::Show { id } => {
      let doc = client.get_document(id).await?;
      print!("{}", doc.content);
      if !doc.content.ends_with('\n') {
        println!();
      }
    }
    Command::Delete { id } => {
      client.delete_document(id).await?;
      println!("deleted {id}");
    }
    Command::Ask { document, message } => {
      let exchange = client.ask(document, &message).await?;
      println!("{}", exchange.assistant_message.content);
    }
    Command::History { document } => {
      for message in client.history(document).await? {
        print_message(&message);
      }
    }
    Command::Sessions { document } => {
      for session in client.sessions(document).await? {
        println!(
          "{}\tcreated {}\tupdated {}",
          session.session_id,
          session.created_at.format("%Y-%m-%d %H:%M"),
          session.updated_at.format("%Y-%m-%d %H:%M"),
        );
      }
    }
  }

  Ok(())
}

/// Read `path` and extract its text locally. Only the text is uploaded;
/// the reported size is that of the original file.
fn read_document(path: &Path, title: Option<String>) -> Result<NewDocument> {
  let Some(mime_type) = docchat_extract::mime_for_path(path) else {
    bail!("unsupported file type: {} (expected .pdf, .txt or .md)", path.display());
  };
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  let content = docchat_extract::extract_text(&bytes, mime_type)
    .with_context(|| format!("extracting text from {}", path.display()))?;
  if content.trim().is_empty() {
    bail!("no text could be extracted from {}", path.display());
  }
  tracing::debug!(path = %path.display(), mime_type, text_bytes = content.len(), "extracted document");

  let title = match title {
    Some(t) => t,
    None => path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .with_context(|| format!("no file name in {}", path.display()))?,
  };

  Ok(NewDocument {
    title,
    content,
    mime_type: mime_type.to_owned(),
    size_bytes: bytes.len() as u64,
  })
}

fn print_message(message: &ChatMessage) {
  let who = match message.role {
    Role::User => "you",
    Role::Assistant => "assistant",
  };
  println!("[{}] {who}:", message.created_at.format("%Y-%m-%d %H:%M"));
  println!("{}\n", message.content);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_file_is_uploaded_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    let text = "# Notes\n\n  keep   this spacing\n";
    std::fs::write(&path, text).unwrap();

    let doc = read_document(&path, None).unwrap();
    assert_eq!(doc.title, "notes.md");
    assert_eq!(doc.content, text);
    assert_eq!(doc.mime_type, "text/markdown");
    assert_eq!(doc.size_bytes, text.len() as u64);
  }

  #[test]
  fn explicit_title_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "hello").unwrap();
    assert_eq!(read_document(&path, Some("Greeting".into())).unwrap().title, "Greeting");
  }

  #[test]
  fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.png");
    std::fs::write(&path, [0u8, 1, 2]).unwrap();
    let err = read_document(&path, None).unwrap_err();
    assert!(err.to_string().contains("unsupported file type"));
  }

  #[test]
  fn empty_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.txt");
    std::fs::write(&path, " \n\t\n").unwrap();
    assert!(read_document(&path, None).is_err());
  }
}
