//! Integration tests for `SqliteStore` against an in-memory database.

use docchat_core::{
  document::NewDocument,
  session::Role,
  store::DocumentStore,
  user::User,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.create_user(name, "$argon2id$v=19$stub")
    .await
    .unwrap()
    .expect("fresh username")
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let record = s.find_user("alice").await.unwrap().unwrap();
  assert_eq!(record.user, alice);
  assert_eq!(record.password_hash, "$argon2id$v=19$stub");
}

#[tokio::test]
async fn duplicate_username_is_refused() {
  let s = store().await;
  user(&s, "alice").await;
  assert!(s.create_user("alice", "other").await.unwrap().is_none());
  assert_eq!(s.count_rows("users").await.unwrap(), 1);
}

#[tokio::test]
async fn find_missing_user_returns_none() {
  let s = store().await;
  assert!(s.find_user("nobody").await.unwrap().is_none());
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn document_content_is_stored_exactly() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let text = "Line one\r\n\n  indented line\ttab\nünïcödé ✓\n\n";

  let doc = s
    .create_document(alice.user_id, NewDocument::text("notes.txt", text))
    .await
    .unwrap();
  assert_eq!(doc.created_at, doc.updated_at);

  let fetched = s.get_document(alice.user_id, doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.content, text);
  assert_eq!(fetched, doc);
}

#[tokio::test]
async fn list_documents_newest_first_without_content() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let first = s.create_document(alice.user_id, NewDocument::text("a", "one")).await.unwrap();
  let second = s.create_document(alice.user_id, NewDocument::text("b", "two")).await.unwrap();

  let docs = s.list_documents(alice.user_id).await.unwrap();
  let ids: Vec<_> = docs.iter().map(|d| d.document_id).collect();
  assert_eq!(ids, vec![second.document_id, first.document_id]);
  assert_eq!(docs[0].size_bytes, 3);
}

#[tokio::test]
async fn documents_are_invisible_to_other_owners() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let doc = s.create_document(alice.user_id, NewDocument::text("a", "secret")).await.unwrap();

  assert!(s.get_document(bob.user_id, doc.document_id).await.unwrap().is_none());
  assert!(s.list_documents(bob.user_id).await.unwrap().is_empty());
  assert!(!s.delete_document(bob.user_id, doc.document_id).await.unwrap());
  assert!(s.create_session(bob.user_id, doc.document_id).await.unwrap().is_none());

  // Still there for the owner.
  assert!(s.get_document(alice.user_id, doc.document_id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_missing_document_returns_false() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  assert!(!s.delete_document(alice.user_id, Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn deleting_a_document_cascades_to_sessions_and_messages() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();
  let other = s.create_document(alice.user_id, NewDocument::text("b", "kept")).await.unwrap();

  let session = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();
  s.append_message(alice.user_id, session.session_id, Role::User, "q".into())
    .await
    .unwrap()
    .unwrap();
  s.append_message(alice.user_id, session.session_id, Role::Assistant, "a".into())
    .await
    .unwrap()
    .unwrap();
  let kept = s.create_session(alice.user_id, other.document_id).await.unwrap().unwrap();
  s.append_message(alice.user_id, kept.session_id, Role::User, "q".into())
    .await
    .unwrap()
    .unwrap();

  assert!(s.delete_document(alice.user_id, doc.document_id).await.unwrap());

  assert!(s.get_document(alice.user_id, doc.document_id).await.unwrap().is_none());
  assert!(s.get_session(alice.user_id, session.session_id).await.unwrap().is_none());
  assert!(s.list_messages(alice.user_id, session.session_id).await.unwrap().is_empty());
  assert_eq!(s.count_rows("chat_sessions").await.unwrap(), 1);
  assert_eq!(s.count_rows("chat_messages").await.unwrap(), 1);
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn latest_session_is_none_before_first_interaction() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();

  assert!(s.latest_session(alice.user_id, doc.document_id).await.unwrap().is_none());
  assert!(s.list_sessions(alice.user_id, doc.document_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn latest_session_is_the_most_recently_created() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();

  let older = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();
  let newer = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();

  // Appending to the older one must not change which is latest.
  s.append_message(alice.user_id, older.session_id, Role::User, "hi".into())
    .await
    .unwrap()
    .unwrap();

  let latest = s.latest_session(alice.user_id, doc.document_id).await.unwrap().unwrap();
  assert_eq!(latest.session_id, newer.session_id);

  let all = s.list_sessions(alice.user_id, doc.document_id).await.unwrap();
  let ids: Vec<_> = all.iter().map(|x| x.session_id).collect();
  assert_eq!(ids, vec![newer.session_id, older.session_id]);
}

#[tokio::test]
async fn latest_or_create_opens_once_then_reuses() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();

  let (first, created) = s
    .latest_or_create_session(alice.user_id, doc.document_id)
    .await
    .unwrap()
    .unwrap();
  assert!(created);
  assert_eq!(first.document_id, doc.document_id);
  assert_eq!(first.owner_id, alice.user_id);

  let (again, created) = s
    .latest_or_create_session(alice.user_id, doc.document_id)
    .await
    .unwrap()
    .unwrap();
  assert!(!created);
  assert_eq!(again, first);

  assert!(s.latest_or_create_session(bob.user_id, doc.document_id).await.unwrap().is_none());
  assert!(s.latest_or_create_session(alice.user_id, Uuid::new_v4()).await.unwrap().is_none());
  assert_eq!(s.count_rows("chat_sessions").await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_first_sessions_share_one_row() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();

  let (a, b) = tokio::join!(
    s.latest_or_create_session(alice.user_id, doc.document_id),
    s.latest_or_create_session(alice.user_id, doc.document_id),
  );
  let (a, a_created) = a.unwrap().unwrap();
  let (b, b_created) = b.unwrap().unwrap();
  assert_eq!(a.session_id, b.session_id);
  assert!(a_created ^ b_created);
  assert_eq!(s.list_sessions(alice.user_id, doc.document_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_session_for_missing_document_returns_none() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  assert!(s.create_session(alice.user_id, Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn messages_come_back_in_creation_order() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();
  let session = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();

  let contents = ["first", "second", "third", "fourth"];
  for (i, c) in contents.iter().enumerate() {
    let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
    s.append_message(alice.user_id, session.session_id, role, (*c).into())
      .await
      .unwrap()
      .unwrap();
  }

  let messages = s.list_messages(alice.user_id, session.session_id).await.unwrap();
  let got: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
  assert_eq!(got, contents);
  assert_eq!(messages[0].role, Role::User);
  assert_eq!(messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn append_bumps_session_updated_at() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();
  let session = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();

  let msg = s
    .append_message(alice.user_id, session.session_id, Role::User, "hello".into())
    .await
    .unwrap()
    .unwrap();

  let fetched = s.get_session(alice.user_id, session.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.updated_at, msg.created_at);
  assert_eq!(fetched.created_at, session.created_at);
}

#[tokio::test]
async fn messages_are_scoped_to_the_session_owner() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let doc = s.create_document(alice.user_id, NewDocument::text("a", "text")).await.unwrap();
  let session = s.create_session(alice.user_id, doc.document_id).await.unwrap().unwrap();
  s.append_message(alice.user_id, session.session_id, Role::User, "mine".into())
    .await
    .unwrap()
    .unwrap();

  assert!(s.get_session(bob.user_id, session.session_id).await.unwrap().is_none());
  assert!(s.list_messages(bob.user_id, session.session_id).await.unwrap().is_empty());
  assert!(
    s.append_message(bob.user_id, session.session_id, Role::User, "intrude".into())
      .await
      .unwrap()
      .is_none()
  );
  assert_eq!(s.count_rows("chat_messages").await.unwrap(), 1);
}

#[tokio::test]
async fn store_survives_reopen_on_disk() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("store.db");

  let doc_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    let alice = user(&s, "alice").await;
    s.create_document(alice.user_id, NewDocument::text("a", "persisted"))
      .await
      .unwrap()
      .document_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let alice = s.find_user("alice").await.unwrap().unwrap().user;
  let doc = s.get_document(alice.user_id, doc_id).await.unwrap().unwrap();
  assert_eq!(doc.content, "persisted");
}
