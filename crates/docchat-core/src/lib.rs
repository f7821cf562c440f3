//! Core types and trait definitions for docchat.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::DocumentStore`]; AI backends implement
//! [`answer::Answerer`].

pub mod answer;
pub mod document;
pub mod error;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
