//! JSON handlers, one module per resource.

pub mod answer;
pub mod documents;
pub mod health;
pub mod sessions;
pub mod users;
