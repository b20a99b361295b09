//! HTTP Presentation Layer
//!
//! The thin HTTP surface: health, metrics and the language-preference
//! endpoints. Room and message CRUD live in a separate service.

pub mod handlers;
pub mod routes;
