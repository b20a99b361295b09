//! Translation Provider Module
//!
//! HTTP client for the external translation API. Translation is best-effort
//! everywhere in the system, so the seam is infallible: any provider problem
//! degrades to the original text.

mod azure;

pub use azure::AzureTranslator;

use async_trait::async_trait;

/// Translation seam.
///
/// Implementations must not fail; on provider errors they return the source
/// text unchanged so the caller never has to branch.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> String;
}
