//! Azure Translator API client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::Translator;
use crate::config::TranslatorSettings;
use crate::infrastructure::metrics;

/// One element of the provider's response array.
#[derive(Debug, Deserialize)]
struct TranslationItem {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

/// Client for the Azure Translator v3 REST API.
///
/// `POST {endpoint}/translate?api-version=3.0&to={lang}` with subscription-key
/// headers and a `[{"text": ...}]` body.
#[derive(Clone)]
pub struct AzureTranslator {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    region: String,
}

impl AzureTranslator {
    pub fn new(settings: &TranslatorSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            key: settings.key.clone(),
            region: settings.region.clone(),
        }
    }

    async fn request(&self, text: &str, target_language: &str) -> Result<String, String> {
        let url = format!(
            "{}/translate?api-version=3.0&to={}",
            self.endpoint, target_language
        );

        let response = self
            .http
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[serde_json::json!({ "text": text })])
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("provider returned {}", status));
        }

        let items: Vec<TranslationItem> = response
            .json()
            .await
            .map_err(|e| format!("bad response body: {}", e))?;

        items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| "empty translations array".to_string())
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> String {
        match self.request(text, target_language).await {
            Ok(translated) => {
                debug!(lang = %target_language, "Translation succeeded");
                metrics::TRANSLATIONS.with_label_values(&["translated"]).inc();
                translated
            }
            Err(e) => {
                warn!(lang = %target_language, error = %e, "Translation failed; falling back to original text");
                metrics::TRANSLATIONS.with_label_values(&["fallback"]).inc();
                text.to_string()
            }
        }
    }
}
