//! Optional headline translation (LibreTranslate-compatible)
//!
//! Enabled only when `POLSNAP_TRANSLATE_URL` is set. The URL is the full
//! translate endpoint, e.g. `https://libretranslate.example/translate`.

use super::http::{FetchPolicy, HttpFetcher};
use super::{SourceFailure, SourceResult, Translator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const TRANSLATE_URL_ENV_VAR: &str = "POLSNAP_TRANSLATE_URL";
pub const TRANSLATE_API_KEY_ENV_VAR: &str = "POLSNAP_TRANSLATE_API_KEY";

const REQUESTS_PER_SECOND: u32 = 2;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// LibreTranslate-compatible client
pub struct LibreTranslateClient {
    fetcher: HttpFetcher,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> polsnap_common::Result<Self> {
        let fetcher = HttpFetcher::new("translation", FetchPolicy::api(REQUESTS_PER_SECOND))?;
        Ok(Self {
            fetcher,
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, target_language: &str) -> SourceResult<String> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response: TranslateResponse = self.fetcher.post_json(&self.url, &request).await?;
        let translated = response.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(SourceFailure::parse(&self.url, "empty translation"));
        }
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_key() {
        let request = TranslateRequest {
            q: "Выборы",
            source: "auto",
            target: "en",
            format: "text",
            api_key: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["target"], "en");
        assert!(value.get("api_key").is_none());
    }

    #[test]
    fn test_blank_key_ignored() {
        let client = LibreTranslateClient::new("http://localhost:5000/translate", Some(" ".to_string())).unwrap();
        assert!(client.api_key.is_none());
    }
}
