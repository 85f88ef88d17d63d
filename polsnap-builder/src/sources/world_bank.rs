//! World Bank indicator API client
//!
//! `GET {base}/country/{iso2}/indicator/{code}?format=json&per_page=N&page=P`
//!
//! The API pages by page number; [`IndicatorSource::page`] takes an
//! offset/limit pair and translates it (`page = offset / limit + 1`).
//! Responses are a two-element array `[meta, rows]`; an error response is a
//! one-element array carrying a `message` list.

use super::http::{FetchPolicy, HttpFetcher};
use super::{IndicatorPage, IndicatorSource, Observation, SourceFailure, SourceResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const REQUESTS_PER_SECOND: u32 = 5;

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    value: Option<f64>,
}

/// World Bank indicator client
pub struct WorldBankClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl WorldBankClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> polsnap_common::Result<Self> {
        let fetcher = HttpFetcher::new("world_bank", FetchPolicy::api(REQUESTS_PER_SECOND))?;
        Ok(Self::new(fetcher, base_url))
    }
}

#[async_trait]
impl IndicatorSource for WorldBankClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn page(
        &self,
        iso2: &str,
        indicator: &str,
        offset: usize,
        limit: usize,
    ) -> SourceResult<IndicatorPage> {
        let limit = limit.max(1);
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            iso2.to_ascii_lowercase(),
            indicator
        );
        let per_page = limit.to_string();
        let page = (offset / limit + 1).to_string();

        let body: Value = self
            .fetcher
            .get_json(
                &url,
                &[("format", "json"), ("per_page", &per_page), ("page", &page)],
                None,
            )
            .await?;

        parse_page(&body).map_err(|detail| SourceFailure::parse(&self.base_url, detail))
    }
}

fn parse_page(body: &Value) -> Result<IndicatorPage, String> {
    let parts = body
        .as_array()
        .ok_or_else(|| "expected a JSON array".to_string())?;

    let meta = parts.first().ok_or_else(|| "empty response array".to_string())?;
    if let Some(messages) = meta.get("message") {
        return Err(format!("API error: {}", messages));
    }
    let meta: PageMeta =
        serde_json::from_value(meta.clone()).map_err(|e| format!("bad page metadata: {}", e))?;

    // Out-of-range pages and countries without data return `null` rows
    let rows: Vec<Row> = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(rows) => {
            serde_json::from_value(rows.clone()).map_err(|e| format!("bad rows: {}", e))?
        }
    };

    let observations = rows
        .into_iter()
        .filter_map(|row| {
            let year = row.date.trim().parse::<i32>().ok()?;
            Some(Observation {
                year,
                value: row.value.filter(|v| v.is_finite()),
            })
        })
        .collect();

    Ok(IndicatorPage {
        total: meta.total,
        observations,
    })
}
