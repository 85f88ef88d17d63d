//! GDELT DOC 2.0 article search client
//!
//! `GET {base}?query=...&mode=ArtList&format=json&timespan=7d&maxrecords=N&sort=HybridRel`
//!
//! A search with no hits returns `{}` rather than an empty article list.

use super::http::{FetchPolicy, HttpFetcher};
use super::{Article, NewsQuery, NewsSource, SourceResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

const REQUESTS_PER_SECOND: u32 = 1;

/// GDELT caps `maxrecords` at 250
const MAX_RECORDS: usize = 250;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    seendate: Option<String>,
    domain: Option<String>,
    language: Option<String>,
}

/// GDELT article search client
pub struct GdeltClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl GdeltClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> polsnap_common::Result<Self> {
        let fetcher = HttpFetcher::new("gdelt", FetchPolicy::api(REQUESTS_PER_SECOND))?;
        Ok(Self::new(fetcher, base_url))
    }
}

#[async_trait]
impl NewsSource for GdeltClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>> {
        let search = format!("\"{}\" sourcelang:{}", query.query, query.language);
        let max_records = query.max_records.clamp(1, MAX_RECORDS).to_string();

        let response: SearchResponse = self
            .fetcher
            .get_json(
                &self.base_url,
                &[
                    ("query", search.as_str()),
                    ("mode", "ArtList"),
                    ("format", "json"),
                    ("timespan", query.window.as_str()),
                    ("maxrecords", max_records.as_str()),
                    ("sort", "HybridRel"),
                ],
                None,
            )
            .await?;

        Ok(response
            .articles
            .into_iter()
            .filter_map(into_article)
            .collect())
    }
}

fn into_article(raw: RawArticle) -> Option<Article> {
    let title = raw.title.split_whitespace().collect::<Vec<_>>().join(" ");
    let url = raw.url.trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }

    Some(Article {
        title,
        url,
        source: raw.domain.filter(|d| !d.trim().is_empty()),
        published_at: raw.seendate.as_deref().and_then(parse_seendate),
        language: raw.language,
    })
}

/// GDELT timestamps look like `20261017T143000Z`
fn parse_seendate(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y%m%dT%H%M%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}
