//! Freedom House rating page client
//!
//! Fetches `{base}/{slug}/freedom-world/{year}` and extracts the global
//! freedom score and status from the page text.
//!
//! **Layouts tried in order** (after tags are stripped and whitespace collapsed):
//! 1. `Partly Free 54 100`
//! 2. `Global Freedom Score 54 100 Partly Free`
//! 3. `54 / 100 Partly Free`

use super::http::{FetchPolicy, HttpFetcher};
use super::{RatingPage, RatingSource, SourceResult};
use crate::models::FreedomStatus;
use async_trait::async_trait;
use polsnap_common::countries::slugify;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Environment variable naming an HTTP proxy for rating page fetches
pub const PROXY_ENV_VAR: &str = "POLSNAP_FREEDOM_PROXY";

/// One page per second; the site is aggressive about bot traffic
const REQUESTS_PER_SECOND: u32 = 1;

const STATUS_PATTERN: &str = r"(Free|Partly Free|Not Free)";

/// Freedom House page client
pub struct FreedomHouseClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl FreedomHouseClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client with the browser fetch policy and an optional proxy
    pub fn with_base_url(
        base_url: impl Into<String>,
        proxy: Option<String>,
    ) -> polsnap_common::Result<Self> {
        let policy = FetchPolicy::browser(REQUESTS_PER_SECOND).with_proxy(proxy);
        let fetcher = HttpFetcher::new("freedom_house", policy)?;
        Ok(Self::new(fetcher, base_url))
    }
}

#[async_trait]
impl RatingSource for FreedomHouseClient {
    fn page_url(&self, slug: &str, year: i32) -> String {
        format!("{}/{}/freedom-world/{}", self.base_url, slug, year)
    }

    async fn rating_page(&self, slug: &str, year: i32) -> SourceResult<RatingPage> {
        let url = self.page_url(slug, year);
        let html = self
            .fetcher
            .get_text(&url, &[], Some("text/html,application/xhtml+xml"))
            .await?;
        Ok(RatingPage { url, html })
    }
}

/// URL slug for a country, honoring the override table
pub fn country_slug(country: &str, overrides: &BTreeMap<String, String>) -> String {
    overrides
        .get(country)
        .cloned()
        .unwrap_or_else(|| slugify(country))
}

// (pattern, score group, status group)
static LAYOUTS: LazyLock<Vec<(Regex, usize, usize)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(&format!(r"(?i){}\s+(\d{{1,3}})\s+100\b", STATUS_PATTERN)).unwrap(),
            2,
            1,
        ),
        (
            Regex::new(&format!(
                r"(?i)Global Freedom Score\s+(\d{{1,3}})\s+100\s+{}",
                STATUS_PATTERN
            ))
            .unwrap(),
            1,
            2,
        ),
        (
            Regex::new(&format!(r"(?i)\b(\d{{1,3}})\s*/\s*100\s+{}", STATUS_PATTERN)).unwrap(),
            1,
            2,
        ),
    ]
});

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<[^>]*>|&nbsp;").unwrap()
});

/// Page text with tags removed and whitespace collapsed
fn page_text(html: &str) -> String {
    MARKUP
        .replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract `(score, status)` from a rating page
///
/// Returns `None` unless one layout yields both a score in 0-100 and a
/// recognized status.
pub fn parse_score_and_status(html: &str) -> Option<(u8, FreedomStatus)> {
    let text = page_text(html);

    LAYOUTS.iter().find_map(|(re, score_group, status_group)| {
        re.captures_iter(&text).find_map(|caps| {
            let score: u8 = caps.get(*score_group)?.as_str().parse().ok()?;
            if score > 100 {
                return None;
            }
            let status = FreedomStatus::parse(caps.get(*status_group)?.as_str())?;
            Some((score, status))
        })
    })
}
