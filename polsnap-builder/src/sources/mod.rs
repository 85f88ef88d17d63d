//! Source Adapters
//!
//! One adapter per upstream service. Each performs bounded-retry network
//! calls and returns either a typed payload or a [`SourceFailure`]; nothing
//! here panics or makes business decisions.
//!
//! # Seams
//! Resolvers depend on the traits below, never on the concrete clients, so
//! the engine can be driven by fixtures in tests:
//! - [`GovernmentSource`] / [`ElectionSource`]: graph-query endpoint (Wikidata)
//! - [`RatingSource`]: per-country per-year rating page (Freedom House)
//! - [`IndicatorSource`]: offset/limit paged indicator series (World Bank)
//! - [`NewsSource`]: article search (GDELT)
//! - [`Translator`]: optional headline translation endpoint

pub mod challenge;
pub mod freedom_house;
pub mod gdelt;
pub mod http;
pub mod translation;
pub mod wikidata;
pub mod world_bank;

use crate::models::{ElectionKind, FailureKind};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Failure marker returned by every adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} from {endpoint}: {detail}")]
pub struct SourceFailure {
    pub kind: FailureKind,
    /// Endpoint identifier the failure came from
    pub endpoint: String,
    pub detail: String,
}

impl SourceFailure {
    pub fn new(kind: FailureKind, endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    pub fn transport(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FailureKind::TransportFailure, endpoint, detail)
    }

    pub fn http(endpoint: impl Into<String>, status: u16) -> Self {
        Self::new(FailureKind::HttpError, endpoint, format!("HTTP {}", status))
    }

    pub fn parse(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FailureKind::ParseFailure, endpoint, detail)
    }

    pub fn blocked(endpoint: impl Into<String>) -> Self {
        Self::new(FailureKind::Blocked, endpoint, "anti-bot challenge page")
    }

    pub fn no_signal(endpoint: impl Into<String>) -> Self {
        Self::new(FailureKind::NoSignal, endpoint, "no matching rows")
    }
}

/// Adapter result type
pub type SourceResult<T> = Result<T, SourceFailure>;

// ============================================================================
// Raw payload records
// ============================================================================

/// A person holding office, with party if declared
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OfficeHolder {
    pub name: Option<String>,
    pub party: Option<String>,
}

/// Government structure as read from the graph source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GovernmentRecord {
    pub head_of_state: OfficeHolder,
    pub head_of_government: OfficeHolder,
    /// Legislative bodies, sorted and deduplicated
    pub legislature_bodies: Vec<String>,
}

/// A future-dated election item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingElection {
    pub name: Option<String>,
    pub date: NaiveDate,
    pub election_type: Option<String>,
}

/// The most recent past election item, with what it contested
#[derive(Debug, Clone, PartialEq)]
pub struct PastElection {
    pub name: Option<String>,
    pub date: NaiveDate,
    pub election_type: Option<String>,
    /// Declared winner, if recorded
    pub winner: Option<String>,
    /// Contested office label, if recorded
    pub office: Option<String>,
    /// Nominal term length of the contested office in years
    pub term_length_years: Option<f64>,
}

/// Fetched rating page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingPage {
    pub url: String,
    pub html: String,
}

/// One year of an indicator series
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub year: i32,
    pub value: Option<f64>,
}

/// One offset/limit page of an indicator series
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPage {
    /// Total number of observations available at the source
    pub total: usize,
    pub observations: Vec<Observation>,
}

/// One article hit from the news search
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Source language as reported by the search endpoint
    pub language: Option<String>,
}

/// News search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub query: String,
    /// Time window, e.g. "7d"
    pub window: String,
    pub language: String,
    pub max_records: usize,
}

// ============================================================================
// Trait seams
// ============================================================================

/// Country structure from the graph-query endpoint
#[async_trait]
pub trait GovernmentSource: Send + Sync {
    /// Endpoint identifier used in provenance
    fn endpoint(&self) -> &str;

    /// Entity id (e.g. Wikidata QID) for an ISO2 code; `Ok(None)` if absent
    async fn country_entity(&self, iso2: &str) -> SourceResult<Option<String>>;

    /// Political-system labels, deduplicated in source order
    async fn political_system(&self, entity: &str) -> SourceResult<Vec<String>>;

    /// Heads of state/government and legislature bodies
    async fn government(&self, entity: &str) -> SourceResult<GovernmentRecord>;
}

/// Election items from the graph-query endpoint
#[async_trait]
pub trait ElectionSource: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Earliest election of this kind dated on or after `today`
    async fn upcoming_election(
        &self,
        entity: &str,
        kind: ElectionKind,
        today: NaiveDate,
    ) -> SourceResult<Option<UpcomingElection>>;

    /// Latest election of this kind dated on or before `today`
    async fn last_election(
        &self,
        entity: &str,
        kind: ElectionKind,
        today: NaiveDate,
    ) -> SourceResult<Option<PastElection>>;
}

/// Per-country per-year rating page
#[async_trait]
pub trait RatingSource: Send + Sync {
    /// Page URL for a country slug and report year
    fn page_url(&self, slug: &str, year: i32) -> String;

    async fn rating_page(&self, slug: &str, year: i32) -> SourceResult<RatingPage>;
}

/// Tabular indicator endpoint paged by offset/limit
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn page(
        &self,
        iso2: &str,
        indicator: &str,
        offset: usize,
        limit: usize,
    ) -> SourceResult<IndicatorPage>;
}

/// Article search endpoint
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>>;
}

/// Optional translation endpoint
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> SourceResult<String>;
}

/// Parse a graph-source timestamp ("2028-11-07T00:00:00Z") or bare date
pub fn parse_source_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_start_matches('+');
    let date_part = trimmed.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
