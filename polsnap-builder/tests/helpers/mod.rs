//! Test Helper Utilities
//!
//! Fixture implementations of the source traits, so the engine can be
//! driven end to end without the network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use polsnap_builder::models::ElectionKind;
use polsnap_builder::sources::{
    Article, ElectionSource, GovernmentRecord, GovernmentSource, IndicatorPage, IndicatorSource,
    NewsQuery, NewsSource, Observation, OfficeHolder, PastElection, RatingPage, RatingSource,
    SourceFailure, SourceResult, Translator, UpcomingElection,
};
use polsnap_builder::workflow::Sources;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const GRAPH_ENDPOINT: &str = "fixture://graph";
pub const RATING_BASE: &str = "fixture://ratings";
pub const INDICATOR_ENDPOINT: &str = "fixture://indicators";
pub const NEWS_ENDPOINT: &str = "fixture://news";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Graph source (government + elections)
// ============================================================================

/// Graph fixture for one or more entities
pub struct FixtureGraph {
    pub entities: HashMap<String, SourceResult<Option<String>>>,
    pub political_system: SourceResult<Vec<String>>,
    pub government: SourceResult<GovernmentRecord>,
    pub upcoming: HashMap<ElectionKind, SourceResult<Option<UpcomingElection>>>,
    pub last: HashMap<ElectionKind, SourceResult<Option<PastElection>>>,
    pub last_election_calls: AtomicUsize,
}

impl Default for FixtureGraph {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            political_system: Ok(vec!["parliamentary republic".to_string()]),
            government: Ok(government_record(
                ("President Fixture", Some("Independent")),
                ("Prime Minister Fixture", Some("Fixture Party")),
                &["National Assembly"],
            )),
            upcoming: HashMap::new(),
            last: HashMap::new(),
            last_election_calls: AtomicUsize::new(0),
        }
    }
}

impl FixtureGraph {
    pub fn with_entity(mut self, iso2: &str, entity: &str) -> Self {
        self.entities.insert(iso2.to_string(), Ok(Some(entity.to_string())));
        self
    }

    pub fn with_political_system(mut self, labels: &[&str]) -> Self {
        self.political_system = Ok(labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_upcoming(mut self, kind: ElectionKind, election: UpcomingElection) -> Self {
        self.upcoming.insert(kind, Ok(Some(election)));
        self
    }

    pub fn with_last(mut self, kind: ElectionKind, election: PastElection) -> Self {
        self.last.insert(kind, Ok(Some(election)));
        self
    }

    pub fn with_last_failure(mut self, kind: ElectionKind, failure: SourceFailure) -> Self {
        self.last.insert(kind, Err(failure));
        self
    }
}

#[async_trait]
impl GovernmentSource for FixtureGraph {
    fn endpoint(&self) -> &str {
        GRAPH_ENDPOINT
    }

    async fn country_entity(&self, iso2: &str) -> SourceResult<Option<String>> {
        self.entities.get(iso2).cloned().unwrap_or(Ok(None))
    }

    async fn political_system(&self, _entity: &str) -> SourceResult<Vec<String>> {
        self.political_system.clone()
    }

    async fn government(&self, _entity: &str) -> SourceResult<GovernmentRecord> {
        self.government.clone()
    }
}

#[async_trait]
impl ElectionSource for FixtureGraph {
    fn endpoint(&self) -> &str {
        GRAPH_ENDPOINT
    }

    async fn upcoming_election(
        &self,
        _entity: &str,
        kind: ElectionKind,
        _today: NaiveDate,
    ) -> SourceResult<Option<UpcomingElection>> {
        self.upcoming.get(&kind).cloned().unwrap_or(Ok(None))
    }

    async fn last_election(
        &self,
        _entity: &str,
        kind: ElectionKind,
        _today: NaiveDate,
    ) -> SourceResult<Option<PastElection>> {
        self.last_election_calls.fetch_add(1, Ordering::SeqCst);
        self.last.get(&kind).cloned().unwrap_or(Ok(None))
    }
}

pub fn government_record(
    head_of_state: (&str, Option<&str>),
    head_of_government: (&str, Option<&str>),
    bodies: &[&str],
) -> GovernmentRecord {
    GovernmentRecord {
        head_of_state: OfficeHolder {
            name: Some(head_of_state.0.to_string()),
            party: head_of_state.1.map(str::to_string),
        },
        head_of_government: OfficeHolder {
            name: Some(head_of_government.0.to_string()),
            party: head_of_government.1.map(str::to_string),
        },
        legislature_bodies: bodies.iter().map(|b| b.to_string()).collect(),
    }
}

pub fn upcoming(name: &str, on: NaiveDate) -> UpcomingElection {
    UpcomingElection {
        name: Some(name.to_string()),
        date: on,
        election_type: Some("general election".to_string()),
    }
}

pub fn past(name: &str, on: NaiveDate, winner: Option<&str>, term: Option<f64>) -> PastElection {
    PastElection {
        name: Some(name.to_string()),
        date: on,
        election_type: Some("general election".to_string()),
        winner: winner.map(str::to_string),
        office: Some("member of the National Assembly".to_string()),
        term_length_years: term,
    }
}

// ============================================================================
// Rating pages
// ============================================================================

/// Rating pages keyed by (slug, year); anything else is a 404
#[derive(Default)]
pub struct FixtureRatings {
    pub pages: HashMap<(String, i32), SourceResult<String>>,
    pub requests: Mutex<Vec<(String, i32)>>,
}

impl FixtureRatings {
    pub fn with_page(mut self, slug: &str, year: i32, html: &str) -> Self {
        self.pages.insert((slug.to_string(), year), Ok(html.to_string()));
        self
    }

    pub fn with_failure(mut self, slug: &str, year: i32, failure: SourceFailure) -> Self {
        self.pages.insert((slug.to_string(), year), Err(failure));
        self
    }

    pub fn requested_years(&self) -> Vec<i32> {
        self.requests.lock().unwrap().iter().map(|(_, y)| *y).collect()
    }
}

#[async_trait]
impl RatingSource for FixtureRatings {
    fn page_url(&self, slug: &str, year: i32) -> String {
        format!("{}/{}/freedom-world/{}", RATING_BASE, slug, year)
    }

    async fn rating_page(&self, slug: &str, year: i32) -> SourceResult<RatingPage> {
        self.requests.lock().unwrap().push((slug.to_string(), year));
        let html = self
            .pages
            .get(&(slug.to_string(), year))
            .cloned()
            .unwrap_or_else(|| Err(SourceFailure::http("freedom_house", 404)))?;
        Ok(RatingPage {
            url: self.page_url(slug, year),
            html,
        })
    }
}

pub fn rating_html(score: u8, status: &str) -> String {
    format!(
        "<html><body><h2>Global Freedom Score</h2><p>{} <span>100</span></p><p>{}</p></body></html>",
        score, status
    )
}

// ============================================================================
// Indicator series
// ============================================================================

/// Indicator series served newest first through offset/limit paging
#[derive(Default)]
pub struct FixtureIndicators {
    pub observations: Vec<Observation>,
    pub failure: Option<SourceFailure>,
}

impl FixtureIndicators {
    pub fn with_values(values: &[(i32, Option<f64>)]) -> Self {
        let mut observations: Vec<Observation> = values
            .iter()
            .map(|(year, value)| Observation {
                year: *year,
                value: *value,
            })
            .collect();
        observations.sort_by(|a, b| b.year.cmp(&a.year));
        Self {
            observations,
            failure: None,
        }
    }

    pub fn failing(failure: SourceFailure) -> Self {
        Self {
            observations: Vec::new(),
            failure: Some(failure),
        }
    }
}

#[async_trait]
impl IndicatorSource for FixtureIndicators {
    fn endpoint(&self) -> &str {
        INDICATOR_ENDPOINT
    }

    async fn page(
        &self,
        _iso2: &str,
        _indicator: &str,
        offset: usize,
        limit: usize,
    ) -> SourceResult<IndicatorPage> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(IndicatorPage {
            total: self.observations.len(),
            observations: self.observations.iter().skip(offset).take(limit).cloned().collect(),
        })
    }
}

// ============================================================================
// News and translation
// ============================================================================

pub struct FixtureNews {
    pub result: SourceResult<Vec<Article>>,
    pub queries: Mutex<Vec<NewsQuery>>,
}

impl FixtureNews {
    pub fn with_titles(titles: &[&str]) -> Self {
        let articles = titles
            .iter()
            .enumerate()
            .map(|(i, title)| article(title, &format!("https://news.example/{}", i)))
            .collect();
        Self {
            result: Ok(articles),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: SourceFailure) -> Self {
        Self {
            result: Err(failure),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NewsSource for FixtureNews {
    fn endpoint(&self) -> &str {
        NEWS_ENDPOINT
    }

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>> {
        self.queries.lock().unwrap().push(query.clone());
        self.result.clone()
    }
}

pub fn article(title: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        url: url.to_string(),
        source: Some("news.example".to_string()),
        published_at: None,
        language: Some("English".to_string()),
    }
}

/// Dictionary translator; unknown text fails
#[derive(Default)]
pub struct FixtureTranslator {
    pub dictionary: HashMap<String, String>,
}

impl FixtureTranslator {
    pub fn with(mut self, from: &str, to: &str) -> Self {
        self.dictionary.insert(from.to_string(), to.to_string());
        self
    }
}

#[async_trait]
impl Translator for FixtureTranslator {
    async fn translate(&self, text: &str, _target_language: &str) -> SourceResult<String> {
        self.dictionary
            .get(text)
            .cloned()
            .ok_or_else(|| SourceFailure::no_signal("translation"))
    }
}

// ============================================================================
// Assembled source sets
// ============================================================================

pub struct FixtureSet {
    pub graph: Arc<FixtureGraph>,
    pub ratings: Arc<FixtureRatings>,
    pub indicators: Arc<FixtureIndicators>,
    pub news: Arc<FixtureNews>,
    pub translator: Option<Arc<FixtureTranslator>>,
}

impl FixtureSet {
    pub fn new(graph: FixtureGraph, ratings: FixtureRatings) -> Self {
        Self {
            graph: Arc::new(graph),
            ratings: Arc::new(ratings),
            indicators: Arc::new(FixtureIndicators::with_values(&[
                (2020, Some(-2.0)),
                (2021, Some(4.0)),
                (2022, Some(2.5)),
                (2023, Some(1.5)),
                (2024, Some(1.0)),
            ])),
            news: Arc::new(FixtureNews::with_titles(&[
                "Parliament passes budget",
                "Central bank holds rates",
            ])),
            translator: None,
        }
    }

    pub fn with_indicators(mut self, indicators: FixtureIndicators) -> Self {
        self.indicators = Arc::new(indicators);
        self
    }

    pub fn with_news(mut self, news: FixtureNews) -> Self {
        self.news = Arc::new(news);
        self
    }

    pub fn sources(&self) -> Sources {
        Sources {
            government: self.graph.clone(),
            elections: self.graph.clone(),
            ratings: self.ratings.clone(),
            indicators: self.indicators.clone(),
            news: self.news.clone(),
            translator: self
                .translator
                .clone()
                .map(|t| t as Arc<dyn Translator>),
            endpoints: BTreeMap::from([
                ("wikidata".to_string(), GRAPH_ENDPOINT.to_string()),
                ("freedom_house".to_string(), RATING_BASE.to_string()),
                ("world_bank".to_string(), INDICATOR_ENDPOINT.to_string()),
                ("gdelt".to_string(), NEWS_ENDPOINT.to_string()),
            ]),
        }
    }
}
