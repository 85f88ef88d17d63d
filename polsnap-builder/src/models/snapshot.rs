//! Snapshot document model
//!
//! Field names serialize in camelCase to match the published JSON artifact.

use super::election::ElectionField;
use super::field_result::FieldResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body label used for the executive entry of `partyControl`
pub const EXECUTIVE_BODY: &str = "Executive";

/// Body label used when the legislature's own name is unknown
pub const DEFAULT_LEGISLATURE_BODY: &str = "Legislature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderRole {
    HeadOfState,
    HeadOfGovernment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub role: LeaderRole,
    pub name: FieldResult<String>,
    pub party: FieldResult<String>,
}

/// How a party-control entry was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMethod {
    HogPartyElseHosParty,
    WikidataLastLegElectionWinner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyControlEntry {
    pub body: String,
    pub controller: FieldResult<String>,
    pub method: ControlMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Government {
    pub political_system: FieldResult<Vec<String>>,
    pub leaders: Vec<Leader>,
    pub party_control: Vec<PartyControlEntry>,
}

/// Election the legislature-control approximation was read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislatureControlBasis {
    pub election_name: Option<String>,
    pub election_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elections {
    pub next_executive: ElectionField,
    pub next_legislative: ElectionField,
    pub legislature_control_basis: Option<LegislatureControlBasis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreedomStatus {
    #[serde(rename = "Free")]
    Free,
    #[serde(rename = "Partly Free")]
    PartlyFree,
    #[serde(rename = "Not Free")]
    NotFree,
}

impl FreedomStatus {
    /// Case-insensitive parse of the qualitative label
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "free" => Some(Self::Free),
            "partly free" => Some(Self::PartlyFree),
            "not free" => Some(Self::NotFree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreedomRating {
    /// Global freedom score, 0-100
    pub score: u8,
    pub status: FreedomStatus,
    /// Report year the score belongs to
    pub year: i32,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub indicator: String,
    pub latest_year: i32,
    pub latest_value: f64,
    /// Oldest first
    pub points: Vec<TrendPoint>,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub topic_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    /// Aggregate confidence, 0.0-1.0
    pub confidence: f64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySnapshot {
    pub country: String,
    pub iso2: String,
    pub government: Government,
    pub elections: Elections,
    pub freedom_rating: FieldResult<FreedomRating>,
    pub economic_trend: FieldResult<TrendSeries>,
    pub news: Vec<NewsItem>,
    pub quality: Quality,
}

impl CountrySnapshot {
    /// Party-control entry for a body, matched by exact name
    pub fn party_control(&self, body: &str) -> Option<&PartyControlEntry> {
        self.government
            .party_control
            .iter()
            .find(|entry| entry.body == body)
    }
}

/// Top-level output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// ISO-8601 UTC, `Z`-suffixed
    pub generated_at: String,
    pub reference_year: i32,
    pub countries: Vec<CountrySnapshot>,
    /// Endpoint identifiers mapped to base URLs
    pub sources: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(
        generated_at: DateTime<Utc>,
        reference_year: i32,
        countries: Vec<CountrySnapshot>,
        sources: BTreeMap<String, String>,
    ) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            reference_year,
            countries,
            sources,
        }
    }
}
