//! Election field specialization

use super::field_result::{FieldResult, Provenance, ReasonCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which branch an election belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionKind {
    Executive,
    Legislative,
}

impl ElectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Legislative => "legislative",
        }
    }
}

/// Strategy that produced an election field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionMethod {
    WikidataUpcoming,
    EstimateFromLastPlusTerm,
    PoliticalSystemHeuristic,
}

/// Resolved election payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionInfo {
    pub date: NaiveDate,
    pub election_name: Option<String>,
    pub election_type: Option<String>,
}

/// Evidence used for a term-length projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionBasis {
    pub last_election_name: Option<String>,
    pub last_election_date: NaiveDate,
    /// Contested office label
    pub office: Option<String>,
    pub term_length_years: Option<f64>,
}

/// Election record: a FieldResult plus method and basis
///
/// `basis` may be present even when the status is `unknown`, so partial
/// evidence stays visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionField {
    #[serde(flatten)]
    pub result: FieldResult<ElectionInfo>,
    /// `None` when no strategy produced evidence
    pub method: Option<ElectionMethod>,
    pub basis: Option<ElectionBasis>,
}

impl ElectionField {
    pub fn new(result: FieldResult<ElectionInfo>, method: Option<ElectionMethod>) -> Self {
        Self {
            result,
            method,
            basis: None,
        }
    }

    pub fn with_basis(mut self, basis: ElectionBasis) -> Self {
        self.basis = Some(basis);
        self
    }

    /// Record for a country whose entity could not be resolved at all
    pub fn unavailable(reason: ReasonCode, provenance: Vec<Provenance>) -> Self {
        Self::new(
            FieldResult::unknown(reason).with_provenance(provenance),
            None,
        )
    }
}
