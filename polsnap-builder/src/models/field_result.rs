//! FieldResult - uniform tagged outcome for every derived fact
//!
//! Status and value form one sum type ([`Outcome`]), so a record can never
//! claim `ok` without a value or carry a value under `unknown`. On the wire
//! the record is flattened to `{status, value, reason, provenance, notes}`
//! with every key present; deserialization rejects mixed states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed status vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Direct source hit
    Ok,
    /// Derived via a fallback strategy
    Computed,
    /// Projected from indirect evidence
    Estimated,
    /// All strategies exhausted with no signal
    Unknown,
    /// Resolver positively determined the concept does not apply
    NotApplicable,
    /// Source reachable but refused service (anti-bot challenge)
    Blocked,
}

impl FieldStatus {
    /// True for statuses that carry a value
    pub fn carries_value(self) -> bool {
        matches!(self, Self::Ok | Self::Computed | Self::Estimated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Computed => "computed",
            Self::Estimated => "estimated",
            Self::Unknown => "unknown",
            Self::NotApplicable => "not_applicable",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response (connect error, timeout)
    TransportFailure,
    /// Non-2xx response
    HttpError,
    /// Response received but expected fields absent or malformed
    ParseFailure,
    /// Response recognized as an anti-bot challenge
    Blocked,
    /// Query succeeded but returned zero matching rows
    NoSignal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ReasonCode::from(*self).as_str())
    }
}

/// Machine-readable cause code, present whenever status is not `ok`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    TransportFailure,
    HttpError,
    ParseFailure,
    Blocked,
    NoSignal,
    TermLengthUnavailable,
    NonCompetitiveSystem,
    CountryEntityUnavailable,
    DerivedFromFallback,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransportFailure => "transport_failure",
            Self::HttpError => "http_error",
            Self::ParseFailure => "parse_failure",
            Self::Blocked => "blocked",
            Self::NoSignal => "no_signal",
            Self::TermLengthUnavailable => "term_length_unavailable",
            Self::NonCompetitiveSystem => "non_competitive_system",
            Self::CountryEntityUnavailable => "country_entity_unavailable",
            Self::DerivedFromFallback => "derived_from_fallback",
        }
    }

    /// Short human phrase for warning lists
    pub fn describe(self) -> &'static str {
        match self {
            Self::TransportFailure => "source unreachable",
            Self::HttpError => "source returned an HTTP error",
            Self::ParseFailure => "source response could not be parsed",
            Self::Blocked => "source served an anti-bot challenge",
            Self::NoSignal => "no matching data at source",
            Self::TermLengthUnavailable => "term length of office unknown",
            Self::NonCompetitiveSystem => "no competitive national elections",
            Self::CountryEntityUnavailable => "country entity could not be resolved",
            Self::DerivedFromFallback => "derived from a fallback source",
        }
    }
}

impl From<FailureKind> for ReasonCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::TransportFailure => Self::TransportFailure,
            FailureKind::HttpError => Self::HttpError,
            FailureKind::ParseFailure => Self::ParseFailure,
            FailureKind::Blocked => Self::Blocked,
            FailureKind::NoSignal => Self::NoSignal,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source consulted while resolving a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Endpoint identifier (query endpoint or page URL)
    pub endpoint: String,
    /// Entity the query was scoped to (e.g. Wikidata QID)
    #[serde(default)]
    pub entity: Option<String>,
    /// When the source was consulted
    pub retrieved_at: DateTime<Utc>,
}

impl Provenance {
    pub fn new(endpoint: impl Into<String>, entity: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.into(),
            entity: entity.map(str::to_string),
            retrieved_at: Utc::now(),
        }
    }
}

/// Status and value as a single sum type
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Computed(T),
    Estimated(T),
    Unknown,
    NotApplicable,
    Blocked,
}

impl<T> Outcome<T> {
    pub fn status(&self) -> FieldStatus {
        match self {
            Self::Ok(_) => FieldStatus::Ok,
            Self::Computed(_) => FieldStatus::Computed,
            Self::Estimated(_) => FieldStatus::Estimated,
            Self::Unknown => FieldStatus::Unknown,
            Self::NotApplicable => FieldStatus::NotApplicable,
            Self::Blocked => FieldStatus::Blocked,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ok(v) | Self::Computed(v) | Self::Estimated(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ok(v) | Self::Computed(v) | Self::Estimated(v) => Some(v),
            _ => None,
        }
    }

    /// Rebuild from a wire status and optional value; `None` for mixed states
    fn from_parts(status: FieldStatus, value: Option<T>) -> Option<Self> {
        match (status, value) {
            (FieldStatus::Ok, Some(v)) => Some(Self::Ok(v)),
            (FieldStatus::Computed, Some(v)) => Some(Self::Computed(v)),
            (FieldStatus::Estimated, Some(v)) => Some(Self::Estimated(v)),
            (FieldStatus::Unknown, None) => Some(Self::Unknown),
            (FieldStatus::NotApplicable, None) => Some(Self::NotApplicable),
            (FieldStatus::Blocked, None) => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Uniform derived-field record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "FieldResultRepr<T>",
    try_from = "FieldResultRepr<T>",
    bound(
        serialize = "T: Serialize + Clone",
        deserialize = "T: Deserialize<'de>"
    )
)]
pub struct FieldResult<T> {
    outcome: Outcome<T>,
    reason: Option<ReasonCode>,
    provenance: Vec<Provenance>,
    notes: Option<String>,
}

impl<T> FieldResult<T> {
    pub fn ok(value: T) -> Self {
        Self::from_outcome(Outcome::Ok(value), None)
    }

    pub fn computed(value: T, reason: ReasonCode) -> Self {
        Self::from_outcome(Outcome::Computed(value), Some(reason))
    }

    pub fn estimated(value: T, reason: ReasonCode) -> Self {
        Self::from_outcome(Outcome::Estimated(value), Some(reason))
    }

    pub fn unknown(reason: ReasonCode) -> Self {
        Self::from_outcome(Outcome::Unknown, Some(reason))
    }

    pub fn not_applicable(reason: ReasonCode) -> Self {
        Self::from_outcome(Outcome::NotApplicable, Some(reason))
    }

    pub fn blocked() -> Self {
        Self::from_outcome(Outcome::Blocked, Some(ReasonCode::Blocked))
    }

    fn from_outcome(outcome: Outcome<T>, reason: Option<ReasonCode>) -> Self {
        Self {
            outcome,
            reason,
            provenance: Vec::new(),
            notes: None,
        }
    }

    pub fn with_provenance(mut self, provenance: Vec<Provenance>) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Prepend sources consulted before the one that produced this result
    pub fn prepend_provenance(&mut self, mut earlier: Vec<Provenance>) {
        earlier.append(&mut self.provenance);
        self.provenance = earlier;
    }

    /// Mark an `ok` record as carried over from an earlier run
    ///
    /// Value and provenance are untouched; only notes change.
    pub(crate) fn into_carried_over(self, notes: String) -> Self {
        Self {
            outcome: self.outcome,
            reason: None,
            provenance: self.provenance,
            notes: Some(notes),
        }
    }

    pub fn status(&self) -> FieldStatus {
        self.outcome.status()
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.value()
    }

    pub fn into_value(self) -> Option<T> {
        self.outcome.into_value()
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        self.reason
    }

    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.status() == FieldStatus::Ok
    }
}

/// Wire shape of [`FieldResult`]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldResultRepr<T> {
    status: FieldStatus,
    value: Option<T>,
    reason: Option<ReasonCode>,
    #[serde(default)]
    provenance: Vec<Provenance>,
    notes: Option<String>,
}

impl<T> From<FieldResult<T>> for FieldResultRepr<T> {
    fn from(field: FieldResult<T>) -> Self {
        let status = field.outcome.status();
        Self {
            status,
            value: field.outcome.into_value(),
            reason: field.reason,
            provenance: field.provenance,
            notes: field.notes,
        }
    }
}

impl<T> TryFrom<FieldResultRepr<T>> for FieldResult<T> {
    type Error = String;

    fn try_from(repr: FieldResultRepr<T>) -> Result<Self, Self::Error> {
        let status = repr.status;
        let has_value = repr.value.is_some();
        let outcome = Outcome::from_parts(status, repr.value).ok_or_else(|| {
            format!(
                "mixed field state: status {} {} a value",
                status,
                if has_value { "with" } else { "without" }
            )
        })?;

        let reason = match (status, repr.reason) {
            (FieldStatus::Ok, _) => None,
            (_, Some(reason)) => Some(reason),
            (_, None) => return Err(format!("status {} requires a reason", status)),
        };

        Ok(Self {
            outcome,
            reason,
            provenance: repr.provenance,
            notes: repr.notes,
        })
    }
}
