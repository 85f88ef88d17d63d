//! Confidence Scorer
//!
//! Aggregates per-field statuses into one confidence value and a warning
//! list per country.
//!
//! # Scoring Algorithm
//! Start at 1.000. Each field whose status is not `ok` subtracts its
//! penalty and adds a warning. The total is clamped to [0, 1].
//!
//! | Field                          | Penalty |
//! |--------------------------------|---------|
//! | Head of state                  | 0.200   |
//! | Head of government             | 0.200   |
//! | Executive party                | 0.150   |
//! | Political system               | 0.100   |
//! | Legislature control (per body) | 0.100   |
//! | Freedom rating                 | 0.100   |
//! | Next executive election        | 0.050   |
//! | Next legislative election      | 0.050   |
//! | Economic trend                 | 0.030   |
//! | News (no distinct items)       | 0.020   |
//!
//! Arithmetic is in integer thousandths and fields are visited in the fixed
//! order above, so equal inputs give identical scores and warning lists.

use crate::models::{
    CountrySnapshot, FieldResult, FieldStatus, LeaderRole, Quality, ReasonCode, EXECUTIVE_BODY,
};

pub const LEADER_PENALTY: u32 = 200;
pub const EXECUTIVE_PARTY_PENALTY: u32 = 150;
pub const POLITICAL_SYSTEM_PENALTY: u32 = 100;
pub const LEGISLATURE_CONTROL_PENALTY: u32 = 100;
pub const FREEDOM_RATING_PENALTY: u32 = 100;
pub const ELECTION_PENALTY: u32 = 50;
pub const TREND_PENALTY: u32 = 30;
pub const NEWS_PENALTY: u32 = 20;

const FULL_CONFIDENCE: u32 = 1000;

/// Status of one scored field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub label: String,
    pub status: FieldStatus,
    pub reason: Option<ReasonCode>,
    /// Penalty in thousandths
    pub penalty: u32,
}

impl FieldCheck {
    pub fn of<T>(label: impl Into<String>, field: &FieldResult<T>, penalty: u32) -> Self {
        Self {
            label: label.into(),
            status: field.status(),
            reason: field.reason(),
            penalty,
        }
    }

    fn warning(&self) -> String {
        match self.reason {
            Some(reason) => format!(
                "{}: {} ({}: {})",
                self.label,
                self.status,
                reason.as_str(),
                reason.describe()
            ),
            None => format!("{}: {}", self.label, self.status),
        }
    }
}

/// Score a list of checks in the given order
pub fn score(checks: &[FieldCheck]) -> Quality {
    let mut remaining = FULL_CONFIDENCE;
    let mut warnings = Vec::new();

    for check in checks.iter().filter(|check| check.status != FieldStatus::Ok) {
        remaining = remaining.saturating_sub(check.penalty);
        warnings.push(check.warning());
    }

    Quality {
        confidence: f64::from(remaining) / f64::from(FULL_CONFIDENCE),
        warnings,
    }
}

/// Checks for every scored field of a country record, in fixed order
pub fn field_checks(country: &CountrySnapshot) -> Vec<FieldCheck> {
    let mut checks = Vec::new();

    for role in [LeaderRole::HeadOfState, LeaderRole::HeadOfGovernment] {
        let label = match role {
            LeaderRole::HeadOfState => "Head of state",
            LeaderRole::HeadOfGovernment => "Head of government",
        };
        match country.government.leaders.iter().find(|leader| leader.role == role) {
            Some(leader) => checks.push(FieldCheck::of(label, &leader.name, LEADER_PENALTY)),
            None => checks.push(missing(label, LEADER_PENALTY)),
        }
    }

    match country.party_control(EXECUTIVE_BODY) {
        Some(entry) => checks.push(FieldCheck::of(
            "Executive party",
            &entry.controller,
            EXECUTIVE_PARTY_PENALTY,
        )),
        None => checks.push(missing("Executive party", EXECUTIVE_PARTY_PENALTY)),
    }

    checks.push(FieldCheck::of(
        "Political system",
        &country.government.political_system,
        POLITICAL_SYSTEM_PENALTY,
    ));

    for entry in country
        .government
        .party_control
        .iter()
        .filter(|entry| entry.body != EXECUTIVE_BODY)
    {
        checks.push(FieldCheck::of(
            format!("Legislature control ({})", entry.body),
            &entry.controller,
            LEGISLATURE_CONTROL_PENALTY,
        ));
    }

    checks.push(FieldCheck::of(
        "Freedom rating",
        &country.freedom_rating,
        FREEDOM_RATING_PENALTY,
    ));
    checks.push(FieldCheck::of(
        "Next executive election",
        &country.elections.next_executive.result,
        ELECTION_PENALTY,
    ));
    checks.push(FieldCheck::of(
        "Next legislative election",
        &country.elections.next_legislative.result,
        ELECTION_PENALTY,
    ));
    checks.push(FieldCheck::of(
        "Economic trend",
        &country.economic_trend,
        TREND_PENALTY,
    ));

    if country.news.is_empty() {
        checks.push(missing("News", NEWS_PENALTY));
    }

    checks
}

/// Quality block for a country record
pub fn score_country(country: &CountrySnapshot) -> Quality {
    score(&field_checks(country))
}

fn missing(label: &str, penalty: u32) -> FieldCheck {
    FieldCheck {
        label: label.to_string(),
        status: FieldStatus::Unknown,
        reason: Some(ReasonCode::NoSignal),
        penalty,
    }
}
