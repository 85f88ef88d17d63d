//! Next-election resolver
//!
//! **Strategy order** (first success wins):
//! 1. Upcoming: a future-dated election item for the country → `ok`
//! 2. Non-competitive: regime labels rule out elections and no past
//!    election exists → `not_applicable`
//! 3. Term estimate: last election date + term length of the contested
//!    office → `estimated`; a past election without a term length leaves a
//!    partial `unknown` / `term_length_unavailable` with its basis attached
//! 4. Nothing → `unknown` / `no_signal`
//!
//! The past-election lookup is shared by strategies 2 and 3 and by the
//! legislature-control resolver, so it is fetched at most once per context.

use super::regime::RegimeClassifier;
use super::{Attempt, Strategy, StrategyChain};
use crate::models::{
    ElectionBasis, ElectionField, ElectionInfo, ElectionKind, ElectionMethod, FailureKind,
    FieldResult, Provenance, ReasonCode,
};
use crate::sources::{ElectionSource, PastElection, SourceResult};
use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate};
use tokio::sync::OnceCell;
use tracing::debug;

/// Inputs for one election field of one country
pub struct ElectionContext<'a> {
    pub source: &'a dyn ElectionSource,
    /// Country entity id
    pub entity: &'a str,
    pub kind: ElectionKind,
    pub today: NaiveDate,
    /// Already-resolved political system of the same country
    pub political_system: &'a FieldResult<Vec<String>>,
    pub regime: &'a dyn RegimeClassifier,
    past: OnceCell<SourceResult<Option<PastElection>>>,
}

impl<'a> ElectionContext<'a> {
    pub fn new(
        source: &'a dyn ElectionSource,
        entity: &'a str,
        kind: ElectionKind,
        today: NaiveDate,
        political_system: &'a FieldResult<Vec<String>>,
        regime: &'a dyn RegimeClassifier,
    ) -> Self {
        Self {
            source,
            entity,
            kind,
            today,
            political_system,
            regime,
            past: OnceCell::new(),
        }
    }

    /// Most recent past election of this kind (memoized)
    pub async fn past_election(&self) -> &SourceResult<Option<PastElection>> {
        self.past
            .get_or_init(|| self.source.last_election(self.entity, self.kind, self.today))
            .await
    }

    pub fn provenance(&self) -> Vec<Provenance> {
        vec![Provenance::new(self.source.endpoint(), Some(self.entity))]
    }
}

/// `last + term`: whole years move by calendar years (Feb 29 clamps to
/// Feb 28), fractional terms add `round(term * 365.25)` days
pub fn project_date(last: NaiveDate, term_years: f64) -> Option<NaiveDate> {
    if !term_years.is_finite() || term_years <= 0.0 {
        return None;
    }

    if term_years.fract() == 0.0 {
        let months = (term_years as u32).checked_mul(12)?;
        last.checked_add_months(Months::new(months))
    } else {
        let days = (term_years * 365.25).round() as u64;
        last.checked_add_days(Days::new(days))
    }
}

pub struct UpcomingElectionStrategy;

#[async_trait]
impl<'a> Strategy<ElectionContext<'a>, ElectionField> for UpcomingElectionStrategy {
    fn name(&self) -> &'static str {
        "wikidata_upcoming"
    }

    async fn attempt(&self, ctx: &ElectionContext<'a>) -> Attempt<ElectionField> {
        let provenance = ctx.provenance();

        match ctx.source.upcoming_election(ctx.entity, ctx.kind, ctx.today).await {
            Ok(Some(upcoming)) => {
                let info = ElectionInfo {
                    date: upcoming.date,
                    election_name: upcoming.name,
                    election_type: upcoming.election_type,
                };
                Attempt::Resolved(ElectionField::new(
                    FieldResult::ok(info).with_provenance(provenance),
                    Some(ElectionMethod::WikidataUpcoming),
                ))
            }
            Ok(None) => Attempt::declined(FailureKind::NoSignal, provenance),
            Err(failure) => {
                debug!(entity = ctx.entity, kind = ctx.kind.as_str(), failure = %failure, "Upcoming election lookup failed");
                Attempt::declined(failure.kind, provenance)
            }
        }
    }
}

pub struct NonCompetitiveStrategy;

#[async_trait]
impl<'a> Strategy<ElectionContext<'a>, ElectionField> for NonCompetitiveStrategy {
    fn name(&self) -> &'static str {
        "political_system_heuristic"
    }

    // Declines carry no provenance; the term-estimate strategy records the
    // past-election lookup
    async fn attempt(&self, ctx: &ElectionContext<'a>) -> Attempt<ElectionField> {
        let Some(labels) = ctx.political_system.value() else {
            return Attempt::declined(FailureKind::NoSignal, Vec::new());
        };
        if !ctx.regime.is_non_competitive(labels) {
            return Attempt::declined(FailureKind::NoSignal, Vec::new());
        }

        match ctx.past_election().await {
            Ok(None) => {
                let notes = format!(
                    "Political system ({}) indicates no competitive national elections",
                    labels.join(", ")
                );
                Attempt::Resolved(ElectionField::new(
                    FieldResult::not_applicable(ReasonCode::NonCompetitiveSystem)
                        .with_provenance(ctx.provenance())
                        .with_notes(notes),
                    Some(ElectionMethod::PoliticalSystemHeuristic),
                ))
            }
            Ok(Some(_)) => Attempt::declined(FailureKind::NoSignal, Vec::new()),
            Err(failure) => Attempt::declined(failure.kind, Vec::new()),
        }
    }
}

pub struct TermEstimateStrategy;

#[async_trait]
impl<'a> Strategy<ElectionContext<'a>, ElectionField> for TermEstimateStrategy {
    fn name(&self) -> &'static str {
        "estimate_from_last_plus_term"
    }

    async fn attempt(&self, ctx: &ElectionContext<'a>) -> Attempt<ElectionField> {
        let provenance = ctx.provenance();
        let past = match ctx.past_election().await {
            Ok(Some(past)) => past,
            Ok(None) => return Attempt::declined(FailureKind::NoSignal, provenance),
            Err(failure) => return Attempt::declined(failure.kind, provenance),
        };

        let basis = ElectionBasis {
            last_election_name: past.name.clone(),
            last_election_date: past.date,
            office: past.office.clone(),
            term_length_years: past.term_length_years,
        };

        let Some(term) = past.term_length_years else {
            let partial = ElectionField::new(
                FieldResult::unknown(ReasonCode::TermLengthUnavailable).with_notes(format!(
                    "Last election on {} found, but the contested office has no recorded term length",
                    past.date
                )),
                Some(ElectionMethod::EstimateFromLastPlusTerm),
            )
            .with_basis(basis);
            return Attempt::declined_with_fallback(FailureKind::NoSignal, provenance, partial);
        };

        let Some(date) = project_date(past.date, term) else {
            return Attempt::declined(FailureKind::ParseFailure, provenance);
        };

        let mut notes = format!("Projected from the {} election plus a {}-year term", past.date, term);
        if date < ctx.today {
            notes.push_str("; projected date has passed and the next election is not yet recorded");
        }

        let info = ElectionInfo {
            date,
            election_name: None,
            election_type: past.election_type.clone(),
        };
        Attempt::Resolved(
            ElectionField::new(
                FieldResult::estimated(info, ReasonCode::DerivedFromFallback)
                    .with_provenance(provenance)
                    .with_notes(notes),
                Some(ElectionMethod::EstimateFromLastPlusTerm),
            )
            .with_basis(basis),
        )
    }
}

/// The fixed strategy order for election dates
pub fn election_chain<'a>(kind: ElectionKind) -> StrategyChain<ElectionContext<'a>, ElectionField> {
    let field = match kind {
        ElectionKind::Executive => "next_executive",
        ElectionKind::Legislative => "next_legislative",
    };

    StrategyChain::new(field)
        .then(UpcomingElectionStrategy)
        .then(NonCompetitiveStrategy)
        .then(TermEstimateStrategy)
}

/// Resolve the next election of `ctx.kind`
pub async fn resolve(ctx: &ElectionContext<'_>) -> ElectionField {
    election_chain(ctx.kind).run(ctx).await
}
