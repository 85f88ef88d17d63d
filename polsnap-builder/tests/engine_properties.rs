//! Engine-level properties of the field resolution and merge engine
//!
//! Resolvers are driven through the fixture sources in `helpers`.

mod helpers;

use helpers::*;
use polsnap_builder::fusion::sticky_merge;
use polsnap_builder::models::{
    ElectionKind, ElectionMethod, FieldResult, FieldStatus, FreedomRating, FreedomStatus,
    Provenance, ReasonCode,
};
use polsnap_builder::resolvers::election::{self, ElectionContext};
use polsnap_builder::resolvers::freedom::{self, FreedomContext};
use polsnap_builder::resolvers::legislature;
use polsnap_builder::resolvers::regime::KeywordRegimeClassifier;
use polsnap_builder::services::news_deduplicator::NewsDeduplicator;
use polsnap_builder::sources::SourceFailure;
use polsnap_builder::validators::confidence_scorer::{score, FieldCheck};
use std::sync::atomic::Ordering;

const ENTITY: &str = "Q999";

fn today() -> chrono::NaiveDate {
    date(2026, 10, 18)
}

fn republic() -> FieldResult<Vec<String>> {
    FieldResult::ok(vec!["parliamentary republic".to_string()])
}

async fn resolve_election(
    graph: &FixtureGraph,
    kind: ElectionKind,
    political_system: &FieldResult<Vec<String>>,
) -> polsnap_builder::models::ElectionField {
    let regime = KeywordRegimeClassifier::default();
    let ctx = ElectionContext::new(graph, ENTITY, kind, today(), political_system, &regime);
    election::resolve(&ctx).await
}

// ============================================================================
// Strategy ordering
// ============================================================================

#[tokio::test]
async fn test_upcoming_election_beats_term_estimate() {
    let graph = FixtureGraph::default()
        .with_upcoming(
            ElectionKind::Legislative,
            upcoming("2027 general election", date(2027, 5, 6)),
        )
        .with_last(
            ElectionKind::Legislative,
            past("2022 general election", date(2022, 5, 5), Some("Party A"), Some(5.0)),
        );

    let field = resolve_election(&graph, ElectionKind::Legislative, &republic()).await;

    assert_eq!(field.result.status(), FieldStatus::Ok);
    assert_eq!(field.method, Some(ElectionMethod::WikidataUpcoming));
    assert_eq!(field.result.value().unwrap().date, date(2027, 5, 6));
    assert!(field.basis.is_none());
    assert_eq!(graph.last_election_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_term_estimate_used_when_no_upcoming() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Executive,
        past("2024 presidential election", date(2024, 7, 4), Some("Candidate"), Some(4.0)),
    );

    let field = resolve_election(&graph, ElectionKind::Executive, &republic()).await;

    assert_eq!(field.result.status(), FieldStatus::Estimated);
    assert_eq!(field.result.reason(), Some(ReasonCode::DerivedFromFallback));
    assert_eq!(field.method, Some(ElectionMethod::EstimateFromLastPlusTerm));
    assert_eq!(field.result.value().unwrap().date, date(2028, 7, 4));
    let basis = field.basis.expect("basis attached");
    assert_eq!(basis.last_election_date, date(2024, 7, 4));
    assert_eq!(basis.term_length_years, Some(4.0));
    // Upcoming lookup plus past-election lookup
    assert_eq!(field.result.provenance().len(), 2);
}

#[tokio::test]
async fn test_fractional_term_adds_rounded_days() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Executive,
        past("2024 election", date(2024, 7, 4), None, Some(2.5)),
    );

    let field = resolve_election(&graph, ElectionKind::Executive, &republic()).await;

    // round(2.5 * 365.25) = 913 days
    assert_eq!(field.result.value().unwrap().date, date(2027, 1, 3));
}

#[tokio::test]
async fn test_missing_term_keeps_basis_on_unknown() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Executive,
        past("2023 election", date(2023, 3, 1), None, None),
    );

    let field = resolve_election(&graph, ElectionKind::Executive, &republic()).await;

    assert_eq!(field.result.status(), FieldStatus::Unknown);
    assert_eq!(field.result.reason(), Some(ReasonCode::TermLengthUnavailable));
    assert!(field.result.value().is_none());
    assert_eq!(field.basis.unwrap().last_election_date, date(2023, 3, 1));
}

#[tokio::test]
async fn test_no_evidence_is_unknown_no_signal_without_method() {
    let graph = FixtureGraph::default();

    let field = resolve_election(&graph, ElectionKind::Legislative, &republic()).await;

    assert_eq!(field.result.status(), FieldStatus::Unknown);
    assert_eq!(field.result.reason(), Some(ReasonCode::NoSignal));
    assert_eq!(field.method, None);
    assert!(field.basis.is_none());
}

#[tokio::test]
async fn test_past_lookup_failure_surfaces_as_reason() {
    let graph = FixtureGraph::default().with_last_failure(
        ElectionKind::Executive,
        SourceFailure::transport("wikidata", "connection reset"),
    );

    let field = resolve_election(&graph, ElectionKind::Executive, &republic()).await;

    assert_eq!(field.result.status(), FieldStatus::Unknown);
    assert_eq!(field.result.reason(), Some(ReasonCode::TransportFailure));
}

// ============================================================================
// Non-competitive classification
// ============================================================================

#[tokio::test]
async fn test_absolute_monarchy_without_past_election_is_not_applicable() {
    let graph = FixtureGraph::default();
    let system = FieldResult::ok(vec!["absolute monarchy".to_string()]);

    let field = resolve_election(&graph, ElectionKind::Legislative, &system).await;

    assert_eq!(field.result.status(), FieldStatus::NotApplicable);
    assert_eq!(field.result.reason(), Some(ReasonCode::NonCompetitiveSystem));
    assert_eq!(field.method, Some(ElectionMethod::PoliticalSystemHeuristic));
    assert!(field.result.value().is_none());
}

#[tokio::test]
async fn test_monarchy_with_past_election_is_estimated() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Legislative,
        past("2023 consultative election", date(2023, 10, 1), None, Some(4.0)),
    );
    let system = FieldResult::ok(vec!["absolute monarchy".to_string()]);

    let field = resolve_election(&graph, ElectionKind::Legislative, &system).await;

    assert_eq!(field.result.status(), FieldStatus::Estimated);
    assert_eq!(field.result.value().unwrap().date, date(2027, 10, 1));
    // Shared between the heuristic and the estimate
    assert_eq!(graph.last_election_calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Legislature control
// ============================================================================

#[tokio::test]
async fn test_legislature_control_from_last_winner() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Legislative,
        past("2024 general election", date(2024, 7, 4), Some("Labour Party"), Some(5.0)),
    );
    let system = republic();
    let regime = KeywordRegimeClassifier::default();
    let ctx = ElectionContext::new(&graph, ENTITY, ElectionKind::Legislative, today(), &system, &regime);

    let bodies = vec!["House of Commons".to_string(), "House of Lords".to_string()];
    let (entries, basis) = legislature::control(&ctx, &bodies).await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].body, "House of Commons");
    assert_eq!(entries[0].controller.value().map(String::as_str), Some("Labour Party"));
    assert_eq!(entries[0].controller.notes(), Some(legislature::CONTROL_CAVEAT));
    assert_eq!(basis.unwrap().election_date, date(2024, 7, 4));
}

#[tokio::test]
async fn test_legislature_control_never_estimated() {
    let graph = FixtureGraph::default().with_last(
        ElectionKind::Legislative,
        past("2024 general election", date(2024, 7, 4), None, Some(5.0)),
    );
    let system = republic();
    let regime = KeywordRegimeClassifier::default();
    let ctx = ElectionContext::new(&graph, ENTITY, ElectionKind::Legislative, today(), &system, &regime);

    let (entries, basis) = legislature::control(&ctx, &[]).await;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].body, "Legislature");
    assert_eq!(entries[0].controller.status(), FieldStatus::Unknown);
    assert_eq!(entries[0].controller.reason(), Some(ReasonCode::NoSignal));
    assert!(basis.is_some());
}

// ============================================================================
// Freedom rating window
// ============================================================================

#[tokio::test]
async fn test_fallback_year_rating_replaces_older_previous_rating() {
    let ratings = FixtureRatings::default().with_page("kenya", 2023, &rating_html(51, "Partly Free"));
    let ctx = FreedomContext {
        source: &ratings,
        slug: "kenya",
        reference_year: 2025,
    };

    let rating = freedom::resolve(&ctx).await;

    assert_eq!(rating.status(), FieldStatus::Computed);
    assert_eq!(rating.reason(), Some(ReasonCode::DerivedFromFallback));
    assert_eq!(rating.value().unwrap().year, 2023);
    assert_eq!(rating.value().unwrap().score, 51);
    assert_eq!(ratings.requested_years(), vec![2025, 2024, 2023]);
    assert_eq!(rating.provenance().len(), 3);

    // An older carried-over rating never shadows a newer report
    let previous = FieldResult::ok(FreedomRating {
        score: 40,
        status: FreedomStatus::PartlyFree,
        year: 2022,
        source_url: "https://freedomhouse.org/country/kenya/freedom-world/2022".to_string(),
    })
    .with_notes("Carried over from the previous snapshot; refresh failed: http_error");
    let merged = sticky_merge::merge_rating(rating.clone(), Some(&previous));
    assert_eq!(merged, rating);
    assert_eq!(merged.value().unwrap().year, 2023);
}

#[tokio::test]
async fn test_freedom_rating_blocked_when_any_year_challenged() {
    let ratings = FixtureRatings::default()
        .with_failure("kenya", 2025, SourceFailure::blocked("freedom_house"));
    let ctx = FreedomContext {
        source: &ratings,
        slug: "kenya",
        reference_year: 2025,
    };

    let rating = freedom::resolve(&ctx).await;

    assert_eq!(rating.status(), FieldStatus::Blocked);
    assert_eq!(ratings.requested_years(), vec![2025, 2024, 2023, 2022]);
}

// ============================================================================
// Sticky merge
// ============================================================================

fn ok_party(name: &str) -> FieldResult<String> {
    FieldResult::ok(name.to_string())
        .with_provenance(vec![Provenance::new(GRAPH_ENDPOINT, Some(ENTITY))])
}

#[test]
fn test_sticky_merge_rules() {
    let previous = ok_party("Previous Party");

    // ok new wins
    let new = ok_party("New Party");
    assert_eq!(sticky_merge::merge(new.clone(), Some(&previous)), new);

    // failure without previous stays a failure
    let failed: FieldResult<String> = FieldResult::unknown(ReasonCode::HttpError);
    assert_eq!(sticky_merge::merge(failed.clone(), None), failed);

    // failure with ok previous carries the previous value
    let merged = sticky_merge::merge(failed, Some(&previous));
    assert_eq!(merged.status(), FieldStatus::Ok);
    assert_eq!(merged.value(), previous.value());
    assert!(merged.notes().unwrap().contains("refresh failed: http_error"));
}

#[test]
fn test_sticky_merge_is_idempotent() {
    let previous = ok_party("Previous Party");
    let failed: FieldResult<String> = FieldResult::blocked();

    let once = sticky_merge::merge(failed.clone(), Some(&previous));
    let twice = sticky_merge::merge(once.clone(), Some(&previous));
    assert_eq!(once, twice);
}

// ============================================================================
// News dedup
// ============================================================================

#[test]
fn test_dedup_six_of_ten_share_a_topic() {
    let dedup = NewsDeduplicator::new("Kenya", &["Kenyan".to_string()]);
    let mut headlines = vec!["Kenya floods displace thousands in Nairobi"; 6];
    headlines.extend([
        "Central bank cuts lending rate",
        "Nurses strike over pay",
        "Marathon record broken in Berlin",
        "New railway line opens to Mombasa",
    ]);

    for limit in 1..=10 {
        let picked = dedup.select(headlines.clone(), |h| h, limit);
        assert!(picked.len() <= limit.min(5));
        let mut keys: Vec<&String> = picked.iter().map(|(_, k)| k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), picked.len());
    }
}

#[test]
fn test_dedup_never_pads() {
    let dedup = NewsDeduplicator::new("Kenya", &[]);
    let headlines = vec![
        "Floods hit coast",
        "Kenya: floods hit coast",
        "Budget approved",
        "Budget approved by Kenya",
        "Election date set",
    ];
    assert_eq!(dedup.select(headlines, |h| h, 5).len(), 3);
}

// ============================================================================
// Confidence monotonicity
// ============================================================================

#[test]
fn test_confidence_monotone_in_degraded_fields() {
    let labels_and_penalties = [
        ("Head of state", 200),
        ("Head of government", 200),
        ("Executive party", 150),
        ("Political system", 100),
        ("Freedom rating", 100),
        ("Next executive election", 50),
        ("Economic trend", 30),
        ("News", 20),
    ];

    let mut last = 1.0;
    for degraded in 0..=labels_and_penalties.len() {
        let checks: Vec<FieldCheck> = labels_and_penalties
            .iter()
            .enumerate()
            .map(|(i, (label, penalty))| {
                let field: FieldResult<String> = if i < degraded {
                    FieldResult::unknown(ReasonCode::NoSignal)
                } else {
                    FieldResult::ok("value".to_string())
                };
                FieldCheck::of(*label, &field, *penalty)
            })
            .collect();

        let quality = score(&checks);
        if degraded > 0 {
            assert!(quality.confidence < last || quality.confidence == 0.0);
        }
        assert!((0.0..=1.0).contains(&quality.confidence));
        assert_eq!(quality.warnings.len(), degraded);
        last = quality.confidence;
    }
    assert_eq!(last, 0.15);
}
