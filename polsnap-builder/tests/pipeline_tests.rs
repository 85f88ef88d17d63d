//! Per-country pipeline tests over fixture sources

mod helpers;

use helpers::*;
use polsnap_builder::fusion::sticky_merge::PreviousSnapshotIndex;
use polsnap_builder::resolvers::regime::KeywordRegimeClassifier;
use polsnap_builder::models::{
    ElectionKind, ElectionMethod, FieldStatus, LeaderRole, ReasonCode, Snapshot,
};
use polsnap_builder::sources::SourceFailure;
use polsnap_builder::{Pipeline, PipelineConfig, RunContext};
use polsnap_common::CountryRef;
use serde_json::Value;
use std::time::Duration;

fn run_context() -> RunContext {
    RunContext::new(date(2026, 10, 18), None)
}

fn config() -> PipelineConfig {
    PipelineConfig {
        inter_country_delay: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

fn kenya() -> CountryRef {
    CountryRef::new("Kenya", "KE")
}

fn kenya_graph() -> FixtureGraph {
    FixtureGraph::default()
        .with_entity("KE", "Q114")
        .with_upcoming(
            ElectionKind::Executive,
            upcoming("2027 Kenyan general election", date(2027, 8, 10)),
        )
        .with_last(
            ElectionKind::Legislative,
            past("2022 Kenyan general election", date(2022, 8, 9), Some("Fixture Party"), Some(5.0)),
        )
}

fn kenya_ratings() -> FixtureRatings {
    FixtureRatings::default().with_page("kenya", 2025, &rating_html(51, "Partly Free"))
}

async fn run(fixtures: &FixtureSet, countries: &[CountryRef], previous: Option<Snapshot>) -> Snapshot {
    let pipeline = Pipeline::new(config(), fixtures.sources());
    pipeline
        .run(countries, &run_context(), &PreviousSnapshotIndex::new(previous))
        .await
}

#[tokio::test]
async fn test_fully_resolved_country() {
    let fixtures = FixtureSet::new(kenya_graph(), kenya_ratings());
    let snapshot = run(&fixtures, &[kenya()], None).await;

    assert_eq!(snapshot.reference_year, 2025);
    assert!(snapshot.generated_at.ends_with('Z'));
    let country = &snapshot.countries[0];
    assert_eq!(country.iso2, "KE");

    let leaders = &country.government.leaders;
    assert_eq!(leaders[0].role, LeaderRole::HeadOfState);
    assert_eq!(leaders[1].name.value().map(String::as_str), Some("Prime Minister Fixture"));

    let bodies: Vec<&str> = country
        .government
        .party_control
        .iter()
        .map(|e| e.body.as_str())
        .collect();
    assert_eq!(bodies, vec!["Executive", "National Assembly"]);
    assert!(country.government.party_control.iter().all(|e| e.controller.is_ok()));

    assert_eq!(country.elections.next_executive.method, Some(ElectionMethod::WikidataUpcoming));
    assert_eq!(country.elections.next_legislative.result.status(), FieldStatus::Estimated);
    assert_eq!(
        country.elections.next_legislative.result.value().unwrap().date,
        date(2027, 8, 9)
    );
    assert_eq!(
        country.elections.legislature_control_basis.as_ref().unwrap().election_date,
        date(2022, 8, 9)
    );

    assert_eq!(country.freedom_rating.value().unwrap().score, 51);
    assert!(country.economic_trend.is_ok());
    assert_eq!(country.news.len(), 2);

    // Only the estimated legislative election is degraded
    assert_eq!(country.quality.confidence, 0.95);
    assert_eq!(country.quality.warnings.len(), 1);
    assert!(country.quality.warnings[0].starts_with("Next legislative election: estimated"));
}

#[tokio::test]
async fn test_missing_country_entity_marks_graph_fields_unavailable() {
    let ratings = FixtureRatings::default().with_page("atlantis", 2025, &rating_html(80, "Free"));
    let fixtures = FixtureSet::new(FixtureGraph::default(), ratings);

    let snapshot = run(&fixtures, &[CountryRef::new("Atlantis", "XA")], None).await;
    let country = &snapshot.countries[0];

    assert_eq!(
        country.government.political_system.reason(),
        Some(ReasonCode::CountryEntityUnavailable)
    );
    for leader in &country.government.leaders {
        assert_eq!(leader.name.reason(), Some(ReasonCode::CountryEntityUnavailable));
    }
    assert_eq!(country.government.party_control.len(), 2);
    assert_eq!(country.government.party_control[1].body, "Legislature");
    assert_eq!(
        country.elections.next_executive.result.reason(),
        Some(ReasonCode::CountryEntityUnavailable)
    );
    assert!(country.elections.next_executive.method.is_none());

    // Non-graph fields still resolve
    assert!(country.freedom_rating.is_ok());
    assert!(country.economic_trend.is_ok());

    // 2 × 0.20 + 0.15 + 0.10 + 0.10 + 2 × 0.05
    assert_eq!(country.quality.confidence, 0.15);
}

#[tokio::test]
async fn test_failed_refresh_carries_over_previous_values() {
    let first = FixtureSet::new(kenya_graph(), kenya_ratings());
    let previous = run(&first, &[kenya()], None).await;

    let mut graph = kenya_graph();
    graph.government = Err(SourceFailure::blocked("wikidata"));
    let second = FixtureSet::new(graph, FixtureRatings::default());
    let snapshot = run(&second, &[kenya()], Some(previous.clone())).await;
    let country = &snapshot.countries[0];

    assert_eq!(country.freedom_rating.status(), FieldStatus::Ok);
    assert_eq!(country.freedom_rating.value(), previous.countries[0].freedom_rating.value());
    assert!(country
        .freedom_rating
        .notes()
        .unwrap()
        .contains("refresh failed: http_error"));

    let executive = &country.government.party_control[0];
    assert_eq!(executive.controller.value().map(String::as_str), Some("Fixture Party"));
    assert!(executive.controller.notes().unwrap().contains("refresh failed: blocked"));

    // Leaders are not staleness-tolerant
    assert_eq!(country.government.leaders[0].name.status(), FieldStatus::Blocked);
}

#[tokio::test]
async fn test_countries_keep_input_order() {
    let graph = kenya_graph().with_entity("TZ", "Q924");
    let fixtures = FixtureSet::new(graph, kenya_ratings());
    let countries = vec![
        CountryRef::new("Tanzania", "TZ"),
        kenya(),
        CountryRef::new("Atlantis", "XA"),
    ];

    let snapshot = run(&fixtures, &countries, None).await;

    let codes: Vec<&str> = snapshot.countries.iter().map(|c| c.iso2.as_str()).collect();
    assert_eq!(codes, vec!["TZ", "KE", "XA"]);
    assert_eq!(snapshot.sources.len(), 4);
}

#[tokio::test]
async fn test_news_failure_leaves_empty_list_and_penalty() {
    let fixtures = FixtureSet::new(kenya_graph(), kenya_ratings())
        .with_news(FixtureNews::failing(SourceFailure::http("gdelt", 503)));

    let snapshot = run(&fixtures, &[kenya()], None).await;
    let country = &snapshot.countries[0];

    assert!(country.news.is_empty());
    assert_eq!(country.quality.confidence, 0.93);
    assert!(country.quality.warnings.iter().any(|w| w.starts_with("News:")));
}

#[tokio::test]
async fn test_no_silent_nulls_in_serialized_snapshot() {
    let fixtures = FixtureSet::new(kenya_graph(), FixtureRatings::default())
        .with_indicators(FixtureIndicators::failing(SourceFailure::parse("world_bank", "bad json")));
    let snapshot = run(&fixtures, &[kenya(), CountryRef::new("Atlantis", "XA")], None).await;

    let json = serde_json::to_value(&snapshot).unwrap();
    let mut checked = 0;
    visit_field_results(&json, &mut checked);
    assert!(checked > 20);

    let text = serde_json::to_string(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back, snapshot);
}

#[tokio::test]
async fn test_replacement_regime_classifier() {
    let graph = FixtureGraph::default().with_entity("KE", "Q114");
    let fixtures = FixtureSet::new(graph, kenya_ratings());
    let countries = [kenya()];
    let run_ctx = run_context();
    let previous = PreviousSnapshotIndex::new(None);

    let default = Pipeline::new(config(), fixtures.sources())
        .run(&countries, &run_ctx, &previous)
        .await;
    let elections = &default.countries[0].elections;
    assert_eq!(elections.next_executive.result.reason(), Some(ReasonCode::NoSignal));

    let strict = Pipeline::new(config(), fixtures.sources())
        .with_regime_classifier(Box::new(KeywordRegimeClassifier::new(["republic"])))
        .run(&countries, &run_ctx, &previous)
        .await;
    let elections = &strict.countries[0].elections;
    for field in [&elections.next_executive, &elections.next_legislative] {
        assert_eq!(field.result.status(), FieldStatus::NotApplicable);
        assert_eq!(field.result.reason(), Some(ReasonCode::NonCompetitiveSystem));
        assert_eq!(field.method, Some(ElectionMethod::PoliticalSystemHeuristic));
    }
}

fn visit_field_results(value: &Value, checked: &mut usize) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(status)) = map.get("status") {
                if map.contains_key("provenance") {
                    *checked += 1;
                    let carries_value = matches!(status.as_str(), "ok" | "computed" | "estimated");
                    assert!(matches!(
                        status.as_str(),
                        "ok" | "computed" | "estimated" | "unknown" | "not_applicable" | "blocked"
                    ));
                    assert_eq!(!map["value"].is_null(), carries_value, "status {}", status);
                    if status != "ok" {
                        assert!(map["reason"].is_string(), "status {} without reason", status);
                    }
                }
            }
            for child in map.values() {
                visit_field_results(child, checked);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_field_results(item, checked);
            }
        }
        _ => {}
    }
}
