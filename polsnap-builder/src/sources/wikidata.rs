//! Wikidata SPARQL Client
//!
//! Graph-query adapter for government structure and election items.
//!
//! # Properties used
//! - P297 ISO 3166-1 alpha-2 code (country lookup)
//! - P122 basic form of government
//! - P35 head of state, P6 head of government, P102 party membership
//! - P194 legislative body
//! - P1001 applies to jurisdiction, P585 point in time, P31 instance of
//! - P1346 winner, P541 office contested, P2097 term length of office
//!
//! # API Reference
//! - Endpoint: https://query.wikidata.org/sparql
//! - Results: `application/sparql-results+json`

use super::http::{FetchPolicy, HttpFetcher};
use super::{
    parse_source_date, ElectionSource, GovernmentRecord, GovernmentSource, OfficeHolder,
    PastElection, SourceFailure, SourceResult, UpcomingElection,
};
use crate::models::ElectionKind;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const SPARQL_ACCEPT: &str = "application/sparql-results+json";

/// Wikidata SPARQL rate: stay well under the public endpoint's limits
const REQUESTS_PER_SECOND: u32 = 5;

// Election item classes
const PRESIDENTIAL_ELECTION: &str = "wd:Q159821";
const GENERAL_ELECTION: &str = "wd:Q152203";
const PARLIAMENTARY_ELECTION: &str = "wd:Q1079032";
const LEGISLATIVE_ELECTION: &str = "wd:Q104203";
const ELECTION: &str = "wd:Q40231";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

type Binding = HashMap<String, SparqlTerm>;

/// Wikidata SPARQL client
pub struct WikidataClient {
    fetcher: HttpFetcher,
    endpoint: String,
}

impl WikidataClient {
    pub fn new(fetcher: HttpFetcher, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    /// Client with the default API fetch policy
    pub fn with_endpoint(endpoint: impl Into<String>) -> polsnap_common::Result<Self> {
        let fetcher = HttpFetcher::new("wikidata_sparql", FetchPolicy::api(REQUESTS_PER_SECOND))?;
        Ok(Self::new(fetcher, endpoint))
    }

    async fn select(&self, query: &str) -> SourceResult<Vec<Binding>> {
        let response: SparqlResponse = self
            .fetcher
            .get_json(
                &self.endpoint,
                &[("format", "json"), ("query", query)],
                Some(SPARQL_ACCEPT),
            )
            .await?;

        debug!(rows = response.results.bindings.len(), "SPARQL query complete");
        Ok(response.results.bindings)
    }

    fn election_types(kind: ElectionKind, upcoming: bool) -> String {
        let mut types = match kind {
            ElectionKind::Executive => vec![PRESIDENTIAL_ELECTION, GENERAL_ELECTION],
            ElectionKind::Legislative => {
                vec![PARLIAMENTARY_ELECTION, LEGISLATIVE_ELECTION, GENERAL_ELECTION]
            }
        };
        // Generic "election" items are too broad for past results
        if upcoming {
            types.push(ELECTION);
        }
        types.join(" ")
    }

    fn check_entity(&self, entity: &str) -> SourceResult<()> {
        if is_entity_id(entity) {
            Ok(())
        } else {
            Err(SourceFailure::parse(
                &self.endpoint,
                format!("not an entity id: {:?}", entity),
            ))
        }
    }
}

#[async_trait]
impl GovernmentSource for WikidataClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn country_entity(&self, iso2: &str) -> SourceResult<Option<String>> {
        if iso2.len() != 2 || !iso2.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SourceFailure::parse(
                &self.endpoint,
                format!("not an ISO2 code: {:?}", iso2),
            ));
        }

        let query = format!(
            r#"SELECT ?country WHERE {{
  ?country wdt:P297 "{}" .
}} LIMIT 1"#,
            iso2.to_ascii_uppercase()
        );

        let rows = self.select(&query).await?;
        Ok(rows
            .first()
            .and_then(|row| value(row, "country"))
            .and_then(|uri| uri.rsplit('/').next().map(str::to_string))
            .filter(|id| is_entity_id(id)))
    }

    async fn political_system(&self, entity: &str) -> SourceResult<Vec<String>> {
        self.check_entity(entity)?;
        let query = format!(
            r#"SELECT ?polsysLabel WHERE {{
  wd:{} wdt:P122 ?polsys .
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}} LIMIT 20"#,
            entity
        );

        let rows = self.select(&query).await?;
        let mut labels: Vec<String> = Vec::new();
        for row in &rows {
            if let Some(label) = label(row, "polsysLabel") {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
        Ok(labels)
    }

    async fn government(&self, entity: &str) -> SourceResult<GovernmentRecord> {
        self.check_entity(entity)?;
        let query = format!(
            r#"SELECT ?hosLabel ?hosPartyLabel ?hogLabel ?hogPartyLabel ?legLabel WHERE {{
  OPTIONAL {{
    wd:{id} wdt:P35 ?hos .
    OPTIONAL {{ ?hos wdt:P102 ?hosParty . }}
  }}
  OPTIONAL {{
    wd:{id} wdt:P6 ?hog .
    OPTIONAL {{ ?hog wdt:P102 ?hogParty . }}
  }}
  OPTIONAL {{ wd:{id} wdt:P194 ?leg . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}} LIMIT 200"#,
            id = entity
        );

        let rows = self.select(&query).await?;
        Ok(government_from_rows(&rows))
    }
}

#[async_trait]
impl ElectionSource for WikidataClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upcoming_election(
        &self,
        entity: &str,
        kind: ElectionKind,
        today: NaiveDate,
    ) -> SourceResult<Option<UpcomingElection>> {
        self.check_entity(entity)?;
        let query = format!(
            r#"SELECT ?eLabel ?date ?typeLabel WHERE {{
  ?e wdt:P1001 wd:{id} .
  ?e wdt:P585 ?date .
  FILTER(?date >= "{today}T00:00:00Z"^^xsd:dateTime)
  ?e wdt:P31 ?type .
  VALUES ?type {{ {types} }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}} ORDER BY ASC(?date) LIMIT 1"#,
            id = entity,
            today = today.format("%Y-%m-%d"),
            types = Self::election_types(kind, true)
        );

        let rows = self.select(&query).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let date = value(row, "date")
            .and_then(|raw| parse_source_date(&raw))
            .ok_or_else(|| SourceFailure::parse(&self.endpoint, "election row without a date"))?;

        Ok(Some(UpcomingElection {
            name: label(row, "eLabel"),
            date,
            election_type: label(row, "typeLabel"),
        }))
    }

    async fn last_election(
        &self,
        entity: &str,
        kind: ElectionKind,
        today: NaiveDate,
    ) -> SourceResult<Option<PastElection>> {
        self.check_entity(entity)?;
        let query = format!(
            r#"SELECT ?e ?eLabel ?date ?typeLabel ?winnerLabel ?officeLabel ?term WHERE {{
  ?e wdt:P1001 wd:{id} .
  ?e wdt:P585 ?date .
  FILTER(?date <= "{today}T00:00:00Z"^^xsd:dateTime)
  ?e wdt:P31 ?type .
  VALUES ?type {{ {types} }}
  OPTIONAL {{ ?e wdt:P1346 ?winner . }}
  OPTIONAL {{
    ?e wdt:P541 ?office .
    OPTIONAL {{ ?office wdt:P2097 ?term . }}
  }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}} ORDER BY DESC(?date) LIMIT 20"#,
            id = entity,
            today = today.format("%Y-%m-%d"),
            types = Self::election_types(kind, false)
        );

        let rows = self.select(&query).await?;
        last_election_from_rows(&rows)
            .map_err(|detail| SourceFailure::parse(&self.endpoint, detail))
    }
}

/// Fold government rows: first non-empty value wins, bodies are collected
fn government_from_rows(rows: &[Binding]) -> GovernmentRecord {
    let mut record = GovernmentRecord::default();
    let mut bodies = BTreeSet::new();

    for row in rows {
        fill(&mut record.head_of_state, row, "hosLabel", "hosPartyLabel");
        fill(&mut record.head_of_government, row, "hogLabel", "hogPartyLabel");
        if let Some(body) = label(row, "legLabel") {
            bodies.insert(body);
        }
    }

    record.legislature_bodies = bodies.into_iter().collect();
    record
}

fn fill(holder: &mut OfficeHolder, row: &Binding, name_key: &str, party_key: &str) {
    if holder.name.is_none() {
        holder.name = label(row, name_key);
    }
    if holder.party.is_none() {
        holder.party = label(row, party_key);
    }
}

/// Rows are ordered newest first; one election may span several rows
/// (multiple winners or offices). Only rows of the newest item are used.
fn last_election_from_rows(rows: &[Binding]) -> Result<Option<PastElection>, String> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let item = value(first, "e");
    let date = value(first, "date")
        .and_then(|raw| parse_source_date(&raw))
        .ok_or_else(|| "election row without a date".to_string())?;

    let mut election = PastElection {
        name: label(first, "eLabel"),
        date,
        election_type: label(first, "typeLabel"),
        winner: None,
        office: None,
        term_length_years: None,
    };

    for row in rows.iter().take_while(|row| value(row, "e") == item) {
        if election.winner.is_none() {
            election.winner = label(row, "winnerLabel");
        }
        if election.office.is_none() {
            election.office = label(row, "officeLabel");
        }
        if election.term_length_years.is_none() {
            election.term_length_years = value(row, "term")
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|years| years.is_finite() && *years > 0.0);
        }
    }

    Ok(Some(election))
}

fn value(row: &Binding, key: &str) -> Option<String> {
    row.get(key)
        .map(|term| term.value.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Label value, ignoring the bare entity ids the label service returns for
/// items without an English label
fn label(row: &Binding, key: &str) -> Option<String> {
    value(row, key).filter(|v| !is_entity_id(v))
}

/// `Q` followed by digits
pub fn is_entity_id(s: &str) -> bool {
    s.len() > 1 && s.starts_with('Q') && s[1..].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Binding {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), SparqlTerm { value: v.to_string() }))
            .collect()
    }

    #[test]
    fn test_entity_id_check() {
        assert!(is_entity_id("Q145"));
        assert!(!is_entity_id("Q"));
        assert!(!is_entity_id("Q14a"));
        assert!(!is_entity_id("United Kingdom"));
    }

    #[test]
    fn test_government_rows_fold() {
        let rows = vec![
            row(&[("hosLabel", "Charles III"), ("hogLabel", "Keir Starmer"), ("hogPartyLabel", "Labour Party"), ("legLabel", "Parliament of the United Kingdom")]),
            row(&[("hosLabel", "Charles III"), ("hogLabel", "Keir Starmer"), ("legLabel", "House of Lords")]),
            row(&[("legLabel", "Q11005")]),
        ];

        let record = government_from_rows(&rows);
        assert_eq!(record.head_of_state.name.as_deref(), Some("Charles III"));
        assert_eq!(record.head_of_state.party, None);
        assert_eq!(record.head_of_government.party.as_deref(), Some("Labour Party"));
        assert_eq!(
            record.legislature_bodies,
            vec!["House of Lords".to_string(), "Parliament of the United Kingdom".to_string()]
        );
    }

    #[test]
    fn test_last_election_uses_newest_item_only() {
        let rows = vec![
            row(&[("e", "http://www.wikidata.org/entity/Q1"), ("eLabel", "2024 general election"), ("date", "2024-07-04T00:00:00Z"), ("officeLabel", "Member of Parliament")]),
            row(&[("e", "http://www.wikidata.org/entity/Q1"), ("date", "2024-07-04T00:00:00Z"), ("winnerLabel", "Labour Party"), ("term", "5")]),
            row(&[("e", "http://www.wikidata.org/entity/Q2"), ("date", "2019-12-12T00:00:00Z"), ("winnerLabel", "Conservative Party")]),
        ];

        let election = last_election_from_rows(&rows).unwrap().unwrap();
        assert_eq!(election.date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        assert_eq!(election.winner.as_deref(), Some("Labour Party"));
        assert_eq!(election.office.as_deref(), Some("Member of Parliament"));
        assert_eq!(election.term_length_years, Some(5.0));
    }

    #[test]
    fn test_last_election_rejects_dateless_row() {
        let rows = vec![row(&[("e", "x"), ("eLabel", "mystery election")])];
        assert!(last_election_from_rows(&rows).is_err());
    }

    #[test]
    fn test_election_types_by_kind() {
        let upcoming = WikidataClient::election_types(ElectionKind::Executive, true);
        assert!(upcoming.contains(PRESIDENTIAL_ELECTION));
        assert!(upcoming.contains(ELECTION));

        let past = WikidataClient::election_types(ElectionKind::Legislative, false);
        assert!(past.contains(PARLIAMENTARY_ELECTION));
        assert!(!past.contains(ELECTION));
    }
}
