//! Pipeline Orchestrator
//!
//! Builds one [`CountrySnapshot`] per input country and assembles the
//! [`Snapshot`] document.
//!
//! # Per-country order
//! 1. Country entity lookup (graph source)
//! 2. Political system
//! 3. Government record → leaders, executive party
//! 4. Next executive / legislative election (reads the political system)
//! 5. Legislature control (shares the legislative past-election lookup)
//! 6. Freedom rating, economic trend, news
//! 7. Sticky merge against the previous record, then confidence scoring
//!
//! # Error Handling
//! Nothing in here fails a run: every source failure ends up as a field
//! status. Countries are processed sequentially with a fixed delay between
//! them.

use super::RunContext;
use crate::config::{BuilderConfig, EnvOptions};
use crate::fusion::sticky_merge::{self, PreviousSnapshotIndex};
use crate::models::{
    ControlMethod, CountrySnapshot, ElectionField, ElectionKind, Elections, FieldResult,
    FieldStatus, Government, Leader, LeaderRole, PartyControlEntry, Provenance, Quality,
    ReasonCode, Snapshot, DEFAULT_LEGISLATURE_BODY, EXECUTIVE_BODY,
};
use crate::resolvers::election::ElectionContext;
use crate::resolvers::executive::ExecutiveContext;
use crate::resolvers::freedom::FreedomContext;
use crate::resolvers::news::NewsContext;
use crate::resolvers::regime::{KeywordRegimeClassifier, RegimeClassifier};
use crate::resolvers::{election, executive, freedom, legislature, news, political_system, trend};
use crate::sources::freedom_house::{country_slug, FreedomHouseClient};
use crate::sources::gdelt::GdeltClient;
use crate::sources::translation::LibreTranslateClient;
use crate::sources::wikidata::WikidataClient;
use crate::sources::world_bank::WorldBankClient;
use crate::sources::{
    ElectionSource, GovernmentSource, IndicatorSource, NewsSource, RatingSource, Translator,
};
use crate::validators::confidence_scorer::{field_checks, score_country};
use chrono::Utc;
use polsnap_common::config::{EndpointConfig, TomlConfig};
use polsnap_common::CountryRef;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pipeline settings taken from the resolved configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed pause between countries
    pub inter_country_delay: Duration,
    /// World Bank indicator code for the economic trend
    pub indicator_code: String,
    pub news_limit: usize,
    pub news_window: String,
    pub news_language: String,
    /// Freedom House slug exceptions keyed by display name
    pub slug_overrides: BTreeMap<String, String>,
    /// Headline aliases keyed by display name
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

impl PipelineConfig {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            inter_country_delay: Duration::from_millis(config.run.inter_country_delay_ms),
            indicator_code: config.run.indicator_code.clone(),
            news_limit: config.run.news_limit,
            news_window: config.run.news_window.clone(),
            news_language: config.run.news_language.clone(),
            slug_overrides: config.slug_overrides.clone(),
            aliases: config.aliases.clone(),
        }
    }
}

/// The set of source adapters one run talks to
#[derive(Clone)]
pub struct Sources {
    pub government: Arc<dyn GovernmentSource>,
    pub elections: Arc<dyn ElectionSource>,
    pub ratings: Arc<dyn RatingSource>,
    pub indicators: Arc<dyn IndicatorSource>,
    pub news: Arc<dyn NewsSource>,
    pub translator: Option<Arc<dyn Translator>>,
    /// Endpoint identifiers mapped to base URLs, recorded in the snapshot
    pub endpoints: BTreeMap<String, String>,
}

impl Sources {
    /// Live HTTP adapters for the configured endpoints
    pub fn from_endpoints(
        endpoints: &EndpointConfig,
        env: &EnvOptions,
    ) -> polsnap_common::Result<Self> {
        let wikidata = Arc::new(WikidataClient::with_endpoint(&endpoints.wikidata_sparql)?);
        let ratings = FreedomHouseClient::with_base_url(
            &endpoints.freedom_house_base,
            env.freedom_proxy.clone(),
        )?;
        let indicators = WorldBankClient::with_base_url(&endpoints.indicator_base)?;
        let news = GdeltClient::with_base_url(&endpoints.news_base)?;

        let mut map = BTreeMap::from([
            ("wikidata".to_string(), endpoints.wikidata_sparql.clone()),
            ("freedom_house".to_string(), endpoints.freedom_house_base.clone()),
            ("world_bank".to_string(), endpoints.indicator_base.clone()),
            ("gdelt".to_string(), endpoints.news_base.clone()),
        ]);

        let translator: Option<Arc<dyn Translator>> = match &env.translate_url {
            Some(url) => {
                map.insert("translation".to_string(), url.clone());
                Some(Arc::new(LibreTranslateClient::new(
                    url.clone(),
                    env.translate_api_key.clone(),
                )?))
            }
            None => None,
        };

        Ok(Self {
            government: wikidata.clone(),
            elections: wikidata,
            ratings: Arc::new(ratings),
            indicators: Arc::new(indicators),
            news: Arc::new(news),
            translator,
            endpoints: map,
        })
    }
}

/// Sequential per-country snapshot pipeline
pub struct Pipeline {
    config: PipelineConfig,
    sources: Sources,
    regime: Box<dyn RegimeClassifier>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, sources: Sources) -> Self {
        Self {
            config,
            sources,
            regime: Box::new(KeywordRegimeClassifier::default()),
        }
    }

    /// Pipeline over live adapters for a resolved configuration
    pub fn from_config(config: &BuilderConfig) -> polsnap_common::Result<Self> {
        let sources = Sources::from_endpoints(&config.toml.endpoints, &config.env)?;
        Ok(Self::new(PipelineConfig::from_toml(&config.toml), sources))
    }

    /// Replace the non-competitive regime classifier
    pub fn with_regime_classifier(mut self, regime: Box<dyn RegimeClassifier>) -> Self {
        self.regime = regime;
        self
    }

    /// Build every country in input order and assemble the snapshot
    pub async fn run(
        &self,
        countries: &[CountryRef],
        run: &RunContext,
        previous: &PreviousSnapshotIndex,
    ) -> Snapshot {
        info!(
            countries = countries.len(),
            reference_year = run.reference_year,
            previous = previous.len(),
            "Snapshot run started"
        );

        let mut records = Vec::with_capacity(countries.len());
        for (i, country) in countries.iter().enumerate() {
            if i > 0 && !self.config.inter_country_delay.is_zero() {
                tokio::time::sleep(self.config.inter_country_delay).await;
            }
            let record = self.build_country(country, run, previous.get(&country.iso2)).await;
            records.push(record);
        }

        let mean = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.quality.confidence).sum::<f64>() / records.len() as f64
        };
        info!(
            countries = records.len(),
            mean_confidence = %format!("{:.3}", mean),
            "Snapshot run complete"
        );

        Snapshot::new(
            Utc::now(),
            run.reference_year,
            records,
            self.sources.endpoints.clone(),
        )
    }

    /// Resolve, merge and score one country
    pub async fn build_country(
        &self,
        country: &CountryRef,
        run: &RunContext,
        previous: Option<&CountrySnapshot>,
    ) -> CountrySnapshot {
        debug!(country = %country.country, iso2 = %country.iso2, "Building country");

        let (government, elections) = match self.country_entity(country).await {
            Some(entity) => self.resolve_government(&entity, run).await,
            None => self.unavailable_government(country),
        };

        let slug = country_slug(&country.country, &self.config.slug_overrides);
        let freedom_rating = freedom::resolve(&FreedomContext {
            source: self.sources.ratings.as_ref(),
            slug: &slug,
            reference_year: run.reference_year,
        })
        .await;

        let economic_trend = trend::resolve(
            self.sources.indicators.as_ref(),
            &country.iso2,
            &self.config.indicator_code,
        )
        .await;

        let aliases = self
            .config
            .aliases
            .get(&country.country)
            .cloned()
            .unwrap_or_default();
        let news_result = news::resolve(&NewsContext {
            source: self.sources.news.as_ref(),
            translator: self.sources.translator.as_deref(),
            country: &country.country,
            aliases: &aliases,
            window: &self.config.news_window,
            language: &self.config.news_language,
            limit: self.config.news_limit,
        })
        .await;
        let news = news_result.into_value().unwrap_or_default();

        let mut record = CountrySnapshot {
            country: country.country.clone(),
            iso2: country.iso2.clone(),
            government,
            elections,
            freedom_rating,
            economic_trend,
            news,
            quality: Quality {
                confidence: 0.0,
                warnings: Vec::new(),
            },
        };

        sticky_merge::apply(&mut record, previous);
        record.quality = score_country(&record);

        for check in field_checks(&record)
            .into_iter()
            .filter(|check| check.status != FieldStatus::Ok)
        {
            debug!(
                country = %record.country,
                field = %check.label,
                status = %check.status,
                reason = check.reason.map(|r| r.as_str()).unwrap_or(""),
                "Degraded field"
            );
        }
        info!(
            country = %record.country,
            iso2 = %record.iso2,
            confidence = record.quality.confidence,
            warnings = record.quality.warnings.len(),
            "Country complete"
        );

        record
    }

    async fn country_entity(&self, country: &CountryRef) -> Option<String> {
        match self.sources.government.country_entity(&country.iso2).await {
            Ok(Some(entity)) => Some(entity),
            Ok(None) => {
                warn!(country = %country.country, iso2 = %country.iso2, "No country entity at source");
                None
            }
            Err(failure) => {
                warn!(
                    country = %country.country,
                    iso2 = %country.iso2,
                    failure = %failure,
                    "Country entity lookup failed"
                );
                None
            }
        }
    }

    async fn resolve_government(&self, entity: &str, run: &RunContext) -> (Government, Elections) {
        let source = self.sources.government.as_ref();
        let political_system = political_system::resolve(source, entity).await;

        let record = source.government(entity).await;
        let executive_ctx = ExecutiveContext {
            record: &record,
            provenance: vec![Provenance::new(source.endpoint(), Some(entity))],
        };
        let leaders = executive::leaders(&executive_ctx);
        let executive_entry = executive::executive_party(&executive_ctx).await;

        let executive_election = ElectionContext::new(
            self.sources.elections.as_ref(),
            entity,
            ElectionKind::Executive,
            run.today,
            &political_system,
            self.regime.as_ref(),
        );
        let next_executive = election::resolve(&executive_election).await;

        let legislative_election = ElectionContext::new(
            self.sources.elections.as_ref(),
            entity,
            ElectionKind::Legislative,
            run.today,
            &political_system,
            self.regime.as_ref(),
        );
        let next_legislative = election::resolve(&legislative_election).await;

        let bodies = record
            .as_ref()
            .map(|r| r.legislature_bodies.clone())
            .unwrap_or_default();
        let (legislature_entries, basis) =
            legislature::control(&legislative_election, &bodies).await;

        let mut party_control = vec![executive_entry];
        party_control.extend(legislature_entries);

        let government = Government {
            political_system,
            leaders,
            party_control,
        };
        let elections = Elections {
            next_executive,
            next_legislative,
            legislature_control_basis: basis,
        };
        (government, elections)
    }

    /// Every graph-sourced field as `unknown` / `country_entity_unavailable`
    fn unavailable_government(&self, country: &CountryRef) -> (Government, Elections) {
        let provenance = vec![Provenance::new(self.sources.government.endpoint(), None)];
        let unavailable = || -> FieldResult<String> {
            FieldResult::unknown(ReasonCode::CountryEntityUnavailable)
                .with_provenance(provenance.clone())
        };

        let leaders = [LeaderRole::HeadOfState, LeaderRole::HeadOfGovernment]
            .into_iter()
            .map(|role| Leader {
                role,
                name: unavailable(),
                party: unavailable(),
            })
            .collect();

        let party_control = vec![
            PartyControlEntry {
                body: EXECUTIVE_BODY.to_string(),
                controller: unavailable(),
                method: ControlMethod::HogPartyElseHosParty,
            },
            PartyControlEntry {
                body: DEFAULT_LEGISLATURE_BODY.to_string(),
                controller: unavailable(),
                method: ControlMethod::WikidataLastLegElectionWinner,
            },
        ];

        debug!(country = %country.country, "Graph fields marked unavailable");

        let government = Government {
            political_system: FieldResult::unknown(ReasonCode::CountryEntityUnavailable)
                .with_provenance(provenance.clone()),
            leaders,
            party_control,
        };
        let elections = Elections {
            next_executive: ElectionField::unavailable(
                ReasonCode::CountryEntityUnavailable,
                provenance.clone(),
            ),
            next_legislative: ElectionField::unavailable(
                ReasonCode::CountryEntityUnavailable,
                provenance,
            ),
            legislature_control_basis: None,
        };
        (government, elections)
    }
}
