//! Configuration resolution for polsnap-builder
//!
//! Provides multi-tier resolution with CLI → ENV → TOML → compiled-default
//! priority. The TOML layer lives in `polsnap_common::config`; this module
//! adds the environment opt-ins and command-line overrides.

use crate::sources::freedom_house::PROXY_ENV_VAR;
use crate::sources::translation::{TRANSLATE_API_KEY_ENV_VAR, TRANSLATE_URL_ENV_VAR};
use polsnap_common::config::{load_config, resolve_config_path, TomlConfig};
use polsnap_common::{CountryRef, Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Values taken from command-line flags; `None` leaves the lower tiers alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    /// Restrict the run to these countries (ISO2 code or display name)
    pub countries: Vec<String>,
    pub inter_country_delay_ms: Option<u64>,
    pub reference_year: Option<i32>,
    pub news_limit: Option<usize>,
    pub log_level: Option<String>,
}

/// Opt-in integrations that are only configured through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOptions {
    /// HTTP proxy for rating page fetches
    pub freedom_proxy: Option<String>,
    /// Headline translation endpoint
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
}

impl EnvOptions {
    pub fn from_env() -> Self {
        Self {
            freedom_proxy: env_value(PROXY_ENV_VAR),
            translate_url: env_value(TRANSLATE_URL_ENV_VAR),
            translate_api_key: env_value(TRANSLATE_API_KEY_ENV_VAR),
        }
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    pub toml: TomlConfig,
    pub env: EnvOptions,
}

impl BuilderConfig {
    /// Resolve the config file, then layer environment and CLI on top
    pub fn load(config_arg: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let path = resolve_config_path(config_arg);
        let toml = load_config(path.as_deref())?;
        Self::from_parts(toml, EnvOptions::from_env(), overrides)
    }

    pub fn from_parts(toml: TomlConfig, env: EnvOptions, overrides: &CliOverrides) -> Result<Self> {
        let mut config = Self { toml, env };
        config.apply_overrides(overrides)?;
        config.toml.validate()?;

        if config.env.freedom_proxy.is_some() {
            info!("Rating page fetches go through the configured proxy");
        }
        if config.env.translate_url.is_some() {
            info!("Headline translation enabled");
        } else if config.env.translate_api_key.is_some() {
            warn!(
                "{} is set but {} is not; translation stays disabled",
                TRANSLATE_API_KEY_ENV_VAR, TRANSLATE_URL_ENV_VAR
            );
        }

        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: &CliOverrides) -> Result<()> {
        if let Some(output) = &overrides.output {
            self.toml.output_path = output.clone();
        }
        if let Some(delay) = overrides.inter_country_delay_ms {
            self.toml.run.inter_country_delay_ms = delay;
        }
        if let Some(year) = overrides.reference_year {
            self.toml.run.reference_year = Some(year);
        }
        if let Some(limit) = overrides.news_limit {
            self.toml.run.news_limit = limit;
        }
        if let Some(level) = &overrides.log_level {
            self.toml.logging.level = level.clone();
        }
        if !overrides.countries.is_empty() {
            self.toml.countries = select_countries(&self.toml.countries, &overrides.countries)?;
        }
        Ok(())
    }
}

/// Pick catalog entries by ISO2 code or display name, in request order
///
/// A requested country missing from the catalog is accepted only as
/// `Name:XX`, which adds it ad hoc.
pub fn select_countries(catalog: &[CountryRef], requested: &[String]) -> Result<Vec<CountryRef>> {
    let mut selected: Vec<CountryRef> = Vec::with_capacity(requested.len());

    for wanted in requested {
        let wanted = wanted.trim();
        let found = catalog
            .iter()
            .find(|c| c.iso2.eq_ignore_ascii_case(wanted) || c.country.eq_ignore_ascii_case(wanted))
            .cloned()
            .or_else(|| parse_ad_hoc(wanted))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown country {:?} (use an ISO2 code, a catalog name, or Name:XX)",
                    wanted
                ))
            })?;

        if !selected.iter().any(|c| c.iso2 == found.iso2) {
            selected.push(found);
        }
    }

    Ok(selected)
}

fn parse_ad_hoc(arg: &str) -> Option<CountryRef> {
    let (name, iso2) = arg.rsplit_once(':')?;
    let (name, iso2) = (name.trim(), iso2.trim());
    if name.is_empty() || iso2.len() != 2 || !iso2.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(CountryRef::new(name, iso2))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
