//! Configuration loading and config-file resolution
//!
//! The TOML file is optional. A missing file is not an error (compiled
//! defaults apply); a file that exists but does not parse is.

use crate::countries::{default_aliases, default_countries, default_slug_overrides, CountryRef};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "POLSNAP_CONFIG";

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Run section: pacing and windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fixed delay between countries (milliseconds)
    pub inter_country_delay_ms: u64,
    /// Reference year override (default: current year - 1)
    pub reference_year: Option<i32>,
    /// Maximum number of distinct headlines per country
    pub news_limit: usize,
    /// News search window (GDELT timespan syntax, e.g. "7d")
    pub news_window: String,
    /// News source language filter
    pub news_language: String,
    /// World Bank indicator code used for the economic trend field
    pub indicator_code: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            inter_country_delay_ms: 200,
            reference_year: None,
            news_limit: 5,
            news_window: "7d".to_string(),
            news_language: "english".to_string(),
            indicator_code: "NY.GDP.MKTP.KD.ZG".to_string(),
        }
    }
}

/// Source endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub wikidata_sparql: String,
    pub freedom_house_base: String,
    pub indicator_base: String,
    pub news_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            wikidata_sparql: "https://query.wikidata.org/sparql".to_string(),
            freedom_house_base: "https://freedomhouse.org/country".to_string(),
            indicator_base: "https://api.worldbank.org/v2".to_string(),
            news_base: "https://api.gdeltproject.org/api/v2/doc/doc".to_string(),
        }
    }
}

/// Complete TOML configuration
///
/// Every section is optional; absent sections take compiled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Output snapshot path
    pub output_path: PathBuf,
    pub logging: LoggingConfig,
    pub run: RunConfig,
    pub endpoints: EndpointConfig,
    /// Input country list (replaces the compiled catalog when present)
    pub countries: Vec<CountryRef>,
    /// Freedom House slug exceptions keyed by display name (merged over defaults)
    pub slug_overrides: BTreeMap<String, String>,
    /// Headline alias lists keyed by display name (merged over defaults)
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("public/countries_snapshot.json"),
            logging: LoggingConfig::default(),
            run: RunConfig::default(),
            endpoints: EndpointConfig::default(),
            countries: default_countries(),
            slug_overrides: default_slug_overrides(),
            aliases: default_aliases(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text. Override tables are merged over the compiled ones
    /// rather than replacing them.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

        let mut slugs = default_slug_overrides();
        slugs.extend(std::mem::take(&mut config.slug_overrides));
        config.slug_overrides = slugs;

        let mut aliases = default_aliases();
        aliases.extend(std::mem::take(&mut config.aliases));
        config.aliases = aliases;

        for c in &mut config.countries {
            c.iso2 = c.iso2.trim().to_ascii_uppercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            return Err(Error::Config("country list is empty".to_string()));
        }
        for c in &self.countries {
            if c.iso2.len() != 2 || !c.iso2.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return Err(Error::Config(format!(
                    "invalid ISO2 code {:?} for {}",
                    c.iso2, c.country
                )));
            }
        }
        if self.run.news_limit == 0 {
            return Err(Error::Config("run.news_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Config file resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable (`POLSNAP_CONFIG`)
/// 3. `<user config dir>/polsnap/config.toml`, only if it exists
///
/// Returns `None` when nothing applies (compiled defaults are used).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("polsnap").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration from an optional path
///
/// An explicitly named file that does not exist is an error; no path at all
/// yields compiled defaults.
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        tracing::info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = TomlConfig::from_toml_str(&content)?;

    tracing::info!(
        path = %path.display(),
        countries = config.countries.len(),
        "Loaded config file"
    );
    Ok(config)
}
