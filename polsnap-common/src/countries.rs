//! Country catalog and per-country override tables
//!
//! The compiled catalog is the default input list; a TOML config may replace
//! it. Override tables cover the cases where a plain slug or the display name
//! is not good enough for a particular source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the input country list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRef {
    /// Display name (also used for slugs and news queries)
    pub country: String,
    /// ISO 3166-1 alpha-2 code
    pub iso2: String,
}

impl CountryRef {
    pub fn new(country: impl Into<String>, iso2: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            iso2: iso2.into().to_ascii_uppercase(),
        }
    }
}

const DEFAULT_COUNTRIES: &[(&str, &str)] = &[
    ("Russia", "RU"),
    ("India", "IN"),
    ("Pakistan", "PK"),
    ("China", "CN"),
    ("United Kingdom", "GB"),
    ("Germany", "DE"),
    ("UAE", "AE"),
    ("Saudi Arabia", "SA"),
    ("Israel", "IL"),
    ("Palestine", "PS"),
    ("Mexico", "MX"),
    ("Brazil", "BR"),
    ("Canada", "CA"),
    ("Nigeria", "NG"),
    ("Japan", "JP"),
    ("Iran", "IR"),
    ("Syria", "SY"),
    ("France", "FR"),
    ("Turkey", "TR"),
    ("Venezuela", "VE"),
    ("Vietnam", "VN"),
    ("Taiwan", "TW"),
    ("South Korea", "KR"),
    ("North Korea", "KP"),
    ("Indonesia", "ID"),
    ("Myanmar", "MM"),
    ("Armenia", "AM"),
    ("Azerbaijan", "AZ"),
    ("Morocco", "MA"),
    ("Somalia", "SO"),
    ("Yemen", "YE"),
    ("Libya", "LY"),
    ("Egypt", "EG"),
    ("Algeria", "DZ"),
    ("Argentina", "AR"),
    ("Chile", "CL"),
    ("Peru", "PE"),
    ("Cuba", "CU"),
    ("Colombia", "CO"),
    ("Panama", "PA"),
    ("El Salvador", "SV"),
    ("Denmark", "DK"),
    ("Sudan", "SD"),
];

/// Freedom House slug exceptions (everything else is slugified)
const DEFAULT_SLUG_OVERRIDES: &[(&str, &str)] = &[
    ("UAE", "united-arab-emirates"),
    ("United Kingdom", "united-kingdom"),
    ("South Korea", "south-korea"),
    ("North Korea", "north-korea"),
    ("El Salvador", "el-salvador"),
];

/// Extra names stripped from headlines before topic keys are built
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("Russia", &["Russian", "Russians", "Moscow", "Kremlin"]),
    ("India", &["Indian", "New Delhi", "Delhi"]),
    ("Pakistan", &["Pakistani", "Islamabad"]),
    ("China", &["Chinese", "Beijing", "PRC"]),
    ("United Kingdom", &["UK", "U.K.", "Britain", "British", "London"]),
    ("Germany", &["German", "Berlin"]),
    ("UAE", &["United Arab Emirates", "Emirati", "Abu Dhabi"]),
    ("Saudi Arabia", &["Saudi", "Riyadh"]),
    ("Israel", &["Israeli", "Israelis"]),
    ("Palestine", &["Palestinian", "Palestinians"]),
    ("Mexico", &["Mexican"]),
    ("Brazil", &["Brazilian", "Brasilia"]),
    ("Canada", &["Canadian", "Ottawa"]),
    ("Nigeria", &["Nigerian", "Abuja"]),
    ("Japan", &["Japanese", "Tokyo"]),
    ("Iran", &["Iranian", "Tehran"]),
    ("Syria", &["Syrian", "Damascus"]),
    ("France", &["French", "Paris"]),
    ("Turkey", &["Turkish", "Turkiye", "Türkiye", "Ankara"]),
    ("Venezuela", &["Venezuelan", "Caracas"]),
    ("Vietnam", &["Vietnamese", "Hanoi"]),
    ("Taiwan", &["Taiwanese", "Taipei"]),
    ("South Korea", &["Korea", "Korean", "Seoul"]),
    ("North Korea", &["Korea", "Korean", "Pyongyang", "DPRK"]),
    ("Indonesia", &["Indonesian", "Jakarta"]),
    ("Myanmar", &["Burma", "Burmese"]),
    ("Armenia", &["Armenian", "Yerevan"]),
    ("Azerbaijan", &["Azerbaijani", "Baku"]),
    ("Morocco", &["Moroccan", "Rabat"]),
    ("Somalia", &["Somali", "Mogadishu"]),
    ("Yemen", &["Yemeni", "Sanaa"]),
    ("Libya", &["Libyan", "Tripoli"]),
    ("Egypt", &["Egyptian", "Cairo"]),
    ("Algeria", &["Algerian", "Algiers"]),
    ("Argentina", &["Argentine", "Argentinian", "Buenos Aires"]),
    ("Chile", &["Chilean", "Santiago"]),
    ("Peru", &["Peruvian", "Lima"]),
    ("Cuba", &["Cuban", "Havana"]),
    ("Colombia", &["Colombian", "Bogota"]),
    ("Panama", &["Panamanian"]),
    ("El Salvador", &["Salvadoran", "San Salvador"]),
    ("Denmark", &["Danish", "Copenhagen"]),
    ("Sudan", &["Sudanese", "Khartoum"]),
];

/// Compiled default country list, in output order
pub fn default_countries() -> Vec<CountryRef> {
    DEFAULT_COUNTRIES
        .iter()
        .map(|(name, iso2)| CountryRef::new(*name, *iso2))
        .collect()
}

/// Compiled Freedom House slug exceptions keyed by display name
pub fn default_slug_overrides() -> BTreeMap<String, String> {
    DEFAULT_SLUG_OVERRIDES
        .iter()
        .map(|(name, slug)| (name.to_string(), slug.to_string()))
        .collect()
}

/// Compiled alias lists keyed by display name
pub fn default_aliases() -> BTreeMap<String, Vec<String>> {
    DEFAULT_ALIASES
        .iter()
        .map(|(name, aliases)| {
            (
                name.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

/// Basic slugify: lowercase, drop apostrophes, collapse everything that is
/// not `[a-z0-9]` into single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}
