//! Non-competitive regime classification
//!
//! The election resolver only sees [`RegimeClassifier`]; the keyword list
//! can be swapped without touching resolver logic.

/// Decides whether political-system labels rule out competitive elections
pub trait RegimeClassifier: Send + Sync {
    fn is_non_competitive(&self, labels: &[String]) -> bool;
}

/// Labels containing any of these phrases are treated as non-competitive
pub const DEFAULT_NON_COMPETITIVE_KEYWORDS: &[&str] = &[
    "absolute monarchy",
    "military junta",
    "junta",
    "one-party state",
    "one-party",
    "single-party",
    "totalitarian",
    "military dictatorship",
    "stratocracy",
];

/// Case-insensitive phrase matcher over political-system labels
#[derive(Debug, Clone)]
pub struct KeywordRegimeClassifier {
    keywords: Vec<String>,
}

impl KeywordRegimeClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

impl Default for KeywordRegimeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NON_COMPETITIVE_KEYWORDS.iter().copied())
    }
}

impl RegimeClassifier for KeywordRegimeClassifier {
    fn is_non_competitive(&self, labels: &[String]) -> bool {
        labels.iter().map(|label| normalize(label)).any(|label| {
            self.keywords.iter().any(|keyword| label.contains(keyword.as_str()))
        })
    }
}

// Lowercase, hyphen variants folded, whitespace collapsed
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
