//! News Deduplicator
//!
//! Picks the first N topically distinct headlines from a relevance-ordered
//! list.
//!
//! **Topic key:**
//! 1. Split on anything that is not a letter or digit, lowercase
//! 2. Remove the country's name and aliases as whole-token sequences
//!    (longest alias first)
//! 3. Drop stopwords
//! 4. Join the first [`TOPIC_KEY_TOKENS`] remaining tokens
//!
//! **Guarantees:** output keeps input order; no two accepted items share a
//! key; fewer distinct topics than requested yields fewer items, never
//! padding. Headlines with an empty key are skipped.

use std::collections::HashSet;

/// Tokens kept in a topic key
pub const TOPIC_KEY_TOKENS: usize = 6;

/// Share of ASCII letters required to treat a headline as Latin script
pub const LATIN_SCRIPT_THRESHOLD: f64 = 0.6;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "against", "al", "amid", "an", "and", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "de", "did", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "la", "le", "more", "new",
    "not", "of", "on", "or", "over", "s", "said", "say", "says", "she", "so", "than", "that",
    "the", "their", "them", "they", "this", "to", "up", "us", "was", "we", "were", "what", "when",
    "which", "who", "why", "will", "with", "would", "you",
];

/// Country-scoped deduplicator
#[derive(Debug, Clone)]
pub struct NewsDeduplicator {
    /// Tokenized names, longest first
    alias_sequences: Vec<Vec<String>>,
    stopwords: HashSet<&'static str>,
}

impl NewsDeduplicator {
    pub fn new(country: &str, aliases: &[String]) -> Self {
        let mut alias_sequences: Vec<Vec<String>> = std::iter::once(country)
            .chain(aliases.iter().map(String::as_str))
            .map(tokenize)
            .filter(|tokens| !tokens.is_empty())
            .collect();
        alias_sequences.sort_by(|a, b| b.len().cmp(&a.len()));
        alias_sequences.dedup();

        Self {
            alias_sequences,
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Topic key for one headline; empty if nothing topical remains
    pub fn topic_key(&self, headline: &str) -> String {
        let mut tokens = tokenize(headline);
        for alias in &self.alias_sequences {
            tokens = remove_sequence(tokens, alias);
        }

        tokens
            .into_iter()
            .filter(|token| !self.stopwords.contains(token.as_str()))
            .take(TOPIC_KEY_TOKENS)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First `limit` items with unseen topic keys, paired with their keys
    pub fn select<T, F>(&self, items: Vec<T>, title: F, limit: usize) -> Vec<(T, String)>
    where
        F: Fn(&T) -> &str,
    {
        let mut seen = HashSet::new();
        let mut accepted = Vec::new();

        for item in items {
            if accepted.len() >= limit {
                break;
            }
            let key = self.topic_key(title(&item));
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            accepted.push((item, key));
        }

        accepted
    }
}

/// True when at least 60% of the letters are ASCII
pub fn is_latin_script(text: &str) -> bool {
    let (letters, ascii) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, ascii), c| {
            (letters + 1, ascii + usize::from(c.is_ascii_alphabetic()))
        });

    letters > 0 && ascii as f64 / letters as f64 >= LATIN_SCRIPT_THRESHOLD
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn remove_sequence(tokens: Vec<String>, sequence: &[String]) -> Vec<String> {
    if sequence.is_empty() || tokens.len() < sequence.len() {
        return tokens;
    }

    let mut kept = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i..].starts_with(sequence) {
            i += sequence.len();
        } else {
            kept.push(tokens[i].clone());
            i += 1;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dedup() -> NewsDeduplicator {
        NewsDeduplicator::new(
            "United Kingdom",
            &["UK".to_string(), "British".to_string(), "London".to_string()],
        )
    }

    #[test]
    fn test_topic_key_strips_country_and_stopwords() {
        let d = dedup();
        assert_eq!(
            d.topic_key("United Kingdom's Parliament votes on the new budget"),
            "parliament votes budget"
        );
        assert_eq!(
            d.topic_key("UK parliament votes on budget, again!"),
            "parliament votes budget again"
        );
    }

    #[test]
    fn test_alias_removed_only_as_whole_tokens() {
        let d = NewsDeduplicator::new("Oman", &[]);
        assert_eq!(d.topic_key("Romania and Oman sign deal"), "romania sign deal");
    }

    #[test]
    fn test_key_truncated_to_six_tokens() {
        let d = dedup();
        let key = d.topic_key("alpha beta gamma delta epsilon zeta eta theta");
        assert_eq!(key, "alpha beta gamma delta epsilon zeta");
    }

    #[test]
    fn test_select_keeps_first_of_each_topic() {
        let d = dedup();
        let headlines = vec![
            "Strikes spread across rail network",
            "UK: strikes spread across rail network",
            "British strikes spread across the rail network",
            "Bank raises interest rates",
        ];

        let picked = d.select(headlines, |h| h, 5);
        let titles: Vec<&str> = picked.iter().map(|(h, _)| *h).collect();
        assert_eq!(titles, vec!["Strikes spread across rail network", "Bank raises interest rates"]);
    }

    #[test]
    fn test_empty_key_skipped() {
        let d = dedup();
        let picked = d.select(vec!["The UK", "Election called"], |h| h, 5);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].1, "election called");
    }

    #[test]
    fn test_latin_script_filter() {
        assert!(is_latin_script("Élections législatives en France"));
        assert!(!is_latin_script("Выборы в Государственную думу"));
        assert!(!is_latin_script("2024 - 2025"));
    }
}
