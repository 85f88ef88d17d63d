//! Sticky Merge
//!
//! Staleness-tolerant fields (freedom rating, executive and legislature
//! party control) keep the last known-good value when a refresh fails.
//!
//! **Rule:**
//! - `new` is `ok` → `new`
//! - else `previous` is `ok` → previous value and provenance, status `ok`,
//!   carry-over and `new`'s reason appended to the previous notes
//! - else → `new`
//!
//! A freshly fetched freedom rating is kept whenever its report year is not
//! older than the previous one, even when it came from a fallback year.
//!
//! Provenance keeps the original `retrievedAt`, so staleness stays auditable.
//! Election dates are never merged.

use crate::models::{CountrySnapshot, FieldResult, FreedomRating, PartyControlEntry, Snapshot};
use std::collections::HashMap;
use tracing::info;

/// Leading text of every carry-over note
pub const CARRY_OVER_NOTE: &str = "Carried over from the previous snapshot";

/// Merge one field against its previous value
pub fn merge<T: Clone>(new: FieldResult<T>, previous: Option<&FieldResult<T>>) -> FieldResult<T> {
    if new.is_ok() {
        return new;
    }

    match previous {
        Some(previous) if previous.is_ok() => {
            let cause = new
                .reason()
                .map(|reason| reason.as_str())
                .unwrap_or_else(|| new.status().as_str());
            let carry = match previous.provenance().first() {
                Some(source) => format!(
                    "{} (retrieved {}); refresh failed: {}",
                    CARRY_OVER_NOTE,
                    source.retrieved_at.format("%Y-%m-%d"),
                    cause
                ),
                None => format!("{}; refresh failed: {}", CARRY_OVER_NOTE, cause),
            };
            let notes = match base_notes(previous.notes()) {
                Some(base) => format!("{}. {}", base, carry),
                None => carry,
            };
            previous.clone().into_carried_over(notes)
        }
        _ => new,
    }
}

/// Previous notes without an earlier carry-over sentence
fn base_notes(notes: Option<&str>) -> Option<&str> {
    let notes = notes?;
    let kept = match notes.find(CARRY_OVER_NOTE) {
        Some(at) => &notes[..at],
        None => notes,
    };
    let kept = kept.trim_end().trim_end_matches(['.', ';']).trim_end();
    (!kept.is_empty()).then_some(kept)
}

/// Read-only lookup of the previous run's countries by ISO2 code
#[derive(Debug, Default)]
pub struct PreviousSnapshotIndex {
    countries: HashMap<String, CountrySnapshot>,
}

impl PreviousSnapshotIndex {
    pub fn new(previous: Option<Snapshot>) -> Self {
        let countries = previous
            .map(|snapshot| {
                snapshot
                    .countries
                    .into_iter()
                    .map(|country| (country.iso2.to_ascii_uppercase(), country))
                    .collect()
            })
            .unwrap_or_default();
        Self { countries }
    }

    pub fn get(&self, iso2: &str) -> Option<&CountrySnapshot> {
        self.countries.get(&iso2.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Freedom rating against the previous rating
///
/// A fresh value from the same or a later report year replaces the previous
/// one regardless of status.
pub fn merge_rating(
    new: FieldResult<FreedomRating>,
    previous: Option<&FieldResult<FreedomRating>>,
) -> FieldResult<FreedomRating> {
    let previous_year = previous.and_then(|p| p.value()).map(|rating| rating.year);
    match (new.value(), previous_year) {
        (Some(fresh), Some(year)) if fresh.year >= year => new,
        _ => merge(new, previous),
    }
}

/// Freedom rating against the previous country record
pub fn merge_freedom_rating(
    new: FieldResult<FreedomRating>,
    previous: Option<&CountrySnapshot>,
) -> FieldResult<FreedomRating> {
    merge_rating(new, previous.map(|country| &country.freedom_rating))
}

/// Party-control entries, matched to previous entries by body name
pub fn merge_party_control(
    entries: Vec<PartyControlEntry>,
    previous: Option<&CountrySnapshot>,
) -> Vec<PartyControlEntry> {
    entries
        .into_iter()
        .map(|entry| {
            let prior = previous
                .and_then(|country| country.party_control(&entry.body))
                .map(|prior| &prior.controller);
            PartyControlEntry {
                controller: merge(entry.controller, prior),
                ..entry
            }
        })
        .collect()
}

/// Apply sticky merge to every staleness-tolerant field of a fresh record
pub fn apply(country: &mut CountrySnapshot, previous: Option<&CountrySnapshot>) {
    let Some(previous) = previous else {
        return;
    };

    let refreshed_rating = country.freedom_rating.is_ok();
    country.freedom_rating = merge_freedom_rating(country.freedom_rating.clone(), Some(previous));
    if !refreshed_rating && country.freedom_rating.is_ok() {
        info!(country = %country.country, field = "freedom_rating", "Carried over previous value");
    }

    let entries = std::mem::take(&mut country.government.party_control);
    let refreshed: Vec<bool> = entries.iter().map(|e| e.controller.is_ok()).collect();
    country.government.party_control = merge_party_control(entries, Some(previous));
    for (entry, was_ok) in country.government.party_control.iter().zip(refreshed) {
        if !was_ok && entry.controller.is_ok() {
            info!(country = %country.country, field = "party_control", body = %entry.body, "Carried over previous value");
        }
    }
}
