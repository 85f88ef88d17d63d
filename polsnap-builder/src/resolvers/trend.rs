//! Economic trend resolver
//!
//! Pages the indicator series by offset/limit until the source total is
//! reached, a page comes back empty, or the page cap is hit. The latest
//! non-null observations form the series, oldest first.

use super::classifier::{from_failure, settle, Grade};
use crate::models::{FieldResult, Provenance, ReasonCode, TrendDirection, TrendPoint, TrendSeries};
use crate::sources::{IndicatorSource, Observation};
use tracing::debug;

pub const PAGE_SIZE: usize = 50;
pub const MAX_PAGES: usize = 4;
/// Points kept in the series
pub const SERIES_LENGTH: usize = 5;
/// Changes smaller than this are `flat`
pub const FLAT_THRESHOLD: f64 = 0.1;

/// Direction from the last two points
pub fn direction(points: &[TrendPoint]) -> TrendDirection {
    match points {
        [.., previous, latest] => {
            let delta = latest.value - previous.value;
            if delta.abs() < FLAT_THRESHOLD {
                TrendDirection::Flat
            } else if delta > 0.0 {
                TrendDirection::Rising
            } else {
                TrendDirection::Falling
            }
        }
        _ => TrendDirection::Flat,
    }
}

/// Latest non-null observations, oldest first
pub fn latest_points(observations: &[Observation], count: usize) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = observations
        .iter()
        .filter_map(|obs| obs.value.map(|value| TrendPoint { year: obs.year, value }))
        .collect();

    points.sort_by(|a, b| b.year.cmp(&a.year));
    points.dedup_by_key(|p| p.year);
    points.truncate(count);
    points.reverse();
    points
}

pub async fn resolve(
    source: &dyn IndicatorSource,
    iso2: &str,
    indicator: &str,
) -> FieldResult<TrendSeries> {
    let provenance = vec![Provenance::new(source.endpoint(), Some(indicator))];
    let mut observations = Vec::new();
    let mut offset = 0;

    for page_index in 0..MAX_PAGES {
        match source.page(iso2, indicator, offset, PAGE_SIZE).await {
            Ok(page) => {
                let received = page.observations.len();
                observations.extend(page.observations);
                offset += PAGE_SIZE;
                if received == 0 || offset >= page.total {
                    break;
                }
            }
            Err(failure) if page_index == 0 => return from_failure(&failure, provenance),
            Err(failure) => {
                debug!(iso2, indicator, failure = %failure, "Indicator paging stopped early");
                break;
            }
        }
    }

    let points = latest_points(&observations, SERIES_LENGTH);
    let Some(latest) = points.last().cloned() else {
        return FieldResult::unknown(ReasonCode::NoSignal).with_provenance(provenance);
    };

    let series = TrendSeries {
        indicator: indicator.to_string(),
        latest_year: latest.year,
        latest_value: latest.value,
        direction: direction(&points),
        points,
    };
    settle(series, Grade::Direct, provenance)
}
