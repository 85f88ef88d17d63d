//! Freedom rating resolver
//!
//! One strategy per candidate report year, newest first: the reference year,
//! then three further years back. The reference year hit is `ok`; an older
//! year is `computed` / `derived_from_fallback`. When every year fails the
//! field is `blocked` if any page was a challenge, else `unknown`.

use super::classifier::{settle, Grade};
use super::{Attempt, Strategy, StrategyChain};
use crate::models::{FailureKind, FieldResult, FreedomRating, Provenance, ReasonCode};
use crate::sources::freedom_house::parse_score_and_status;
use crate::sources::RatingSource;
use async_trait::async_trait;

/// Years tried after the reference year
pub const FALLBACK_YEARS: i32 = 3;

pub struct FreedomContext<'a> {
    pub source: &'a dyn RatingSource,
    pub slug: &'a str,
    pub reference_year: i32,
}

/// Candidate report years, newest first
pub fn candidate_years(reference_year: i32) -> Vec<i32> {
    (0..=FALLBACK_YEARS).map(|back| reference_year - back).collect()
}

pub struct RatingYearStrategy {
    year: i32,
}

#[async_trait]
impl<'a> Strategy<FreedomContext<'a>, FieldResult<FreedomRating>> for RatingYearStrategy {
    fn name(&self) -> &'static str {
        "freedom_house_year"
    }

    async fn attempt(&self, ctx: &FreedomContext<'a>) -> Attempt<FieldResult<FreedomRating>> {
        let url = ctx.source.page_url(ctx.slug, self.year);
        let provenance = vec![Provenance::new(url, None)];

        let page = match ctx.source.rating_page(ctx.slug, self.year).await {
            Ok(page) => page,
            Err(failure) => return Attempt::declined(failure.kind, provenance),
        };

        let Some((score, status)) = parse_score_and_status(&page.html) else {
            return Attempt::declined(FailureKind::ParseFailure, provenance);
        };

        let rating = FreedomRating {
            score,
            status,
            year: self.year,
            source_url: page.url,
        };

        let result = if self.year == ctx.reference_year {
            settle(rating, Grade::Direct, provenance)
        } else {
            settle(rating, Grade::Computed(ReasonCode::DerivedFromFallback), provenance).with_notes(
                format!(
                    "No rating published for {}; using the {} report",
                    ctx.reference_year, self.year
                ),
            )
        };
        Attempt::Resolved(result)
    }
}

/// Resolve the freedom rating over the candidate-year window
pub async fn resolve(ctx: &FreedomContext<'_>) -> FieldResult<FreedomRating> {
    let mut chain: StrategyChain<FreedomContext<'_>, FieldResult<FreedomRating>> =
        StrategyChain::new("freedom_rating");
    for year in candidate_years(ctx.reference_year) {
        chain = chain.then(RatingYearStrategy { year });
    }

    chain.run(ctx).await
}
