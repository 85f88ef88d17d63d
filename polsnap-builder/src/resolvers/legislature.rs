//! Legislature control resolver
//!
//! Single strategy: the declared winner of the most recent legislative-type
//! election. A missing winner stays `unknown`; control is never estimated.

use super::classifier::{classify, Grade};
use super::election::ElectionContext;
use crate::models::{
    ControlMethod, FieldResult, LegislatureControlBasis, PartyControlEntry,
    DEFAULT_LEGISLATURE_BODY,
};

/// Caveat attached to every legislature-control result
pub const CONTROL_CAVEAT: &str =
    "Approximation: winner of the most recent legislative election, not necessarily a governing majority";

/// One control entry per legislative body, plus the election it was read from
///
/// `bodies` falls back to a single generic body when the source lists none.
pub async fn control(
    ctx: &ElectionContext<'_>,
    bodies: &[String],
) -> (Vec<PartyControlEntry>, Option<LegislatureControlBasis>) {
    let past = ctx.past_election().await;

    let basis = past.as_ref().ok().and_then(Option::as_ref).map(|election| {
        LegislatureControlBasis {
            election_name: election.name.clone(),
            election_date: election.date,
        }
    });

    let winner = past
        .clone()
        .map(|election| election.and_then(|e| e.winner));
    let controller: FieldResult<String> =
        classify(winner, Grade::Direct, ctx.provenance()).with_notes(CONTROL_CAVEAT);

    let names: Vec<&str> = if bodies.is_empty() {
        vec![DEFAULT_LEGISLATURE_BODY]
    } else {
        bodies.iter().map(String::as_str).collect()
    };

    let entries = names
        .into_iter()
        .map(|body| PartyControlEntry {
            body: body.to_string(),
            controller: controller.clone(),
            method: ControlMethod::WikidataLastLegElectionWinner,
        })
        .collect();

    (entries, basis)
}
