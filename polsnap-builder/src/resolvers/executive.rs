//! Leaders and executive party control
//!
//! Executive party chain: head-of-government party (`ok`), else
//! head-of-state party (`computed` / `derived_from_fallback`), else `unknown`.

use super::classifier::{classify, from_failure, settle, Grade};
use super::{Attempt, Strategy, StrategyChain};
use crate::models::{
    ControlMethod, FailureKind, FieldResult, Leader, LeaderRole, PartyControlEntry, Provenance,
    ReasonCode, EXECUTIVE_BODY,
};
use crate::sources::{GovernmentRecord, OfficeHolder, SourceResult};
use async_trait::async_trait;

/// Government record lookup plus where it came from
pub struct ExecutiveContext<'a> {
    pub record: &'a SourceResult<GovernmentRecord>,
    pub provenance: Vec<Provenance>,
}

fn office(record: &GovernmentRecord, role: LeaderRole) -> &OfficeHolder {
    match role {
        LeaderRole::HeadOfState => &record.head_of_state,
        LeaderRole::HeadOfGovernment => &record.head_of_government,
    }
}

/// Party of one office holder
pub struct OfficePartyStrategy {
    role: LeaderRole,
    grade: Grade,
}

impl OfficePartyStrategy {
    pub fn head_of_government() -> Self {
        Self {
            role: LeaderRole::HeadOfGovernment,
            grade: Grade::Direct,
        }
    }

    pub fn head_of_state() -> Self {
        Self {
            role: LeaderRole::HeadOfState,
            grade: Grade::Computed(ReasonCode::DerivedFromFallback),
        }
    }
}

#[async_trait]
impl<'a> Strategy<ExecutiveContext<'a>, FieldResult<String>> for OfficePartyStrategy {
    fn name(&self) -> &'static str {
        match self.role {
            LeaderRole::HeadOfGovernment => "hog_party",
            LeaderRole::HeadOfState => "hos_party",
        }
    }

    async fn attempt(&self, ctx: &ExecutiveContext<'a>) -> Attempt<FieldResult<String>> {
        let holder = match ctx.record {
            Ok(record) => office(record, self.role),
            Err(failure) => return Attempt::declined(failure.kind, Vec::new()),
        };

        match holder.party.clone() {
            Some(party) if !party.trim().is_empty() => {
                let notes = match &holder.name {
                    Some(name) => format!("Party of {}", name),
                    None => "Party of the office holder".to_string(),
                };
                Attempt::Resolved(
                    settle(party, self.grade, ctx.provenance.clone()).with_notes(notes),
                )
            }
            _ => Attempt::declined(FailureKind::NoSignal, Vec::new()),
        }
    }
}

/// Executive party-control entry
pub async fn executive_party(ctx: &ExecutiveContext<'_>) -> PartyControlEntry {
    let chain: StrategyChain<ExecutiveContext<'_>, FieldResult<String>> =
        StrategyChain::new("executive_party")
            .then(OfficePartyStrategy::head_of_government())
            .then(OfficePartyStrategy::head_of_state());

    let mut controller = chain.run(ctx).await;
    // Every decline carries no provenance; record the lookup itself
    if controller.provenance().is_empty() {
        controller = controller.with_provenance(ctx.provenance.clone());
    }

    PartyControlEntry {
        body: EXECUTIVE_BODY.to_string(),
        controller,
        method: ControlMethod::HogPartyElseHosParty,
    }
}

/// Head of state and head of government, in that order
pub fn leaders(ctx: &ExecutiveContext<'_>) -> Vec<Leader> {
    [LeaderRole::HeadOfState, LeaderRole::HeadOfGovernment]
        .into_iter()
        .map(|role| match ctx.record {
            Ok(record) => {
                let holder = office(record, role);
                Leader {
                    role,
                    name: classify(Ok(holder.name.clone()), Grade::Direct, ctx.provenance.clone()),
                    party: classify(Ok(holder.party.clone()), Grade::Direct, ctx.provenance.clone()),
                }
            }
            Err(failure) => Leader {
                role,
                name: from_failure(failure, ctx.provenance.clone()),
                party: from_failure(failure, ctx.provenance.clone()),
            },
        })
        .collect()
}
