// Field Resolvers - ordered strategy chains
//
// Each derived field is resolved by an explicit list of strategies tried
// left to right. The first strategy that resolves wins; later strategies
// never run. Adapter failures turn into declined attempts, never errors.

pub mod classifier;
pub mod election;
pub mod executive;
pub mod freedom;
pub mod legislature;
pub mod news;
pub mod political_system;
pub mod regime;
pub mod trend;

use crate::models::{ElectionField, FailureKind, FieldResult, Provenance, ReasonCode};
use async_trait::async_trait;
use tracing::debug;

/// A strategy that did not produce evidence
#[derive(Debug)]
pub struct Declined<O> {
    pub failure: FailureKind,
    /// Sources consulted by this strategy
    pub provenance: Vec<Provenance>,
    /// Partial result to surface if no later strategy resolves
    ///
    /// Carries no provenance of its own; the chain attaches everything consulted.
    pub fallback: Option<O>,
}

/// Outcome of a single strategy attempt
#[derive(Debug)]
pub enum Attempt<O> {
    Resolved(O),
    Declined(Declined<O>),
}

impl<O> Attempt<O> {
    pub fn declined(failure: FailureKind, provenance: Vec<Provenance>) -> Self {
        Self::Declined(Declined {
            failure,
            provenance,
            fallback: None,
        })
    }

    pub fn declined_with_fallback(
        failure: FailureKind,
        provenance: Vec<Provenance>,
        fallback: O,
    ) -> Self {
        Self::Declined(Declined {
            failure,
            provenance,
            fallback: Some(fallback),
        })
    }
}

/// Result types a chain can produce
pub trait ChainOutput: Send {
    /// Result when every strategy declined without a fallback
    fn exhausted(reason: ReasonCode, provenance: Vec<Provenance>) -> Self;

    /// Prepend sources consulted by earlier strategies
    fn prepend_sources(&mut self, earlier: Vec<Provenance>);
}

impl<T: Send> ChainOutput for FieldResult<T> {
    fn exhausted(reason: ReasonCode, provenance: Vec<Provenance>) -> Self {
        let result = match reason {
            ReasonCode::Blocked => FieldResult::blocked(),
            reason => FieldResult::unknown(reason),
        };
        result.with_provenance(provenance)
    }

    fn prepend_sources(&mut self, earlier: Vec<Provenance>) {
        self.prepend_provenance(earlier);
    }
}

impl ChainOutput for ElectionField {
    fn exhausted(reason: ReasonCode, provenance: Vec<Provenance>) -> Self {
        ElectionField::new(FieldResult::exhausted(reason, provenance), None)
    }

    fn prepend_sources(&mut self, earlier: Vec<Provenance>) {
        self.result.prepend_provenance(earlier);
    }
}

/// One derivation method for a field
#[async_trait]
pub trait Strategy<C: Sync, O: Send>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn attempt(&self, ctx: &C) -> Attempt<O>;
}

/// Ordered list of strategies evaluated with early exit
pub struct StrategyChain<C: Sync, O: Send> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<C, O>>>,
}

impl<C: Sync, O: ChainOutput> StrategyChain<C, O> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl Strategy<C, O> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order; never fails
    ///
    /// Exhaustion rules, in order:
    /// 1. the first declined attempt that offered a fallback
    /// 2. `blocked` if any attempt hit a challenge page
    /// 3. `unknown` with the first failure other than `no_signal`
    /// 4. `unknown` / `no_signal`
    pub async fn run(&self, ctx: &C) -> O {
        let mut consulted: Vec<Provenance> = Vec::new();
        let mut fallback: Option<O> = None;
        let mut saw_blocked = false;
        let mut first_failure: Option<FailureKind> = None;

        for strategy in &self.strategies {
            match strategy.attempt(ctx).await {
                Attempt::Resolved(mut output) => {
                    debug!(field = self.field, strategy = strategy.name(), "Strategy resolved");
                    output.prepend_sources(consulted);
                    return output;
                }
                Attempt::Declined(declined) => {
                    debug!(
                        field = self.field,
                        strategy = strategy.name(),
                        reason = %declined.failure,
                        "Strategy declined"
                    );
                    saw_blocked |= declined.failure == FailureKind::Blocked;
                    if first_failure.is_none() && declined.failure != FailureKind::NoSignal {
                        first_failure = Some(declined.failure);
                    }
                    if fallback.is_none() {
                        fallback = declined.fallback;
                    }
                    consulted.extend(declined.provenance);
                }
            }
        }

        if let Some(mut partial) = fallback {
            partial.prepend_sources(consulted);
            return partial;
        }

        let reason = if saw_blocked {
            ReasonCode::Blocked
        } else {
            first_failure
                .map(ReasonCode::from)
                .unwrap_or(ReasonCode::NoSignal)
        };
        O::exhausted(reason, consulted)
    }
}
