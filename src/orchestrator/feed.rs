//! Core feed orchestrator: budgeted concurrent fan-out, fail-open fan-in, rank.
//!
//! Starts every registered generator at once, waits for all of them up to a
//! single wall-clock budget, cancels whatever is still running at the
//! ceiling, and ranks the items of everything that finished in time.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::OrchestratorConfig;
use crate::context::Context;
use crate::error::FeedError;
use crate::generator::Generator;
use crate::item::Item;
use crate::pool::{HandlePool, ResourceFactory};

use super::aggregate::aggregate;
use super::invocation::run_invocation;
use super::outcome::{GenerationOutcome, OutcomeStatus, OutcomeSummary};

/// Default number of items returned.
pub const DEFAULT_LIMIT: usize = 20;

/// Default wall-clock budget in seconds.
pub const DEFAULT_BUDGET_SECONDS: f64 = 30.0;

/// Largest accepted budget in seconds (one day).
pub const MAX_BUDGET_SECONDS: f64 = 86_400.0;

/// Parameters of one "build feed" call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    /// Maximum number of items returned.
    pub limit: usize,
    /// Wall-clock ceiling for the whole fan-out, in seconds.
    pub budget_seconds: f64,
}

impl Default for FeedRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            budget_seconds: DEFAULT_BUDGET_SECONDS,
        }
    }
}

impl FeedRequest {
    /// A request using the configured defaults.
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self {
            limit: config.default_limit,
            budget_seconds: config.default_budget_seconds,
        }
    }

    /// Validates the budget and converts it to a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidArguments`] if the budget is zero,
    /// negative, NaN, infinite or above [`MAX_BUDGET_SECONDS`].
    pub fn budget(&self) -> Result<Duration, FeedError> {
        if !self.budget_seconds.is_finite() || self.budget_seconds <= 0.0 {
            return Err(FeedError::InvalidArguments(format!(
                "budget_seconds must be a positive number, got {}",
                self.budget_seconds
            )));
        }
        if self.budget_seconds > MAX_BUDGET_SECONDS {
            return Err(FeedError::InvalidArguments(format!(
                "budget_seconds must be at most {MAX_BUDGET_SECONDS}, got {}",
                self.budget_seconds
            )));
        }
        Duration::try_from_secs_f64(self.budget_seconds)
            .map_err(|e| FeedError::InvalidArguments(format!("budget_seconds: {e}")))
    }
}

/// Everything one fan-out produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedReport {
    /// Ranked, truncated items.
    pub items: Vec<Item>,
    /// One entry per registered generator, in registration order.
    pub outcomes: Vec<OutcomeSummary>,
    /// Wall-clock time of the whole call.
    pub total_duration: Duration,
}

impl FeedReport {
    /// Number of generators that succeeded.
    pub fn successful_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Succeeded)
            .count()
    }

    /// The status reported for `generator`, if it was registered.
    pub fn status_of(&self, generator: &str) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|o| o.generator == generator)
            .map(|o| &o.status)
    }
}

/// Fans out to registered generators and merges their results.
pub struct FeedOrchestrator<F: ResourceFactory> {
    generators: Vec<Arc<dyn Generator<F::Resource>>>,
    pool: Arc<HandlePool<F>>,
    drain_grace: Duration,
}

impl<F: ResourceFactory> FeedOrchestrator<F> {
    /// Create an orchestrator with no generators, drawing handles from `pool`.
    pub fn new(pool: Arc<HandlePool<F>>) -> Self {
        Self::with_config(pool, &OrchestratorConfig::default())
    }

    /// Create an orchestrator using the drain grace from `config`.
    pub fn with_config(pool: Arc<HandlePool<F>>, config: &OrchestratorConfig) -> Self {
        Self {
            generators: Vec::new(),
            pool,
            drain_grace: config.drain_grace(),
        }
    }

    /// Register a generator. Registration order only affects report order.
    pub fn register(&mut self, generator: Arc<dyn Generator<F::Resource>>) -> &mut Self {
        self.generators.push(generator);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_generator<G>(mut self, generator: G) -> Self
    where
        G: Generator<F::Resource> + 'static,
    {
        self.generators.push(Arc::new(generator));
        self
    }

    /// Number of registered generators.
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    /// The resource pool invocations draw from.
    pub fn pool(&self) -> &Arc<HandlePool<F>> {
        &self.pool
    }

    /// Build the feed: ranked items, at most `request.limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidArguments`] for a non-positive budget or a
    /// malformed context. Generator failures never cause an error; if every
    /// generator fails or times out the result is an empty list.
    pub async fn build_feed(&self, context: &Context, request: &FeedRequest) -> Result<Vec<Item>, FeedError> {
        Ok(self.run(context, request).await?.items)
    }

    /// Like [`build_feed`](Self::build_feed), also reporting per-generator outcomes.
    ///
    /// # Errors
    ///
    /// Same as [`build_feed`](Self::build_feed).
    pub async fn run(&self, context: &Context, request: &FeedRequest) -> Result<FeedReport, FeedError> {
        // Reject before anything is spawned.
        let budget = request.budget()?;
        context.validate()?;

        let started = Instant::now();
        let deadline = started
            .checked_add(budget)
            .ok_or_else(|| FeedError::InvalidArguments(format!("budget of {budget:?} overflows the clock")))?;
        let cancel = CancellationToken::new();

        let mut tasks = JoinSet::new();
        for (index, generator) in self.generators.iter().enumerate() {
            let invocation = run_invocation(
                Arc::clone(generator),
                Arc::clone(&self.pool),
                context.clone(),
                cancel.child_token(),
            );
            tasks.spawn(async move { (index, invocation.await) });
        }

        let mut slots: Vec<Option<GenerationOutcome>> = (0..self.generators.len()).map(|_| None).collect();

        let budget_hit = tokio::time::timeout_at(deadline, collect(&mut tasks, &mut slots, false))
            .await
            .is_err();

        if budget_hit {
            cancel.cancel();
            let drained = tokio::time::timeout(self.drain_grace, collect(&mut tasks, &mut slots, true))
                .await
                .is_ok();
            if !drained {
                tracing::warn!(
                    pending = tasks.len(),
                    grace_ms = self.drain_grace.as_millis() as u64,
                    "invocations ignored cancellation, aborting"
                );
                tasks.abort_all();
                collect(&mut tasks, &mut slots, true).await;
            }
        }

        let outcomes: Vec<GenerationOutcome> = slots
            .into_iter()
            .zip(&self.generators)
            .map(|(slot, generator)| {
                slot.unwrap_or_else(|| {
                    // Only aborted tasks leave no outcome behind.
                    if budget_hit {
                        GenerationOutcome::cancelled(generator.name(), started.elapsed())
                    } else {
                        GenerationOutcome::failed(generator.name(), "invocation task aborted", started.elapsed())
                    }
                })
            })
            .collect();

        for outcome in &outcomes {
            outcome.log();
        }

        let summaries: Vec<OutcomeSummary> = outcomes.iter().map(GenerationOutcome::summary).collect();
        let successful_count = outcomes.iter().filter(|o| o.is_success()).count();
        let total_count = outcomes.len();

        let items = aggregate(outcomes, request.limit);
        let total_duration = started.elapsed();

        tracing::info!(
            total_duration_ms = total_duration.as_millis() as u64,
            successful_count,
            total_count,
            returned_count = items.len(),
            budget_hit,
            "feed built"
        );

        Ok(FeedReport {
            items,
            outcomes: summaries,
            total_duration,
        })
    }
}

/// Join finished invocations into their slots until the set is empty.
///
/// With `late` set (draining after the budget ceiling) a success is recorded
/// as cancelled: only work finished by the deadline contributes items.
///
/// Cancel-safe: dropping this future loses no outcome that was already joined.
async fn collect(
    tasks: &mut JoinSet<(usize, GenerationOutcome)>,
    slots: &mut [Option<GenerationOutcome>],
    late: bool,
) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, mut outcome)) => {
                if late && outcome.is_success() {
                    tracing::debug!(generator = %outcome.generator, "generator finished after budget, discarding items");
                    outcome = GenerationOutcome::cancelled(outcome.generator, outcome.duration);
                }
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(outcome);
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "invocation task ended without an outcome");
            }
        }
    }
}
