//! Feed orchestrator: budgeted fan-out, fail-open invocation, merge and rank.
//!
//! This module starts every generator concurrently against one request,
//! contains each generator's faults at a single invocation wrapper, cancels
//! stragglers at the budget ceiling, and returns a deterministically ordered,
//! truncated item list.

pub mod aggregate;
pub mod feed;
pub mod invocation;
pub mod outcome;

pub use aggregate::{aggregate, feed_order, rank_items};
pub use feed::{FeedOrchestrator, FeedReport, FeedRequest, DEFAULT_BUDGET_SECONDS, DEFAULT_LIMIT, MAX_BUDGET_SECONDS};
pub use outcome::{GenerationOutcome, OutcomeStatus, OutcomeSummary};
