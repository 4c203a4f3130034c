//! Per-generator results of one fan-out.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// How a generator invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Finished within the budget and returned items (possibly none).
    Succeeded,
    /// Returned an error, panicked, or could not get a resource handle.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
    /// Still running at the budget ceiling and was cancelled.
    Cancelled,
}

/// Transient result of one generator invocation.
///
/// Only a succeeded outcome carries items; failed and cancelled outcomes
/// always contribute an empty list.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Generator name.
    pub generator: String,
    /// Items produced.
    pub items: Vec<Item>,
    /// Wall-clock time the invocation ran.
    pub duration: Duration,
    /// How the invocation ended.
    pub status: OutcomeStatus,
}

impl GenerationOutcome {
    /// A successful invocation.
    pub fn succeeded(generator: impl Into<String>, items: Vec<Item>, duration: Duration) -> Self {
        Self {
            generator: generator.into(),
            items,
            duration,
            status: OutcomeStatus::Succeeded,
        }
    }

    /// A failed invocation.
    pub fn failed(generator: impl Into<String>, reason: impl Into<String>, duration: Duration) -> Self {
        Self {
            generator: generator.into(),
            items: Vec::new(),
            duration,
            status: OutcomeStatus::Failed { reason: reason.into() },
        }
    }

    /// An invocation cancelled at the budget ceiling.
    pub fn cancelled(generator: impl Into<String>, duration: Duration) -> Self {
        Self {
            generator: generator.into(),
            items: Vec::new(),
            duration,
            status: OutcomeStatus::Cancelled,
        }
    }

    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    /// Emit the structured per-generator log entry.
    pub fn log(&self) {
        let duration_ms = self.duration.as_millis() as u64;
        match &self.status {
            OutcomeStatus::Succeeded => {
                tracing::info!(
                    generator = %self.generator,
                    duration_ms,
                    item_count = self.items.len(),
                    "generator succeeded"
                );
            }
            OutcomeStatus::Failed { reason } => {
                tracing::warn!(generator = %self.generator, duration_ms, reason = %reason, "generator failed");
            }
            OutcomeStatus::Cancelled => {
                tracing::warn!(generator = %self.generator, duration_ms, cancelled = true, "generator cancelled at budget");
            }
        }
    }

    /// A serializable summary without the items.
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            generator: self.generator.clone(),
            status: self.status.clone(),
            duration_ms: self.duration.as_millis() as u64,
            item_count: self.items.len(),
        }
    }
}

/// Item-free view of a [`GenerationOutcome`] for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    /// Generator name.
    pub generator: String,
    /// How the invocation ended.
    #[serde(flatten)]
    pub status: OutcomeStatus,
    /// Wall-clock time the invocation ran, in milliseconds.
    pub duration_ms: u64,
    /// Number of items produced.
    pub item_count: usize,
}
