//! Weighted scoring for quoted, located candidates.
//!
//! Blends three signals into one scalar:
//! - the candidate's value (e.g. a discount or rating), rewarded
//! - its distance from the consumer, penalised per 10 km
//! - an optional secondary metric (e.g. review count), rewarded per 1000
//!
//! Formula:
//!
//! ```text
//! score = w_value * value − w_distance * (distance_km / 10) + w_bonus * (secondary_metric / 1000)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RankError;

/// Weights applied to each scoring signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the candidate's value.
    pub w_value: f64,
    /// Penalty weight per 10 km of distance.
    pub w_distance: f64,
    /// Weight of the secondary metric per 1000 units.
    pub w_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            w_value: 1.0,
            w_distance: 0.2,
            w_bonus: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Validates the weights: each must be finite and non-negative.
    pub fn validate(&self) -> Result<(), RankError> {
        for (name, weight) in [
            ("w_value", self.w_value),
            ("w_distance", self.w_distance),
            ("w_bonus", self.w_bonus),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankError::InvalidWeight(format!(
                    "{name} must be finite and non-negative, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Inputs a candidate exposes for scoring.
pub trait Scorable {
    /// The primary value being rewarded.
    fn value(&self) -> f64;

    /// Distance from the consumer in kilometres, if known.
    ///
    /// Candidates without a distance are excluded from ranking.
    fn distance_km(&self) -> Option<f64>;

    /// Secondary metric, if any. Missing counts as zero.
    fn secondary_metric(&self) -> Option<f64> {
        None
    }
}

/// A candidate annotated with its computed score and the inputs behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<T> {
    /// The ranked candidate.
    pub candidate: T,
    /// Computed score (higher is better).
    pub score: f64,
    /// Value used for scoring.
    pub value: f64,
    /// Distance used for scoring.
    pub distance_km: f64,
    /// Secondary metric used for scoring (zero when missing).
    pub secondary_metric: f64,
}

/// Compute the blended score for a single set of inputs.
pub fn score(weights: &ScoringWeights, value: f64, distance_km: f64, secondary_metric: f64) -> f64 {
    weights.w_value * value - weights.w_distance * (distance_km / 10.0)
        + weights.w_bonus * (secondary_metric / 1000.0)
}

/// Score every candidate that has a distance and sort by score descending.
///
/// Equal scores keep their input order. The caller truncates.
pub fn rank_candidates<T: Scorable>(candidates: Vec<T>, weights: &ScoringWeights) -> Vec<ScoredCandidate<T>> {
    let total = candidates.len();
    let mut scored: Vec<ScoredCandidate<T>> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance_km = candidate.distance_km()?;
            let value = candidate.value();
            let secondary_metric = candidate.secondary_metric().unwrap_or(0.0);
            Some(ScoredCandidate {
                score: score(weights, value, distance_km, secondary_metric),
                candidate,
                value,
                distance_km,
                secondary_metric,
            })
        })
        .collect();

    if scored.len() < total {
        tracing::trace!(excluded = total - scored.len(), "candidates without distance excluded");
    }

    // Stable sort so ties keep input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
