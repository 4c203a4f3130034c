//! # feedweave-rank
//!
//! Ranking primitives for located, quoted candidates.
//!
//! Generators that work with physical places (shops quoting a price, weather
//! stations, points of interest) need to turn a raw candidate list into a short,
//! ordered selection before emitting feed items. This crate provides the two
//! building blocks for that, both pure and deterministic:
//!
//! - [`nearest::nearest_k`] selects the K candidates closest to a reference
//!   point by great-circle (haversine) distance.
//! - [`scoring::rank_candidates`] orders candidates by a blended
//!   value / distance / bonus score.
//!
//! ## Scoring formula
//!
//! ```text
//! score = w_value * value − w_distance * (distance_km / 10) + w_bonus * (secondary_metric / 1000)
//! ```
//!
//! ## Example
//!
//! ```
//! use feedweave_rank::{nearest_k, GeoPoint, Located};
//!
//! struct Shop(GeoPoint);
//!
//! impl Located for Shop {
//!     fn position(&self) -> GeoPoint {
//!         self.0
//!     }
//! }
//!
//! let home = GeoPoint::new(12.97, 77.59);
//! let shops = vec![Shop(GeoPoint::new(13.5, 77.59)), Shop(GeoPoint::new(13.0, 77.59))];
//! let nearest = nearest_k(home, shops, 1);
//! assert_eq!(nearest.len(), 1);
//! assert!(nearest[0].distance_km < 5.0);
//! ```

pub mod error;
pub mod geo;
pub mod nearest;
pub mod scoring;

pub use error::{RankError, Result};
pub use geo::{haversine_km, GeoPoint, Located, EARTH_RADIUS_KM};
pub use nearest::{nearest_k, Neighbour};
pub use scoring::{rank_candidates, score, Scorable, ScoredCandidate, ScoringWeights};
