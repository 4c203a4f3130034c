//! Feedweave: a concurrent feed aggregation engine.
//!
//! One call builds a consumer's feed by starting every registered
//! [`Generator`] at once against a shared request [`Context`], bounding the
//! whole fan-out by a single wall-clock budget, and merging whatever finished
//! in time into one deterministically ordered, truncated list of [`Item`]s.
//!
//! # Architecture
//!
//! - **Generators** ([`generator`], [`generators`]): independent producers of
//!   typed items. A failing, panicking or slow generator only loses its own
//!   contribution.
//! - **Resource pool** ([`pool`]): every invocation checks out its own handle
//!   from a [`HandlePool`]; handles are never shared between invocations.
//! - **Orchestrator** ([`orchestrator`]): fan-out, budget, cancellation,
//!   fail-open fan-in and ranking by recency.
//! - **Ranking** ([`feedweave_rank`]): haversine distance, K-nearest
//!   selection and weighted scoring used by location-aware generators.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use feedweave::{Context, FeedOrchestrator, FeedRequest, HandlePool, SessionFactory, StaticGenerator};
//!
//! # async fn demo() -> feedweave::Result<()> {
//! let pool = Arc::new(HandlePool::new(SessionFactory));
//! let orchestrator = FeedOrchestrator::new(pool).with_generator(StaticGenerator::new("pinned", Vec::new()));
//!
//! let context = Context::new("consumer-1", "en-IN", 12.97, 77.59);
//! let items = orchestrator.build_feed(&context, &FeedRequest::default()).await?;
//! assert!(items.len() <= 20);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod generators;
pub mod host;
pub mod item;
pub mod orchestrator;
pub mod pool;

pub use config::FeedConfig;
pub use context::{Context, GenerationContext};
pub use error::{FeedError, GeneratorError, PoolError, Result};
pub use generator::Generator;
pub use generators::{CatalogQuoteSource, NearbyQuotesGenerator, Quote, QuoteSource, StaticGenerator};
pub use item::{Item, ItemId, ItemKind, ItemPayload};
pub use orchestrator::{
    FeedOrchestrator, FeedReport, FeedRequest, GenerationOutcome, OutcomeStatus, OutcomeSummary,
};
pub use pool::{HandlePool, PoolStats, PooledHandle, ResourceFactory, Session, SessionFactory};
