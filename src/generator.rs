//! Trait definition for pluggable feed generators.
//!
//! Each content source (weather, prices, tips, trends, location insights)
//! implements [`Generator`] so the orchestrator can fan out to all of them
//! through one interface.

use async_trait::async_trait;

use crate::context::GenerationContext;
use crate::error::GeneratorError;
use crate::item::Item;

/// A pluggable source of feed items.
///
/// Implementors produce zero or more [`Item`]s for one request. They may be
/// slow, fail, or even panic; the orchestrator contains all of that and treats
/// the invocation as contributing nothing.
///
/// Implementations should reach an `.await` point regularly: cancellation at
/// the budget ceiling takes effect at the next suspension point.
///
/// All implementations must be `Send + Sync` for concurrent invocation.
#[async_trait]
pub trait Generator<R: Send + 'static>: Send + Sync {
    /// Name used in logs and outcome reports.
    fn name(&self) -> &str;

    /// Produce items for the request in `ctx`.
    ///
    /// `ctx` carries a private copy of the request context and this
    /// invocation's own resource handle.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when the items cannot be produced. The
    /// error is logged by the orchestrator and never reaches the caller.
    async fn produce(&self, ctx: &mut GenerationContext<R>) -> Result<Vec<Item>, GeneratorError>;
}
