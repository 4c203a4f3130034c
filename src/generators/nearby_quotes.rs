//! Price items from the best quotes near the consumer.
//!
//! Pulls located price quotes from a [`QuoteSource`], keeps the nearest
//! `nearest_k`, ranks those by the weighted value / distance / review score
//! and turns the top `max_items` into [`ItemPayload::Price`] items.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedweave_rank::{nearest_k, rank_candidates, GeoPoint, Located, Scorable, ScoringWeights};
use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::context::{Context, GenerationContext};
use crate::error::{FeedError, GeneratorError};
use crate::generator::Generator;
use crate::item::{Item, ItemPayload};
use crate::pool::Session;

/// A price quote from a seller at a known location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Seller name.
    pub seller: String,
    /// Product quoted.
    pub product: String,
    /// Quoted price.
    pub price: f64,
    /// ISO currency code.
    pub currency: String,
    /// Merit of the quote, e.g. saving against the reference price.
    pub value: f64,
    /// Where the seller is.
    pub location: GeoPoint,
    /// Number of reviews backing the seller, if known.
    #[serde(default)]
    pub reviews: Option<f64>,
    /// When the quote was taken.
    pub quoted_at: DateTime<Utc>,
}

impl Located for Quote {
    fn position(&self) -> GeoPoint {
        self.location
    }
}

/// A quote measured against the consumer's position.
struct MeasuredQuote {
    quote: Quote,
    distance_km: f64,
}

impl Scorable for MeasuredQuote {
    fn value(&self) -> f64 {
        self.quote.value
    }

    fn distance_km(&self) -> Option<f64> {
        Some(self.distance_km)
    }

    fn secondary_metric(&self) -> Option<f64> {
        self.quote.reviews
    }
}

/// Where quotes come from. Gets the invocation's own resource to work with.
#[async_trait]
pub trait QuoteSource<R>: Send + Sync {
    /// Quotes relevant to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] if the quotes cannot be fetched.
    async fn quotes(&self, resource: &mut R, context: &Context) -> Result<Vec<Quote>, GeneratorError>;
}

/// Emits price items for the best nearby quotes.
pub struct NearbyQuotesGenerator<S> {
    source: S,
    weights: ScoringWeights,
    nearest_k: usize,
    max_items: usize,
}

impl<S> NearbyQuotesGenerator<S> {
    /// Create a generator over `source` using the ranking settings in `config`.
    pub fn new(source: S, config: &RankingConfig) -> Self {
        Self {
            source,
            weights: config.weights,
            nearest_k: config.nearest_k,
            max_items: 3,
        }
    }

    /// Emit at most `max_items` price items.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }
}

#[async_trait]
impl<R, S> Generator<R> for NearbyQuotesGenerator<S>
where
    R: Send + 'static,
    S: QuoteSource<R>,
{
    fn name(&self) -> &str {
        "nearby_quotes"
    }

    async fn produce(&self, ctx: &mut GenerationContext<R>) -> Result<Vec<Item>, GeneratorError> {
        let (context, resource) = ctx.parts();
        let quotes = self.source.quotes(resource, context).await?;
        let fetched = quotes.len();

        let measured: Vec<MeasuredQuote> = nearest_k(context.location(), quotes, self.nearest_k)
            .into_iter()
            .map(|n| MeasuredQuote {
                quote: n.candidate,
                distance_km: n.distance_km,
            })
            .collect();

        let mut ranked = rank_candidates(measured, &self.weights);
        ranked.truncate(self.max_items);

        tracing::debug!(fetched, selected = ranked.len(), "ranked nearby quotes");

        Ok(ranked
            .into_iter()
            .map(|scored| {
                let quote = scored.candidate.quote;
                let discriminator = format!("{}:{}", quote.seller, quote.product);
                Item::derived(
                    &context.consumer_id,
                    &discriminator,
                    quote.quoted_at,
                    context.locale.clone(),
                    ItemPayload::Price {
                        product: quote.product,
                        seller: quote.seller,
                        price: quote.price,
                        currency: quote.currency,
                        distance_km: scored.distance_km,
                    },
                )
            })
            .collect())
    }
}

/// Serves quotes from a JSON catalog file loaded at start-up.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuoteSource {
    quotes: Vec<Quote>,
}

impl CatalogQuoteSource {
    /// Wrap an in-memory catalog.
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Load a catalog: a JSON array of [`Quote`]s.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let quotes: Vec<Quote> = serde_json::from_str(&content).map_err(FeedError::from)?;
        Ok(Self { quotes })
    }

    /// Number of quotes in the catalog.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait]
impl QuoteSource<Session> for CatalogQuoteSource {
    async fn quotes(&self, session: &mut Session, _context: &Context) -> Result<Vec<Quote>, GeneratorError> {
        session.record_request();
        Ok(self.quotes.clone())
    }
}
