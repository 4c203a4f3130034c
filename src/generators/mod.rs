//! Built-in generators.

pub mod nearby_quotes;
pub mod static_items;

pub use nearby_quotes::{CatalogQuoteSource, NearbyQuotesGenerator, Quote, QuoteSource};
pub use static_items::StaticGenerator;
