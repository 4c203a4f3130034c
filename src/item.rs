//! Feed items and their deterministic identifiers.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a feed item.
///
/// Derived ids are a function of (kind, consumer, day, discriminator), so
/// producing the same item twice on the same day yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identifier for an item of `kind` for `consumer_id` on `day`.
    ///
    /// `discriminator` separates several items of one kind on the same day
    /// (a shop id, a topic, a forecast hour).
    pub fn derive(kind: ItemKind, consumer_id: &str, day: NaiveDate, discriminator: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in [kind.as_str(), consumer_id, &day.to_string(), discriminator] {
            // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        let hex = hasher.finalize().to_hex();
        Self(format!("{}-{}", kind.as_str(), &hex.as_str()[..32]))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of payload an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Weather summary.
    Weather,
    /// Price quote.
    Price,
    /// Advice or tip.
    Tip,
    /// Trending topic.
    Trend,
    /// Insight about the consumer's area.
    LocationInsight,
    /// Free-form note.
    Note,
}

impl ItemKind {
    /// Stable lowercase name used in identifiers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Price => "price",
            Self::Tip => "tip",
            Self::Trend => "trend",
            Self::LocationInsight => "location_insight",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-typed content of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemPayload {
    /// Current or forecast weather.
    Weather {
        /// Short condition text.
        summary: String,
        /// Temperature in degrees Celsius.
        temperature_c: f64,
    },
    /// A located price quote.
    Price {
        /// Product being quoted.
        product: String,
        /// Seller offering the price.
        seller: String,
        /// Quoted price.
        price: f64,
        /// ISO currency code.
        currency: String,
        /// Distance from the consumer in kilometres.
        distance_km: f64,
    },
    /// A tip.
    Tip {
        /// Tip text.
        text: String,
    },
    /// A trending topic.
    Trend {
        /// Topic name.
        topic: String,
        /// Relative popularity.
        score: f64,
    },
    /// Something notable about the consumer's area.
    LocationInsight {
        /// Insight headline.
        title: String,
        /// Longer body text.
        body: String,
    },
    /// Free-form text.
    Note {
        /// Note text.
        text: String,
    },
}

impl ItemPayload {
    /// The kind of this payload.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Weather { .. } => ItemKind::Weather,
            Self::Price { .. } => ItemKind::Price,
            Self::Tip { .. } => ItemKind::Tip,
            Self::Trend { .. } => ItemKind::Trend,
            Self::LocationInsight { .. } => ItemKind::LocationInsight,
            Self::Note { .. } => ItemKind::Note,
        }
    }
}

/// A unit of content shown in the feed. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// Locale the content is written for.
    pub locale: String,
    /// Content.
    pub payload: ItemPayload,
}

impl Item {
    /// Build an item with an explicit id.
    pub fn new(id: ItemId, created_at: DateTime<Utc>, locale: impl Into<String>, payload: ItemPayload) -> Self {
        Self {
            id,
            created_at,
            locale: locale.into(),
            payload,
        }
    }

    /// Build an item whose id is derived from its kind, consumer, creation
    /// day and `discriminator`.
    pub fn derived(
        consumer_id: &str,
        discriminator: &str,
        created_at: DateTime<Utc>,
        locale: impl Into<String>,
        payload: ItemPayload,
    ) -> Self {
        let id = ItemId::derive(payload.kind(), consumer_id, created_at.date_naive(), discriminator);
        Self::new(id, created_at, locale, payload)
    }

    /// The kind of this item's payload.
    pub fn kind(&self) -> ItemKind {
        self.payload.kind()
    }
}
