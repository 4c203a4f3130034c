//! Request context handed to every generator.

use feedweave_rank::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::pool::PooledHandle;

/// Immutable description of one feed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Consumer the feed is built for.
    pub consumer_id: String,
    /// Locale tag, e.g. `en-IN`.
    pub locale: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Postal code, when the consumer supplied one.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Topics the consumer follows.
    #[serde(default)]
    pub topic_ids: Vec<String>,
}

impl Context {
    /// Create a context without postal code or topics.
    pub fn new(consumer_id: impl Into<String>, locale: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            locale: locale.into(),
            latitude,
            longitude,
            postal_code: None,
            topic_ids: Vec::new(),
        }
    }

    /// Attach a postal code.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Attach followed topics.
    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_ids = topics.into_iter().map(Into::into).collect();
        self
    }

    /// The consumer's position.
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Rejects contexts no generator could sensibly serve.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.consumer_id.trim().is_empty() {
            return Err(FeedError::InvalidArguments("consumer_id must not be empty".into()));
        }
        if !self.location().is_valid() {
            return Err(FeedError::InvalidArguments(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        Ok(())
    }
}

/// The private view one generator invocation works with.
///
/// Holds its own copy of the request [`Context`] and the resource handle
/// checked out for this invocation only. Dropping it releases the handle.
#[derive(Debug)]
pub struct GenerationContext<R> {
    context: Context,
    handle: PooledHandle<R>,
}

impl<R> GenerationContext<R> {
    /// Pair a context copy with the handle checked out for this invocation.
    pub fn new(context: Context, handle: PooledHandle<R>) -> Self {
        Self { context, handle }
    }

    /// The request context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Exclusive access to this invocation's resource.
    pub fn resource(&mut self) -> &mut R {
        self.handle.resource_mut()
    }

    /// The request context and the resource, borrowed together.
    pub fn parts(&mut self) -> (&Context, &mut R) {
        (&self.context, self.handle.resource_mut())
    }

    /// Identifier of the handle, unique within its pool.
    pub fn handle_id(&self) -> u64 {
        self.handle.id()
    }
}
