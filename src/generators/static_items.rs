//! A generator that always returns the same items.

use async_trait::async_trait;

use crate::context::GenerationContext;
use crate::error::GeneratorError;
use crate::generator::Generator;
use crate::item::Item;

/// Returns a fixed list of items on every invocation.
///
/// Useful for pinned announcements and as a stand-in while wiring up hosts.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    name: String,
    items: Vec<Item>,
}

impl StaticGenerator {
    /// Create a generator named `name` that yields `items`.
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

#[async_trait]
impl<R: Send + 'static> Generator<R> for StaticGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, _ctx: &mut GenerationContext<R>) -> Result<Vec<Item>, GeneratorError> {
        Ok(self.items.clone())
    }
}
