//! Merge, order and truncate the items of a completed fan-out.
//!
//! Pure and deterministic: the final order is newest first, ties broken by
//! ascending item id, so identical inputs always give identical output no
//! matter which generator finished first.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::item::Item;

use super::outcome::GenerationOutcome;

/// Concatenate the items of every outcome, order them and keep at most `limit`.
///
/// Outcomes are already fail-open; failed and cancelled ones simply
/// contribute no items.
pub fn aggregate(outcomes: Vec<GenerationOutcome>, limit: usize) -> Vec<Item> {
    let items: Vec<Item> = outcomes.into_iter().flat_map(|outcome| outcome.items).collect();
    rank_items(items, limit)
}

/// Order `items` by (created_at desc, id asc), collapse duplicate ids and
/// truncate to `limit`.
///
/// When two items share an id, the one that comes first in feed order is kept.
pub fn rank_items(mut items: Vec<Item>, limit: usize) -> Vec<Item> {
    if limit == 0 {
        return Vec::new();
    }

    items.sort_by(feed_order);

    let mut seen = HashSet::with_capacity(items.len());
    let mut ranked = Vec::with_capacity(limit.min(items.len()));
    for item in items {
        if ranked.len() == limit {
            break;
        }
        if seen.insert(item.id.clone()) {
            ranked.push(item);
        }
    }
    ranked
}

/// Newest first; equal timestamps by ascending id.
pub fn feed_order(a: &Item, b: &Item) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}
