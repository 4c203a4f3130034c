//! Top-K nearest-neighbour selection by haversine distance.
//!
//! Given a reference point and a list of located candidates, returns the K
//! candidates closest to the reference, nearest first. Candidates at equal
//! distance keep their input order, so repeated calls over the same input
//! produce the same output.

use std::cmp::Ordering;

use crate::geo::{haversine_km, GeoPoint, Located};

/// A selected candidate together with its distance from the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour<T> {
    /// The candidate.
    pub candidate: T,
    /// Great-circle distance from the reference point in kilometres.
    pub distance_km: f64,
}

/// Select the `k` candidates nearest to `reference`, ascending by distance.
///
/// - `k >= candidates.len()` returns every candidate, sorted.
/// - `k == 0` or an empty candidate list returns an empty vector.
/// - Non-finite coordinates never panic; where such candidates land in the
///   output is unspecified.
pub fn nearest_k<T: Located>(reference: GeoPoint, candidates: Vec<T>, k: usize) -> Vec<Neighbour<T>> {
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut measured: Vec<(usize, f64, T)> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let distance = haversine_km(reference, candidate.position());
            (index, distance, candidate)
        })
        .collect();

    // total_cmp gives a total order even for NaN; the index breaks ties.
    let by_distance =
        |a: &(usize, f64, T), b: &(usize, f64, T)| -> Ordering { a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)) };

    if k < measured.len() {
        measured.select_nth_unstable_by(k - 1, by_distance);
        measured.truncate(k);
    }
    measured.sort_unstable_by(by_distance);

    tracing::trace!(selected = measured.len(), k, "nearest neighbours selected");

    measured
        .into_iter()
        .map(|(_, distance_km, candidate)| Neighbour { candidate, distance_km })
        .collect()
}
