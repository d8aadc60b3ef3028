//! Brute-force reference for k-nearest-neighbour selection.
//!
//! Computes every distance from each item, sorts the full candidate list by
//! `(distance, id)` and keeps the first `k`. Deliberately shares no code
//! with the heap-based selector it checks.

use std::collections::BTreeMap;

/// Expected neighbour lists keyed by identifier.
pub(super) type OracleLists = BTreeMap<u32, Vec<(u32, f32)>>;

/// Computes the expected neighbour lists for `entries`.
pub(super) fn brute_force_knn(entries: &[(u32, f32)], k: usize) -> OracleLists {
    entries
        .iter()
        .map(|&(id, value)| {
            let mut candidates: Vec<(u32, f32)> = entries
                .iter()
                .filter(|(other, _)| *other != id)
                .map(|&(other, other_value)| (other, (value - other_value).abs()))
                .collect();
            candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            candidates.truncate(k);
            (id, candidates)
        })
        .collect()
}
