//! Pre-flight memory estimation for neighbourhood builds.
//!
//! Provides a conservative estimate of peak memory consumption so callers can
//! reject oversized datasets before any distance is computed. The estimate is
//! pessimistic: it applies a safety multiplier to cover heap fragmentation,
//! Rayon thread-local buffers and transient allocations that are hard to
//! predict statically.

use core::mem::size_of;

use crate::types::{Neighbour, NeighbourList};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Safety multiplier (3/2) applied to the raw estimate.
const SAFETY_MULTIPLIER_NUMERATOR: u64 = 3;
const SAFETY_MULTIPLIER_DENOMINATOR: u64 = 2;

/// Per-entry bookkeeping of the `BTreeMap` behind the frozen store: node
/// headers, edge pointers and slack in partially filled nodes.
const STORE_ENTRY_OVERHEAD_BYTES: u64 = 32;

/// Estimated per-entry overhead for the distance cache, accounting for the
/// `DashMap` slot, the `LruCache` bookkeeping and the stored key/value.
const CACHE_ENTRY_BYTES: u64 = 80;

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Returns a conservative estimate of peak memory (in bytes) needed to build
/// a neighbourhood of `items` identifiers of type `I` keeping `k` neighbours
/// each.
///
/// The estimate covers:
///
/// - the sorted identifier snapshot taken before selection;
/// - one `(id, list)` pair per item collected from the workers;
/// - `min(k, items - 1)` neighbour entries per list;
/// - the frozen store's per-entry bookkeeping.
///
/// A 1.5× safety multiplier is applied to the raw total.
///
/// # Examples
///
/// ```
/// use neighbourly_core::estimate_neighbourhood_bytes;
///
/// let bytes = estimate_neighbourhood_bytes::<u64>(1_000, 16);
/// assert!(bytes > 0, "estimate must be positive for non-empty datasets");
///
/// let zero = estimate_neighbourhood_bytes::<u64>(0, 16);
/// assert_eq!(zero, 0, "empty dataset requires no memory");
/// ```
#[must_use]
pub fn estimate_neighbourhood_bytes<I>(items: usize, k: usize) -> u64 {
    if items == 0 {
        return 0;
    }

    let n = items as u64;
    let kept = k.min(items - 1) as u64;
    let id_bytes = size_of::<I>() as u64;
    let entry_bytes = size_of::<Neighbour<I>>() as u64;
    let slot_bytes = id_bytes.saturating_add(size_of::<NeighbourList<I>>() as u64);

    // Identifier snapshot shared by every selection.
    let snapshot = n.saturating_mul(id_bytes);

    // Neighbour entries across every list.
    let lists = n.saturating_mul(kept).saturating_mul(entry_bytes);

    // Collected (id, list) pairs and the store holding them afterwards.
    let collected = n.saturating_mul(slot_bytes);
    let store = n.saturating_mul(slot_bytes.saturating_add(STORE_ENTRY_OVERHEAD_BYTES));

    let subtotal = snapshot
        .saturating_add(lists)
        .saturating_add(collected)
        .saturating_add(store);

    apply_safety_margin(subtotal)
}

/// Returns the estimated footprint of a full distance cache holding
/// `max_entries` values.
///
/// # Examples
/// ```
/// use neighbourly_core::estimate_cache_bytes;
///
/// assert!(estimate_cache_bytes(1_024) > estimate_cache_bytes(16));
/// ```
#[must_use]
pub fn estimate_cache_bytes(max_entries: usize) -> u64 {
    apply_safety_margin((max_entries as u64).saturating_mul(CACHE_ENTRY_BYTES))
}

fn apply_safety_margin(subtotal: u64) -> u64 {
    subtotal
        .saturating_mul(SAFETY_MULTIPLIER_NUMERATOR)
        .saturating_div(SAFETY_MULTIPLIER_DENOMINATOR)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Formats a byte count as a human-readable string using binary units.
///
/// Returns values like `"0 B"`, `"1.0 KiB"`, `"2.4 GiB"`, with one decimal
/// place from 1 KiB upwards.
///
/// # Examples
///
/// ```
/// use neighbourly_core::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1023), "1023 B");
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1_073_741_824), "1.0 GiB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
