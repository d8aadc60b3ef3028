//! Property-based tests for neighbourhood construction.
//!
//! Verifies built neighbourhoods against a brute-force sorting oracle,
//! validates structural invariants (list length, self exclusion, ordering)
//! and checks that results do not depend on enumeration order, execution
//! strategy or the distance cache.

mod determinism;
mod equivalence;
mod oracle;
mod strategies;
mod structural;
mod types;
