//! # intars-core
//!
//! Value types and the interval algebra for the intars interval-collection
//! crates.
//!
//! The [`models::bounds`] module is the single source of truth for every
//! comparison the query structures perform: the canonical order, overlap,
//! strict containment and the low/high half-comparisons, all defined over the
//! [`IntervalBounds`](models::IntervalBounds) capability trait.
//! [`models::Interval`] is the concrete value type enforcing the structural
//! invariants (`low <= high`, degenerate intervals doubly closed).

pub mod errors;
pub mod models;
