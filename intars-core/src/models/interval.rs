use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::IntervalError;
use crate::models::bounds::{self, IntervalBounds, canonical_cmp};

/// An interval over a totally ordered endpoint domain, with independent
/// open/closed flags on each side.
///
/// Invariants, enforced by the fallible constructors: `low <= high`, and a
/// degenerate interval (`low == high`) includes both endpoints. The `serde`
/// derives bypass these checks; deserialized data is trusted the same way the
/// caller-supplied `IntervalBounds` implementations are — the collections
/// re-validate everything they ingest.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval<T> {
    low: T,
    high: T,
    low_included: bool,
    high_included: bool,
}

impl<T: Ord> Interval<T> {
    /// Creates an interval with explicit inclusion flags.
    pub fn new(
        low: T,
        high: T,
        low_included: bool,
        high_included: bool,
    ) -> Result<Self, IntervalError> {
        let interval = Interval {
            low,
            high,
            low_included,
            high_included,
        };
        bounds::validate(&interval)?;
        Ok(interval)
    }

    /// `[low, high]`
    pub fn closed(low: T, high: T) -> Result<Self, IntervalError> {
        Self::new(low, high, true, true)
    }

    /// `(low, high)`
    pub fn open(low: T, high: T) -> Result<Self, IntervalError> {
        Self::new(low, high, false, false)
    }

    /// `[low, high)`
    pub fn closed_open(low: T, high: T) -> Result<Self, IntervalError> {
        Self::new(low, high, true, false)
    }

    /// `(low, high]`
    pub fn open_closed(low: T, high: T) -> Result<Self, IntervalError> {
        Self::new(low, high, false, true)
    }

    /// The degenerate interval `[value, value]`.
    pub fn point(value: T) -> Self
    where
        T: Clone,
    {
        Interval {
            low: value.clone(),
            high: value,
            low_included: true,
            high_included: true,
        }
    }

    /// The smallest interval whose low side matches `low_side` and whose high
    /// side matches `high_side`.
    ///
    /// This is the join the `span` accumulators build with; the arguments are
    /// expected to come from a non-empty set ordered so that the hull is
    /// non-inverted.
    pub fn hull<A, B>(low_side: &A, high_side: &B) -> Self
    where
        T: Clone,
        A: IntervalBounds<Endpoint = T> + ?Sized,
        B: IntervalBounds<Endpoint = T> + ?Sized,
    {
        let interval = Interval {
            low: low_side.low().clone(),
            high: high_side.high().clone(),
            low_included: low_side.low_included(),
            high_included: high_side.high_included(),
        };
        debug_assert!(bounds::validate(&interval).is_ok());
        interval
    }
}

impl<T: Ord> IntervalBounds for Interval<T> {
    type Endpoint = T;

    fn low(&self) -> &T {
        &self.low
    }

    fn high(&self) -> &T {
        &self.high
    }

    fn low_included(&self) -> bool {
        self.low_included
    }

    fn high_included(&self) -> bool {
        self.high_included
    }
}

impl<T: Ord> PartialEq for Interval<T> {
    fn eq(&self, other: &Self) -> bool {
        canonical_cmp(self, other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for Interval<T> {}

impl<T: Ord> PartialOrd for Interval<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Interval<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl<T: Ord + Hash> Hash for Interval<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.interval_hash());
    }
}

impl<T: Ord + fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.low_included { '[' } else { '(' },
            self.low,
            self.high,
            if self.high_included { ']' } else { ')' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::hash_map::DefaultHasher;

    use pretty_assertions::assert_eq;

    #[test]
    fn constructors_enforce_the_invariants() {
        assert!(Interval::closed(3, 9).is_ok());
        assert!(Interval::closed(3, 3).is_ok());
        assert_eq!(Interval::closed(9, 3), Err(IntervalError::InvertedBounds));
        assert_eq!(
            Interval::open(4, 4),
            Err(IntervalError::DegeneratePoint)
        );
        assert_eq!(
            Interval::closed_open(4, 4),
            Err(IntervalError::DegeneratePoint)
        );
        assert_eq!(
            Interval::open_closed(4, 4),
            Err(IntervalError::DegeneratePoint)
        );
        assert!(Interval::open(4, 5).is_ok());
    }

    #[test]
    fn point_is_doubly_closed() {
        let p = Interval::point(7);
        assert!(p.low_included() && p.high_included());
        assert!(p.overlaps_point(&7));
        assert!(!p.overlaps_point(&8));
    }

    #[test]
    fn equality_is_field_equality() {
        let a = Interval::closed(2, 7).unwrap();
        let b = Interval::closed(2, 7).unwrap();
        let c = Interval::closed_open(2, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ordering_is_canonical() {
        let mut intervals = vec![
            Interval::closed(5, 9).unwrap(),
            Interval::closed(1, 20).unwrap(),
            Interval::closed(1, 3).unwrap(),
            Interval::open(1, 3).unwrap(),
        ];
        intervals.sort();
        assert_eq!(
            intervals,
            vec![
                Interval::closed(1, 3).unwrap(),
                Interval::closed(1, 20).unwrap(),
                Interval::open(1, 3).unwrap(),
                Interval::closed(5, 9).unwrap(),
            ]
        );
    }

    #[test]
    fn equal_intervals_hash_alike() {
        fn hash_of(interval: &Interval<i32>) -> u64 {
            let mut hasher = DefaultHasher::new();
            interval.hash(&mut hasher);
            hasher.finish()
        }

        let a = Interval::open_closed(2, 7).unwrap();
        let b = Interval::open_closed(2, 7).unwrap();
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(hash_of(&a), hash_of(&Interval::closed(2, 7).unwrap()));
    }

    #[test]
    fn display_uses_bracket_notation() {
        assert_eq!(Interval::closed(2, 7).unwrap().to_string(), "[2, 7]");
        assert_eq!(Interval::open(2, 7).unwrap().to_string(), "(2, 7)");
        assert_eq!(Interval::closed_open(2, 7).unwrap().to_string(), "[2, 7)");
        assert_eq!(Interval::open_closed(2, 7).unwrap().to_string(), "(2, 7]");
    }

    #[test]
    fn hull_joins_the_outer_bounds() {
        let a = Interval::open_closed(1, 4).unwrap();
        let b = Interval::closed_open(2, 9).unwrap();
        assert_eq!(Interval::hull(&a, &b), Interval::new(1, 9, false, false).unwrap());
    }
}
