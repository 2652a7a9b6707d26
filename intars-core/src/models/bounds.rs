//! The interval algebra: one definition of every comparison, shared by all
//! collection implementations.
//!
//! Endpoint inclusion drives every edge case in the query structures, so the
//! half-comparisons below are the single source of truth: `[0, 5)` and
//! `[5, 10]` do not overlap, `[5, 5]` overlaps `[5, 5]`, and among equal low
//! endpoints an included bound sorts before an excluded one while the high
//! side tie-breaks the other way around.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::errors::IntervalError;

/// Implemented by any type that exposes the four fields of a one-dimensional
/// interval over a totally ordered endpoint domain.
///
/// The whole algebra (canonical order, overlap, containment and the
/// half-comparisons the indexes binary-search with) is provided on top of the
/// four accessors. Collections store plain references to values implementing
/// this trait and never mutate or clone them.
pub trait IntervalBounds {
    /// The endpoint domain. Must be totally ordered.
    type Endpoint: Ord;

    /// The low endpoint.
    fn low(&self) -> &Self::Endpoint;

    /// The high endpoint.
    fn high(&self) -> &Self::Endpoint;

    /// Whether the low endpoint itself belongs to the interval.
    fn low_included(&self) -> bool;

    /// Whether the high endpoint itself belongs to the interval.
    fn high_included(&self) -> bool;

    /// True when `self` and `other` share at least one point.
    fn overlaps<J>(&self, other: &J) -> bool
    where
        J: IntervalBounds<Endpoint = Self::Endpoint> + ?Sized,
        Self: Sized,
    {
        cmp_low_high(self, other) != Ordering::Greater
            && cmp_low_high(other, self) != Ordering::Greater
    }

    /// True when the point `p` lies inside the interval.
    fn overlaps_point(&self, p: &Self::Endpoint) -> bool {
        low_reaches_down_to(self, p) && high_reaches_up_to(self, p)
    }

    /// True when `self` strictly contains `other`: `other` fits inside
    /// `self` with room (or a stronger bound) on both sides.
    fn strictly_contains<J>(&self, other: &J) -> bool
    where
        J: IntervalBounds<Endpoint = Self::Endpoint> + ?Sized,
        Self: Sized,
    {
        cmp_lows(self, other) == Ordering::Less && cmp_highs(other, self) == Ordering::Less
    }

    /// 17·31 hash over the four fields, low to high, bounds last.
    fn interval_hash(&self) -> u64
    where
        Self::Endpoint: Hash,
    {
        fn hash_endpoint<T: Hash>(value: &T) -> u64 {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }

        let mut acc: u64 = 17;
        acc = acc.wrapping_mul(31).wrapping_add(hash_endpoint(self.low()));
        acc = acc.wrapping_mul(31).wrapping_add(hash_endpoint(self.high()));
        acc = acc.wrapping_mul(31).wrapping_add(self.low_included() as u64);
        acc = acc.wrapping_mul(31).wrapping_add(self.high_included() as u64);
        acc
    }
}

impl<J: IntervalBounds + ?Sized> IntervalBounds for &J {
    type Endpoint = J::Endpoint;

    fn low(&self) -> &Self::Endpoint {
        (**self).low()
    }

    fn high(&self) -> &Self::Endpoint {
        (**self).high()
    }

    fn low_included(&self) -> bool {
        (**self).low_included()
    }

    fn high_included(&self) -> bool {
        (**self).high_included()
    }
}

/// A borrowed degenerate interval `[p, p]`.
///
/// Lets every structure funnel stabbing queries through its interval-query
/// machinery without cloning the endpoint.
#[derive(Debug)]
pub struct PointInterval<'q, T>(pub &'q T);

impl<'q, T> Clone for PointInterval<'q, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'q, T> Copy for PointInterval<'q, T> {}

impl<'q, T: Ord> IntervalBounds for PointInterval<'q, T> {
    type Endpoint = T;

    fn low(&self) -> &T {
        self.0
    }

    fn high(&self) -> &T {
        self.0
    }

    fn low_included(&self) -> bool {
        true
    }

    fn high_included(&self) -> bool {
        true
    }
}

/// Compares the low endpoints of `a` and `b`. On equal values an included
/// bound precedes an excluded one.
pub fn cmp_lows<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalBounds + ?Sized,
    B: IntervalBounds<Endpoint = A::Endpoint> + ?Sized,
{
    match a.low().cmp(b.low()) {
        Ordering::Equal => match (a.low_included(), b.low_included()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        unequal => unequal,
    }
}

/// Compares the high endpoints of `a` and `b`. On equal values an excluded
/// bound precedes an included one.
pub fn cmp_highs<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalBounds + ?Sized,
    B: IntervalBounds<Endpoint = A::Endpoint> + ?Sized,
{
    match a.high().cmp(b.high()) {
        Ordering::Equal => match (a.high_included(), b.high_included()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        unequal => unequal,
    }
}

/// Compares `a`'s low endpoint against `b`'s high endpoint.
///
/// Returns `Greater` exactly when `a` begins after `b` ends, counting a
/// touching pair as separated unless both touching bounds are included.
/// `a` overlaps `b` iff neither `cmp_low_high(a, b)` nor `cmp_low_high(b, a)`
/// is `Greater`.
pub fn cmp_low_high<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalBounds + ?Sized,
    B: IntervalBounds<Endpoint = A::Endpoint> + ?Sized,
{
    match a.low().cmp(b.high()) {
        Ordering::Equal => {
            if a.low_included() && b.high_included() {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        unequal => unequal,
    }
}

/// The canonical strict total order: earlier starters first, and among equal
/// low endpoints the shorter interval first.
pub fn canonical_cmp<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalBounds + ?Sized,
    B: IntervalBounds<Endpoint = A::Endpoint> + ?Sized,
{
    cmp_lows(a, b).then_with(|| cmp_highs(a, b))
}

/// True when the interval's low side admits the point: `low < p`, or
/// `low == p` with the low bound included.
pub fn low_reaches_down_to<I>(interval: &I, p: &I::Endpoint) -> bool
where
    I: IntervalBounds + ?Sized,
{
    match interval.low().cmp(p) {
        Ordering::Less => true,
        Ordering::Equal => interval.low_included(),
        Ordering::Greater => false,
    }
}

/// True when the interval's high side admits the point: `p < high`, or
/// `p == high` with the high bound included.
pub fn high_reaches_up_to<I>(interval: &I, p: &I::Endpoint) -> bool
where
    I: IntervalBounds + ?Sized,
{
    match p.cmp(interval.high()) {
        Ordering::Less => true,
        Ordering::Equal => interval.high_included(),
        Ordering::Greater => false,
    }
}

/// Checks the structural invariants every stored interval must satisfy:
/// `low <= high`, and a degenerate interval includes both endpoints.
pub fn validate<I>(interval: &I) -> Result<(), IntervalError>
where
    I: IntervalBounds + ?Sized,
{
    match interval.low().cmp(interval.high()) {
        Ordering::Greater => Err(IntervalError::InvertedBounds),
        Ordering::Equal if !(interval.low_included() && interval.high_included()) => {
            Err(IntervalError::DegeneratePoint)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Bare fields, no invariant checks: lets the tests exercise the algebra
    /// on combinations the `Interval` constructors reject.
    struct Raw(i32, i32, bool, bool);

    impl IntervalBounds for Raw {
        type Endpoint = i32;

        fn low(&self) -> &i32 {
            &self.0
        }

        fn high(&self) -> &i32 {
            &self.1
        }

        fn low_included(&self) -> bool {
            self.2
        }

        fn high_included(&self) -> bool {
            self.3
        }
    }

    #[test]
    fn closed_point_overlaps_itself_open_point_overlaps_nothing() {
        let closed = Raw(5, 5, true, true);
        let open = Raw(5, 5, false, false);

        assert!(closed.overlaps(&closed));
        assert!(!open.overlaps(&open));
        assert!(!open.overlaps(&closed));
        assert!(!open.overlaps(&Raw(0, 10, true, true)));
    }

    #[test]
    fn touching_bounds_overlap_only_when_both_included() {
        let half_open = Raw(0, 5, true, false);
        let closed = Raw(5, 10, true, true);

        assert!(!half_open.overlaps(&closed));
        assert!(Raw(0, 5, true, true).overlaps(&closed));
        assert!(!Raw(0, 5, true, true).overlaps(&Raw(5, 10, false, true)));
    }

    #[rstest]
    #[case(4, &[])]
    #[case(5, &[(true, true), (true, false)])]
    #[case(10, &[(true, true), (true, false), (false, true), (false, false)])]
    #[case(15, &[(true, true), (false, true)])]
    #[case(16, &[])]
    fn stabbing_boundary_table(#[case] point: i32, #[case] expected: &[(bool, bool)]) {
        let variants = [(true, true), (true, false), (false, true), (false, false)];

        let hit: Vec<(bool, bool)> = variants
            .iter()
            .copied()
            .filter(|&(lo, hi)| Raw(5, 15, lo, hi).overlaps_point(&point))
            .collect();

        assert_eq!(hit, expected.to_vec());
    }

    #[test]
    fn canonical_order_sorts_starters_then_lengths() {
        // [2,4] < [2,4) is false: excluded high precedes included high.
        assert_eq!(
            canonical_cmp(&Raw(2, 4, true, false), &Raw(2, 4, true, true)),
            Ordering::Less
        );
        // Included low precedes excluded low.
        assert_eq!(
            canonical_cmp(&Raw(2, 9, true, true), &Raw(2, 4, false, true)),
            Ordering::Less
        );
        assert_eq!(
            canonical_cmp(&Raw(1, 100, true, true), &Raw(2, 3, true, true)),
            Ordering::Less
        );
        assert_eq!(
            canonical_cmp(&Raw(2, 3, true, true), &Raw(2, 3, true, true)),
            Ordering::Equal
        );
    }

    #[test]
    fn overlap_is_symmetric_and_containment_implies_overlap() {
        let samples = [
            Raw(0, 10, true, true),
            Raw(0, 10, false, false),
            Raw(5, 5, true, true),
            Raw(10, 20, true, false),
            Raw(3, 7, false, true),
            Raw(7, 12, true, true),
        ];

        for a in &samples {
            for b in &samples {
                assert_eq!(a.overlaps(b), b.overlaps(a));
                if a.strictly_contains(b) {
                    assert!(a.overlaps(b));
                }
            }
        }
    }

    #[test]
    fn canonical_order_is_total_and_antisymmetric() {
        let samples = [
            Raw(0, 10, true, true),
            Raw(0, 10, true, false),
            Raw(0, 10, false, true),
            Raw(0, 3, true, true),
            Raw(4, 4, true, true),
        ];

        for a in &samples {
            for b in &samples {
                let ab = canonical_cmp(a, b);
                let ba = canonical_cmp(b, a);
                assert_eq!(ab, ba.reverse());
            }
        }
    }

    #[test]
    fn containment_ties_favour_inclusion_low_exclusion_high() {
        // [2,8] strictly contains (2,8): stronger bound on both sides.
        assert!(Raw(2, 8, true, true).strictly_contains(&Raw(2, 8, false, false)));
        assert!(!Raw(2, 8, false, false).strictly_contains(&Raw(2, 8, true, true)));
        assert!(!Raw(2, 8, true, true).strictly_contains(&Raw(2, 8, true, true)));
        assert!(Raw(1, 9, true, true).strictly_contains(&Raw(2, 8, true, true)));
    }

    #[test]
    fn validate_rejects_inverted_and_degenerate_half_open() {
        assert_eq!(validate(&Raw(7, 3, true, true)), Err(IntervalError::InvertedBounds));
        assert_eq!(validate(&Raw(5, 5, true, false)), Err(IntervalError::DegeneratePoint));
        assert_eq!(validate(&Raw(5, 5, false, false)), Err(IntervalError::DegeneratePoint));
        assert_eq!(validate(&Raw(5, 5, true, true)), Ok(()));
        assert_eq!(validate(&Raw(5, 6, false, false)), Ok(()));
    }

    #[test]
    fn point_interval_is_a_closed_point() {
        let p = PointInterval(&42);
        assert!(p.overlaps(&Raw(40, 45, true, true)));
        assert!(!p.overlaps(&Raw(42, 45, false, true)));
        assert!(p.overlaps_point(&42));
        assert!(!p.overlaps_point(&41));
    }
}
