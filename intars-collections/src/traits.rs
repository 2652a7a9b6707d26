use intars_core::errors::{CollectionError, IntervalError};
use intars_core::models::{Interval, IntervalBounds};

use crate::gaps::Gaps;

/// A queryable collection of interval references.
///
/// Collections are generic over the stored interval type `I` and hold plain
/// `&'a I` references: the caller owns every interval, the collection never
/// clones or mutates one, and the borrow checker guarantees the intervals
/// outlive every cursor the collection hands out.
///
/// The capability flags (`is_read_only`, `allows_reference_duplicates`, ...)
/// describe an implementation at runtime so that a single test suite can be
/// driven over every structure in the crate.
///
/// # Implementations
///
/// * [`NestedContainmentList`](crate::NestedContainmentList) — static,
///   flat-array containment hierarchy.
/// * [`LayeredContainmentList`](crate::LayeredContainmentList) — static,
///   parallel layer arrays with inter-layer pointers.
/// * [`StaticIntervalTree`](crate::StaticIntervalTree) — static median-split
///   tree.
/// * [`IntervalBinarySearchTree`](crate::IntervalBinarySearchTree) — dynamic,
///   red-black, endpoint-keyed.
/// * [`DynamicIntervalTree`](crate::DynamicIntervalTree) — dynamic, AVL,
///   canonically keyed.
pub trait IntervalCollection<'a, I>
where
    I: IntervalBounds + 'a,
{
    /// Number of interval references currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False for the dynamic structures.
    fn is_read_only(&self) -> bool {
        true
    }

    /// Whether overlapping members are admitted. Every structure in this
    /// crate admits them.
    fn allows_overlaps(&self) -> bool {
        true
    }

    /// Whether members may strictly contain one another. Every structure in
    /// this crate admits that.
    fn allows_containments(&self) -> bool {
        true
    }

    /// Whether the same reference may be held more than once.
    fn allows_reference_duplicates(&self) -> bool;

    /// The smallest interval containing every member.
    fn span(&self) -> Result<Interval<I::Endpoint>, CollectionError>
    where
        I::Endpoint: Clone;

    /// All members, in an implementation-defined order.
    fn iter<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's>;

    /// All members, in canonical order.
    fn iter_sorted<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's>;

    /// All members overlapping `query`, lazily, in an implementation-defined
    /// order.
    fn find<'s>(
        &'s self,
        query: &'s Interval<I::Endpoint>,
    ) -> Box<dyn Iterator<Item = &'a I> + 's>;

    /// All members stabbed by `point`, lazily.
    fn find_point<'s>(&'s self, point: &'s I::Endpoint) -> Box<dyn Iterator<Item = &'a I> + 's>;

    /// Some member overlapping `query`, if any. Implementations with a
    /// cheaper path than starting a full query short-circuit here.
    fn find_any<'s>(&'s self, query: &'s Interval<I::Endpoint>) -> Option<&'a I> {
        self.find(query).next()
    }

    /// Some member stabbed by `point`, if any.
    fn find_any_at<'s>(&'s self, point: &'s I::Endpoint) -> Option<&'a I> {
        self.find_point(point).next()
    }

    /// Number of members overlapping `query`.
    fn count_overlaps<'s>(&'s self, query: &'s Interval<I::Endpoint>) -> usize {
        self.find(query).count()
    }

    /// Number of members stabbed by `point`.
    fn count_overlaps_at<'s>(&'s self, point: &'s I::Endpoint) -> usize {
        self.find_point(point).count()
    }

    /// The maximal sub-intervals of the span not covered by any member, in
    /// canonical order.
    fn gaps<'s>(&'s self) -> Box<dyn Iterator<Item = Interval<I::Endpoint>> + 's>
    where
        I::Endpoint: Clone,
        'a: 's,
    {
        Box::new(Gaps::over(self.iter_sorted()))
    }

    /// The maximal sub-intervals of `window` not covered by any member, in
    /// canonical order.
    fn gaps_within<'s>(
        &'s self,
        window: &Interval<I::Endpoint>,
    ) -> Box<dyn Iterator<Item = Interval<I::Endpoint>> + 's>
    where
        I::Endpoint: Clone,
        'a: 's,
    {
        Box::new(Gaps::within(self.iter_sorted(), window.clone()))
    }
}

/// A collection that also supports mutation after construction.
///
/// `add` and `remove` are atomic with respect to the observable state: a
/// rejected interval leaves the collection untouched.
pub trait MutableIntervalCollection<'a, I>: IntervalCollection<'a, I>
where
    I: IntervalBounds + 'a,
{
    /// Adds a reference. Returns `Ok(false)` when this exact reference is
    /// already a member and the implementation does not admit reference
    /// duplicates.
    fn add(&mut self, interval: &'a I) -> Result<bool, IntervalError>;

    /// Drops a reference. Returns `true` iff this exact reference was a
    /// member.
    fn remove(&mut self, interval: &'a I) -> bool;

    /// Drops every member.
    fn clear(&mut self);

    /// The largest number of members stabbed by any single point.
    fn maximum_overlap(&self) -> usize;
}
