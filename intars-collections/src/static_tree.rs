use std::cmp::Ordering;

use intars_core::errors::{CollectionError, IntervalError};
use intars_core::models::bounds::{
    IntervalBounds, cmp_highs, cmp_low_high, cmp_lows,
};
use intars_core::models::{Interval, PointInterval};

use crate::traits::IntervalCollection;
use crate::util::{SpanRefs, sort_canonical, validate_all};

/// A classic median-split interval tree.
///
/// Each node owns the intervals whose extent straddles its pivot endpoint,
/// kept twice: sorted ascending by low end and descending by high end, so a
/// query scans just the prefix that still reaches it. Children hold the
/// intervals entirely below and entirely above the pivot. Pivots are medians
/// of the subset's endpoint values, which bounds the depth logarithmically.
///
/// Node membership is decided by endpoint values alone; the inclusion flags
/// only matter at query boundaries, where the scans and the pivot-stab
/// emission test them per entry.
///
/// Static: the membership is frozen at construction.
///
/// # Examples
///
/// ```
/// use intars_collections::{IntervalCollection, StaticIntervalTree};
/// use intars_core::models::Interval;
///
/// let shifts = vec![
///     Interval::closed(8, 16).unwrap(),
///     Interval::closed(12, 20).unwrap(),
///     Interval::closed(22, 23).unwrap(),
/// ];
/// let tree = StaticIntervalTree::new(shifts.iter()).unwrap();
///
/// assert_eq!(tree.find_point(&14).count(), 2);
/// assert_eq!(tree.find_point(&21).count(), 0);
/// ```
pub struct StaticIntervalTree<'a, I>
where
    I: IntervalBounds,
{
    root: Option<Box<Node<'a, I>>>,
    sorted: Vec<&'a I>,
    span: Option<SpanRefs<'a, I>>,
}

struct Node<'a, I>
where
    I: IntervalBounds,
{
    pivot: &'a I::Endpoint,
    by_low: Vec<&'a I>,
    by_high: Vec<&'a I>,
    left: Option<Box<Node<'a, I>>>,
    right: Option<Box<Node<'a, I>>>,
}

impl<'a, I> StaticIntervalTree<'a, I>
where
    I: IntervalBounds,
{
    /// Builds the tree from caller-owned intervals. Sorts a local copy of the
    /// references canonically; every input is validated first.
    pub fn new(intervals: impl IntoIterator<Item = &'a I>) -> Result<Self, IntervalError> {
        let mut refs: Vec<&'a I> = intervals.into_iter().collect();
        validate_all(&refs)?;
        sort_canonical(&mut refs);
        let span = SpanRefs::of_sorted(&refs);
        let root = Self::build(refs.clone());
        Ok(StaticIntervalTree {
            root,
            sorted: refs,
            span,
        })
    }

    fn build(intervals: Vec<&'a I>) -> Option<Box<Node<'a, I>>> {
        if intervals.is_empty() {
            return None;
        }

        let mut endpoints: Vec<&'a I::Endpoint> = intervals
            .iter()
            .copied()
            .flat_map(|iv| [iv.low(), iv.high()])
            .collect();
        endpoints.sort_unstable();
        let pivot = endpoints[endpoints.len() / 2];

        // Value-level three-way split. The pivot is some member's endpoint,
        // so the straddling set is never empty and both sides shrink.
        let mut below = Vec::new();
        let mut here = Vec::new();
        let mut above = Vec::new();
        for interval in intervals {
            if *interval.high() < *pivot {
                below.push(interval);
            } else if *interval.low() > *pivot {
                above.push(interval);
            } else {
                here.push(interval);
            }
        }
        debug_assert!(!here.is_empty());

        let mut by_low = here.clone();
        by_low.sort_unstable_by(|a, b| cmp_lows(*a, *b));
        let mut by_high = here;
        by_high.sort_unstable_by(|a, b| cmp_highs(*b, *a));

        Some(Box::new(Node {
            pivot,
            by_low,
            by_high,
            left: Self::build(below),
            right: Self::build(above),
        }))
    }
}

impl<'a, I> IntervalCollection<'a, I> for StaticIntervalTree<'a, I>
where
    I: IntervalBounds + 'a,
{
    fn len(&self) -> usize {
        self.sorted.len()
    }

    fn allows_reference_duplicates(&self) -> bool {
        true
    }

    fn span(&self) -> Result<Interval<I::Endpoint>, CollectionError>
    where
        I::Endpoint: Clone,
    {
        self.span
            .as_ref()
            .map(SpanRefs::interval)
            .ok_or(CollectionError::Empty)
    }

    fn iter<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(self.sorted.iter().copied())
    }

    fn iter_sorted<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(self.sorted.iter().copied())
    }

    fn find<'s>(
        &'s self,
        query: &'s Interval<I::Endpoint>,
    ) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(FindIter::new(self.root.as_deref(), query))
    }

    fn find_point<'s>(&'s self, point: &'s I::Endpoint) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(FindIter::new(self.root.as_deref(), PointInterval(point)))
    }
}

enum Scan {
    /// Ascending low ends while they still reach into the query.
    Lows(usize),
    /// Descending high ends while they still reach back into the query.
    Highs(usize),
    /// The query spans the pivot: the whole node list, filtered only at the
    /// inclusion boundaries.
    All(usize),
}

struct FindIter<'s, 'a, I, Q>
where
    I: IntervalBounds,
{
    query: Q,
    pending: Vec<&'s Node<'a, I>>,
    current: Option<(&'s Node<'a, I>, Scan)>,
}

impl<'s, 'a, I, Q> FindIter<'s, 'a, I, Q>
where
    I: IntervalBounds,
    Q: IntervalBounds<Endpoint = I::Endpoint>,
{
    fn new(root: Option<&'s Node<'a, I>>, query: Q) -> Self {
        FindIter {
            query,
            pending: root.into_iter().collect(),
            current: None,
        }
    }

    fn open(&mut self, node: &'s Node<'a, I>) {
        let scan = if *node.pivot < *self.query.low() {
            if let Some(right) = node.right.as_deref() {
                self.pending.push(right);
            }
            Scan::Highs(0)
        } else if *node.pivot > *self.query.high() {
            if let Some(left) = node.left.as_deref() {
                self.pending.push(left);
            }
            Scan::Lows(0)
        } else {
            if let Some(left) = node.left.as_deref() {
                self.pending.push(left);
            }
            if let Some(right) = node.right.as_deref() {
                self.pending.push(right);
            }
            Scan::All(0)
        };
        self.current = Some((node, scan));
    }
}

impl<'s, 'a, I, Q> Iterator for FindIter<'s, 'a, I, Q>
where
    I: IntervalBounds + 'a,
    Q: IntervalBounds<Endpoint = I::Endpoint>,
{
    type Item = &'a I;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let exhausted = if let Some((node, scan)) = self.current.as_mut() {
                let node = *node;
                match scan {
                    Scan::Lows(idx) => {
                        if let Some(&interval) = node.by_low.get(*idx) {
                            if cmp_low_high(interval, &self.query) != Ordering::Greater {
                                *idx += 1;
                                return Some(interval);
                            }
                        }
                        true
                    }
                    Scan::Highs(idx) => {
                        if let Some(&interval) = node.by_high.get(*idx) {
                            if cmp_low_high(&self.query, interval) != Ordering::Greater {
                                *idx += 1;
                                return Some(interval);
                            }
                        }
                        true
                    }
                    Scan::All(idx) => {
                        let mut found = None;
                        while let Some(&interval) = node.by_low.get(*idx) {
                            *idx += 1;
                            if interval.overlaps(&self.query) {
                                found = Some(interval);
                                break;
                            }
                        }
                        match found {
                            Some(interval) => return Some(interval),
                            None => true,
                        }
                    }
                }
            } else {
                false
            };

            if exhausted {
                self.current = None;
                continue;
            }
            let node = self.pending.pop()?;
            self.open(node);
        }
    }
}
