use intars_core::errors::IntervalError;
use intars_core::models::bounds::{self, IntervalBounds, canonical_cmp, cmp_highs};
use intars_core::models::Interval;

/// Validates every reference a static builder ingests; the first offending
/// interval aborts construction with the collection unchanged.
pub(crate) fn validate_all<'a, I>(intervals: &[&'a I]) -> Result<(), IntervalError>
where
    I: IntervalBounds,
{
    for interval in intervals {
        bounds::validate(*interval)?;
    }
    Ok(())
}

/// In-place canonical sort. The bootstrap sort every static builder relies
/// on; `sort_unstable` is the standard introsort primitive.
pub(crate) fn sort_canonical<'a, I>(intervals: &mut [&'a I])
where
    I: IntervalBounds,
{
    intervals.sort_unstable_by(|a, b| canonical_cmp(*a, *b));
}

/// The two members realising a collection's span: the canonically first one
/// (lowest low) and the one with the furthest-reaching high end.
#[derive(Debug)]
pub(crate) struct SpanRefs<'a, I> {
    pub low: &'a I,
    pub high: &'a I,
}

impl<'a, I> Clone for SpanRefs<'a, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, I> Copy for SpanRefs<'a, I> {}

impl<'a, I: IntervalBounds> SpanRefs<'a, I> {
    /// Span of a canonically sorted, non-empty slice: the first entry bounds
    /// the low side, a scan finds the high side.
    pub fn of_sorted(sorted: &[&'a I]) -> Option<Self> {
        let (first, rest) = sorted.split_first()?;
        let mut span = SpanRefs {
            low: *first,
            high: *first,
        };
        for interval in rest {
            span.raise(interval);
        }
        Some(span)
    }

    /// Span of an arbitrary stream of members.
    pub fn of_members(mut members: impl Iterator<Item = &'a I>) -> Option<Self> {
        let first = members.next()?;
        let mut span = SpanRefs {
            low: first,
            high: first,
        };
        for interval in members {
            if canonical_cmp(interval, span.low) == std::cmp::Ordering::Less {
                span.low = interval;
            }
            span.raise(interval);
        }
        Some(span)
    }

    fn raise(&mut self, interval: &'a I) {
        if cmp_highs(interval, self.high) == std::cmp::Ordering::Greater {
            self.high = interval;
        }
    }

    pub fn interval(&self) -> Interval<I::Endpoint>
    where
        I::Endpoint: Clone,
    {
        Interval::hull(self.low, self.high)
    }
}
