//! Lazy gap enumeration over a canonically ordered member stream.

use std::cmp::Ordering;

use intars_core::models::Interval;
use intars_core::models::bounds::{IntervalBounds, cmp_low_high};

/// A coverage edge: the domain value the merged members reach up to, and
/// whether that value itself is covered.
type Edge<T> = (T, bool);

fn edge_cmp<T: Ord>(a: &Edge<T>, b: &Edge<T>) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}

/// Iterator over the maximal uncovered sub-intervals of a member stream's
/// span, or of an explicit window.
///
/// The members must arrive in canonical order; the cursor merges them into a
/// single monotone coverage edge and emits an interval whenever the next
/// member leaves the edge behind. With a window, the region before the first
/// member and after the last one count as uncovered too.
pub struct Gaps<'s, 'a, I>
where
    I: IntervalBounds,
    I::Endpoint: Clone,
{
    members: Box<dyn Iterator<Item = &'a I> + 's>,
    window: Option<Interval<I::Endpoint>>,
    covered: Option<Edge<I::Endpoint>>,
    done: bool,
}

impl<'s, 'a, I> Gaps<'s, 'a, I>
where
    I: IntervalBounds + 'a,
    I::Endpoint: Clone,
{
    /// Gaps inside the stream's own span.
    pub fn over(members: Box<dyn Iterator<Item = &'a I> + 's>) -> Self {
        Gaps {
            members,
            window: None,
            covered: None,
            done: false,
        }
    }

    /// Gaps inside `window`.
    pub fn within(
        members: Box<dyn Iterator<Item = &'a I> + 's>,
        window: Interval<I::Endpoint>,
    ) -> Self {
        // Nothing below the window's low edge is covered; if the window
        // includes its low endpoint, a gap may start exactly there.
        let covered = Some((window.low().clone(), !window.low_included()));
        Gaps {
            members,
            window: Some(window),
            covered,
            done: false,
        }
    }

    /// The uncovered stretch between the current edge and `member`, if the
    /// two are disconnected.
    fn gap_before(&self, member: &'a I) -> Option<Interval<I::Endpoint>> {
        let (value, value_covered) = self.covered.as_ref()?;
        Interval::new(
            value.clone(),
            member.low().clone(),
            !value_covered,
            !member.low_included(),
        )
        .ok()
    }

    fn cover(&mut self, member: &'a I) {
        let mut edge = (member.high().clone(), member.high_included());
        if let Some(window) = &self.window {
            let cap = (window.high().clone(), window.high_included());
            if edge_cmp(&edge, &cap) == Ordering::Greater {
                edge = cap;
            }
        }
        match &self.covered {
            Some(current) if edge_cmp(current, &edge) != Ordering::Less => {}
            _ => self.covered = Some(edge),
        }
    }

    /// Emits the tail gap up to the window's high edge, if any, and stops.
    fn finish(&mut self) -> Option<Interval<I::Endpoint>> {
        self.done = true;
        let window = self.window.as_ref()?;
        let (value, value_covered) = self.covered.as_ref()?;
        Interval::new(
            value.clone(),
            window.high().clone(),
            !value_covered,
            window.high_included(),
        )
        .ok()
    }
}

impl<'s, 'a, I> Iterator for Gaps<'s, 'a, I>
where
    I: IntervalBounds + 'a,
    I::Endpoint: Clone,
{
    type Item = Interval<I::Endpoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let Some(member) = self.members.next() else {
                return self.finish();
            };
            if let Some(window) = &self.window {
                // Entirely before the window: irrelevant.
                if cmp_low_high(window, member) == Ordering::Greater {
                    continue;
                }
                // Starts past the window: only the tail gap remains.
                if cmp_low_high(member, window) == Ordering::Greater {
                    return self.finish();
                }
            }
            let gap = self.gap_before(member);
            self.cover(member);
            if gap.is_some() {
                return gap;
            }
        }
    }
}
