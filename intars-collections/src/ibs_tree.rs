use std::cmp::Ordering;
use std::collections::hash_map;
use std::mem;

use fxhash::{FxHashMap, FxHashSet};

use intars_core::errors::{CollectionError, IntervalError};
use intars_core::models::bounds::{self, IntervalBounds, canonical_cmp};
use intars_core::models::Interval;

use crate::traits::{IntervalCollection, MutableIntervalCollection};
use crate::util::SpanRefs;

const NIL: usize = usize::MAX;

/// An interval binary search tree: a red-black tree over endpoint values in
/// which every node carries three identity sets of interval references,
/// `less`, `equal` and `greater`.
///
/// An interval is registered along the canonical search-path decomposition of
/// its extent: `equal` at the keys it contains, `greater` at a node whose
/// right-hand region it covers, `less` symmetrically. A stabbing query then
/// walks one root-to-key path and yields `less` on every left turn, `greater`
/// on every right turn and `equal` on arrival, which is O(log n + k) with no
/// duplicates. Range queries split at the highest key inside the query and
/// drain whole subtrees on the inner sides, deduplicating through a
/// reference-identity set.
///
/// Rotations rewire the three sets of the two rotated nodes (unions toward
/// the new parent, the `between` subtree's cover handed across, registrations
/// made redundant pruned) so the path invariant survives rebalancing.
///
/// Every node also carries the ±1 endpoint deltas of the intervals starting
/// and ending at its key, augmented with in-order prefix sums and their
/// maximum: the root's `max` is the maximum number of members stabbed by any
/// single point.
///
/// Endpoint keys whose sets and deltas have drained stay as structural keys;
/// the arena resets when the last member leaves.
///
/// # Examples
///
/// ```
/// use intars_collections::{
///     IntervalBinarySearchTree, IntervalCollection, MutableIntervalCollection,
/// };
/// use intars_core::models::Interval;
///
/// let morning = Interval::closed_open(9, 12).unwrap();
/// let lunch = Interval::closed(11, 13).unwrap();
///
/// let mut tree = IntervalBinarySearchTree::new();
/// tree.add(&morning).unwrap();
/// tree.add(&lunch).unwrap();
///
/// assert_eq!(tree.find_point(&11).count(), 2);
/// assert_eq!(tree.maximum_overlap(), 2);
///
/// assert!(tree.remove(&lunch));
/// assert_eq!(tree.maximum_overlap(), 1);
/// ```
pub struct IntervalBinarySearchTree<'a, I>
where
    I: IntervalBounds,
{
    nodes: Vec<Node<'a, I>>,
    root: usize,
    members: Vec<&'a I>,
    member_slots: FxHashMap<usize, usize>,
}

/// Identity-keyed set of interval references.
struct RefSet<'a, I>(FxHashMap<usize, &'a I>);

fn address<I>(interval: &I) -> usize {
    interval as *const I as usize
}

impl<'a, I> Default for RefSet<'a, I> {
    fn default() -> Self {
        RefSet::new()
    }
}

impl<'a, I> RefSet<'a, I> {
    fn new() -> Self {
        RefSet(FxHashMap::default())
    }

    fn insert(&mut self, interval: &'a I) -> bool {
        self.0.insert(address(interval), interval).is_none()
    }

    fn remove(&mut self, interval: &I) -> bool {
        self.0.remove(&address(interval)).is_some()
    }

    fn contains(&self, interval: &I) -> bool {
        self.0.contains_key(&address(interval))
    }

    fn iter(&self) -> std::iter::Copied<hash_map::Values<'_, usize, &'a I>> {
        self.0.values().copied()
    }
}

struct Node<'a, I>
where
    I: IntervalBounds,
{
    key: &'a I::Endpoint,
    red: bool,
    parent: usize,
    left: usize,
    right: usize,
    less: RefSet<'a, I>,
    equal: RefSet<'a, I>,
    greater: RefSet<'a, I>,
    delta: i32,
    delta_after: i32,
    sum: i64,
    max: i64,
}

impl<'a, I> Node<'a, I>
where
    I: IntervalBounds,
{
    fn new(key: &'a I::Endpoint, parent: usize) -> Self {
        Node {
            key,
            red: true,
            parent,
            left: NIL,
            right: NIL,
            less: RefSet::new(),
            equal: RefSet::new(),
            greater: RefSet::new(),
            delta: 0,
            delta_after: 0,
            sum: 0,
            max: 0,
        }
    }
}

impl<'a, I> IntervalBinarySearchTree<'a, I>
where
    I: IntervalBounds,
{
    pub fn new() -> Self {
        IntervalBinarySearchTree {
            nodes: Vec::new(),
            root: NIL,
            members: Vec::new(),
            member_slots: FxHashMap::default(),
        }
    }

    /// Convenience bulk constructor: adds every reference in turn.
    pub fn from_refs(
        intervals: impl IntoIterator<Item = &'a I>,
    ) -> Result<Self, IntervalError> {
        let mut tree = Self::new();
        for interval in intervals {
            tree.add_ref(interval)?;
        }
        Ok(tree)
    }

    fn is_red(&self, id: usize) -> bool {
        id != NIL && self.nodes[id].red
    }

    fn parent_of(&self, id: usize) -> usize {
        if id == NIL { NIL } else { self.nodes[id].parent }
    }

    fn sum_max(&self, id: usize) -> (i64, i64) {
        if id == NIL {
            (0, 0)
        } else {
            (self.nodes[id].sum, self.nodes[id].max)
        }
    }

    /// Recomputes `sum` and `max` from the children and the local deltas.
    fn update_aug(&mut self, id: usize) {
        let (left, right, delta, delta_after) = {
            let node = &self.nodes[id];
            (node.left, node.right, node.delta, node.delta_after)
        };
        let (left_sum, left_max) = self.sum_max(left);
        let (right_sum, right_max) = self.sum_max(right);
        let at_key = left_sum + i64::from(delta);
        let past_key = at_key + i64::from(delta_after);
        let node = &mut self.nodes[id];
        node.sum = past_key + right_sum;
        node.max = left_max
            .max(at_key)
            .max(past_key)
            .max(past_key + right_max);
    }

    fn update_path(&mut self, mut id: usize) {
        while id != NIL {
            self.update_aug(id);
            id = self.nodes[id].parent;
        }
    }

    /// Set transfers for a left rotation around `x` with pivot `y = x.right`.
    ///
    /// `x.greater` covered `y`'s whole old subtree: it keeps covering the
    /// `between` subtree from `x` and additionally lands in `y.greater` and
    /// `y.equal` now that `y` sits above. The part of `y.less` that `x.less`
    /// does not share covered exactly the `between` subtree, so it moves to
    /// `x.greater`; what remains of `y.less` now covers `x`'s whole subtree
    /// from above, making its copies in `x.equal` and `x.less` redundant.
    fn transfer_left(&mut self, x: usize, y: usize) {
        let x_greater = mem::take(&mut self.nodes[x].greater);
        for interval in x_greater.iter() {
            self.nodes[y].greater.insert(interval);
            self.nodes[y].equal.insert(interval);
        }
        self.nodes[x].greater = x_greater;

        let mut y_less = mem::take(&mut self.nodes[y].less);
        let between: Vec<&'a I> = y_less
            .iter()
            .filter(|iv| !self.nodes[x].less.contains(*iv))
            .collect();
        for interval in between {
            y_less.remove(interval);
            self.nodes[x].greater.insert(interval);
        }
        for interval in y_less.iter() {
            self.nodes[x].equal.remove(interval);
            self.nodes[x].less.remove(interval);
        }
        self.nodes[y].less = y_less;
    }

    /// Mirror of [`transfer_left`](Self::transfer_left).
    fn transfer_right(&mut self, x: usize, y: usize) {
        let x_less = mem::take(&mut self.nodes[x].less);
        for interval in x_less.iter() {
            self.nodes[y].less.insert(interval);
            self.nodes[y].equal.insert(interval);
        }
        self.nodes[x].less = x_less;

        let mut y_greater = mem::take(&mut self.nodes[y].greater);
        let between: Vec<&'a I> = y_greater
            .iter()
            .filter(|iv| !self.nodes[x].greater.contains(*iv))
            .collect();
        for interval in between {
            y_greater.remove(interval);
            self.nodes[x].less.insert(interval);
        }
        for interval in y_greater.iter() {
            self.nodes[x].equal.remove(interval);
            self.nodes[x].greater.remove(interval);
        }
        self.nodes[y].greater = y_greater;
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.nodes[x].right;
        self.transfer_left(x, y);

        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }
        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if self.nodes[x_parent].left == x {
            self.nodes[x_parent].left = y;
        } else {
            self.nodes[x_parent].right = y;
        }
        self.nodes[y].left = x;
        self.nodes[x].parent = y;

        self.update_aug(x);
        self.update_aug(y);
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.nodes[x].left;
        self.transfer_right(x, y);

        let y_right = self.nodes[y].right;
        self.nodes[x].left = y_right;
        if y_right != NIL {
            self.nodes[y_right].parent = x;
        }
        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if self.nodes[x_parent].left == x {
            self.nodes[x_parent].left = y;
        } else {
            self.nodes[x_parent].right = y;
        }
        self.nodes[y].right = x;
        self.nodes[x].parent = y;

        self.update_aug(x);
        self.update_aug(y);
    }

    /// Finds or inserts the node keyed `key`, rebalancing after an insert.
    fn ensure_key(&mut self, key: &'a I::Endpoint) -> usize {
        let mut parent = NIL;
        let mut went_left = false;
        let mut cursor = self.root;
        while cursor != NIL {
            match key.cmp(self.nodes[cursor].key) {
                Ordering::Equal => return cursor,
                Ordering::Less => {
                    parent = cursor;
                    went_left = true;
                    cursor = self.nodes[cursor].left;
                }
                Ordering::Greater => {
                    parent = cursor;
                    went_left = false;
                    cursor = self.nodes[cursor].right;
                }
            }
        }

        let id = self.nodes.len();
        self.nodes.push(Node::new(key, parent));
        if parent == NIL {
            self.root = id;
        } else if went_left {
            self.nodes[parent].left = id;
        } else {
            self.nodes[parent].right = id;
        }
        self.insert_fixup(id);
        id
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.is_red(self.parent_of(z)) {
            let parent = self.parent_of(z);
            let grand = self.parent_of(parent);
            if parent == self.nodes[grand].left {
                let uncle = self.nodes[grand].right;
                if self.is_red(uncle) {
                    self.nodes[parent].red = false;
                    self.nodes[uncle].red = false;
                    self.nodes[grand].red = true;
                    z = grand;
                } else {
                    if z == self.nodes[parent].right {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.parent_of(z);
                    let grand = self.parent_of(parent);
                    self.nodes[parent].red = false;
                    self.nodes[grand].red = true;
                    self.rotate_right(grand);
                }
            } else {
                let uncle = self.nodes[grand].left;
                if self.is_red(uncle) {
                    self.nodes[parent].red = false;
                    self.nodes[uncle].red = false;
                    self.nodes[grand].red = true;
                    z = grand;
                } else {
                    if z == self.nodes[parent].left {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent_of(z);
                    let grand = self.parent_of(parent);
                    self.nodes[parent].red = false;
                    self.nodes[grand].red = true;
                    self.rotate_left(grand);
                }
            }
        }
        let root = self.root;
        self.nodes[root].red = false;
    }

    fn find_key(&self, key: &I::Endpoint) -> usize {
        let mut cursor = self.root;
        while cursor != NIL {
            match key.cmp(self.nodes[cursor].key) {
                Ordering::Equal => return cursor,
                Ordering::Less => cursor = self.nodes[cursor].left,
                Ordering::Greater => cursor = self.nodes[cursor].right,
            }
        }
        NIL
    }

    /// Walks the canonical decomposition of `interval`, inserting it into
    /// (or removing it from) the sets along the split, low and high paths.
    /// Removal retraces the same paths, so it reaches every set a rotation
    /// may have spread the interval to.
    fn register(&mut self, interval: &'a I, insert: bool) {
        fn touch<'a, I>(set: &mut RefSet<'a, I>, interval: &'a I, insert: bool) {
            if insert {
                set.insert(interval);
            } else {
                set.remove(interval);
            }
        }

        let low = interval.low();
        let high = interval.high();

        let mut cursor = self.root;
        loop {
            let key = self.nodes[cursor].key;
            if *key < *low {
                cursor = self.nodes[cursor].right;
            } else if *key > *high {
                cursor = self.nodes[cursor].left;
            } else {
                break;
            }
        }
        let split = cursor;
        let split_key = self.nodes[split].key;

        if *low == *high {
            // Point interval: one key, included on both sides.
            touch(&mut self.nodes[split].equal, interval, insert);
            return;
        }

        if *split_key == *low {
            if !insert || interval.low_included() {
                touch(&mut self.nodes[split].equal, interval, insert);
            }
        } else if *split_key == *high {
            if !insert || interval.high_included() {
                touch(&mut self.nodes[split].equal, interval, insert);
            }
        } else {
            touch(&mut self.nodes[split].equal, interval, insert);
        }

        // Low path: left turns cover the node's key and right-hand region.
        if *split_key > *low {
            let mut cursor = self.nodes[split].left;
            while cursor != NIL {
                match (*self.nodes[cursor].key).cmp(low) {
                    Ordering::Greater => {
                        let node = &mut self.nodes[cursor];
                        touch(&mut node.greater, interval, insert);
                        touch(&mut node.equal, interval, insert);
                        cursor = self.nodes[cursor].left;
                    }
                    Ordering::Less => cursor = self.nodes[cursor].right,
                    Ordering::Equal => {
                        let node = &mut self.nodes[cursor];
                        touch(&mut node.greater, interval, insert);
                        if !insert || interval.low_included() {
                            touch(&mut node.equal, interval, insert);
                        }
                        break;
                    }
                }
            }
        }

        // High path, mirrored.
        if *split_key < *high {
            let mut cursor = self.nodes[split].right;
            while cursor != NIL {
                match (*self.nodes[cursor].key).cmp(high) {
                    Ordering::Less => {
                        let node = &mut self.nodes[cursor];
                        touch(&mut node.less, interval, insert);
                        touch(&mut node.equal, interval, insert);
                        cursor = self.nodes[cursor].right;
                    }
                    Ordering::Greater => cursor = self.nodes[cursor].left,
                    Ordering::Equal => {
                        let node = &mut self.nodes[cursor];
                        touch(&mut node.less, interval, insert);
                        if !insert || interval.high_included() {
                            touch(&mut node.equal, interval, insert);
                        }
                        break;
                    }
                }
            }
        }
    }

    fn apply_deltas(&mut self, interval: &'a I, sign: i32) {
        let low_node = self.find_key(interval.low());
        if low_node != NIL {
            if interval.low_included() {
                self.nodes[low_node].delta += sign;
            } else {
                self.nodes[low_node].delta_after += sign;
            }
            self.update_path(low_node);
        }
        let high_node = self.find_key(interval.high());
        if high_node != NIL {
            if interval.high_included() {
                self.nodes[high_node].delta_after -= sign;
            } else {
                self.nodes[high_node].delta -= sign;
            }
            self.update_path(high_node);
        }
    }

    fn add_ref(&mut self, interval: &'a I) -> Result<bool, IntervalError> {
        bounds::validate(interval)?;
        if self.member_slots.contains_key(&address(interval)) {
            return Ok(false);
        }
        self.ensure_key(interval.low());
        self.ensure_key(interval.high());
        self.register(interval, true);
        self.apply_deltas(interval, 1);
        self.member_slots
            .insert(address(interval), self.members.len());
        self.members.push(interval);
        Ok(true)
    }

    /// Drains every set in the subtree under `id` into the accumulator.
    fn push_subtree(&self, id: usize, acc: &mut Acc<'a, I>) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if id == NIL {
                continue;
            }
            let node = &self.nodes[id];
            for interval in node.less.iter() {
                acc.push(interval);
            }
            for interval in node.equal.iter() {
                acc.push(interval);
            }
            for interval in node.greater.iter() {
                acc.push(interval);
            }
            stack.push(node.left);
            stack.push(node.right);
        }
    }

    /// Range query: above the split node the turned-away sets are covered
    /// wholesale; below it the boundary paths filter per entry and drain the
    /// inner subtrees wholesale.
    fn collect_overlaps<Q>(&self, query: &Q) -> Vec<&'a I>
    where
        Q: IntervalBounds<Endpoint = I::Endpoint>,
    {
        let mut acc = Acc::new();
        if self.root == NIL {
            return acc.out;
        }

        let low = query.low();
        let high = query.high();

        let mut cursor = self.root;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            if *node.key < *low {
                for interval in node.greater.iter() {
                    acc.push(interval);
                }
                cursor = node.right;
            } else if *node.key > *high {
                for interval in node.less.iter() {
                    acc.push(interval);
                }
                cursor = node.left;
            } else {
                break;
            }
        }
        if cursor == NIL {
            return acc.out;
        }

        let split = &self.nodes[cursor];
        for interval in split
            .less
            .iter()
            .chain(split.equal.iter())
            .chain(split.greater.iter())
        {
            if interval.overlaps(query) {
                acc.push(interval);
            }
        }

        // Low boundary path.
        let mut cursor_left = split.left;
        while cursor_left != NIL {
            let node = &self.nodes[cursor_left];
            if *node.key >= *low {
                for interval in node.greater.iter() {
                    acc.push(interval);
                }
                for interval in node.equal.iter().chain(node.less.iter()) {
                    if interval.overlaps(query) {
                        acc.push(interval);
                    }
                }
                self.push_subtree(node.right, &mut acc);
                cursor_left = node.left;
            } else {
                for interval in node.greater.iter() {
                    if interval.overlaps(query) {
                        acc.push(interval);
                    }
                }
                cursor_left = node.right;
            }
        }

        // High boundary path.
        let mut cursor_right = split.right;
        while cursor_right != NIL {
            let node = &self.nodes[cursor_right];
            if *node.key <= *high {
                for interval in node.less.iter() {
                    acc.push(interval);
                }
                for interval in node.equal.iter().chain(node.greater.iter()) {
                    if interval.overlaps(query) {
                        acc.push(interval);
                    }
                }
                self.push_subtree(node.left, &mut acc);
                cursor_right = node.right;
            } else {
                for interval in node.less.iter() {
                    if interval.overlaps(query) {
                        acc.push(interval);
                    }
                }
                cursor_right = node.left;
            }
        }

        acc.out
    }
}

/// Insertion-ordered identity accumulator for range queries.
struct Acc<'a, I> {
    seen: FxHashSet<usize>,
    out: Vec<&'a I>,
}

impl<'a, I> Acc<'a, I> {
    fn new() -> Self {
        Acc {
            seen: FxHashSet::default(),
            out: Vec::new(),
        }
    }

    fn push(&mut self, interval: &'a I) {
        if self.seen.insert(address(interval)) {
            self.out.push(interval);
        }
    }
}

impl<'a, I> Default for IntervalBinarySearchTree<'a, I>
where
    I: IntervalBounds,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I> IntervalCollection<'a, I> for IntervalBinarySearchTree<'a, I>
where
    I: IntervalBounds + 'a,
{
    fn len(&self) -> usize {
        self.members.len()
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn allows_reference_duplicates(&self) -> bool {
        false
    }

    fn span(&self) -> Result<Interval<I::Endpoint>, CollectionError>
    where
        I::Endpoint: Clone,
    {
        SpanRefs::of_members(self.members.iter().copied())
            .map(|span| span.interval())
            .ok_or(CollectionError::Empty)
    }

    fn iter<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(self.members.iter().copied())
    }

    fn iter_sorted<'s>(&'s self) -> Box<dyn Iterator<Item = &'a I> + 's> {
        let mut sorted = self.members.clone();
        sorted.sort_unstable_by(|a, b| canonical_cmp(*a, *b));
        Box::new(sorted.into_iter())
    }

    fn find<'s>(
        &'s self,
        query: &'s Interval<I::Endpoint>,
    ) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(self.collect_overlaps(query).into_iter())
    }

    fn find_point<'s>(&'s self, point: &'s I::Endpoint) -> Box<dyn Iterator<Item = &'a I> + 's> {
        Box::new(StabIter {
            tree: self,
            point,
            cursor: self.root,
            current: None,
        })
    }
}

impl<'a, I> MutableIntervalCollection<'a, I> for IntervalBinarySearchTree<'a, I>
where
    I: IntervalBounds + 'a,
{
    fn add(&mut self, interval: &'a I) -> Result<bool, IntervalError> {
        self.add_ref(interval)
    }

    fn remove(&mut self, interval: &'a I) -> bool {
        let Some(slot) = self.member_slots.remove(&address(interval)) else {
            return false;
        };
        self.members.swap_remove(slot);
        if slot < self.members.len() {
            self.member_slots.insert(address(self.members[slot]), slot);
        }
        self.register(interval, false);
        self.apply_deltas(interval, -1);
        if self.members.is_empty() {
            // The last member is gone; drop the drained structural keys too.
            self.nodes.clear();
            self.root = NIL;
        }
        true
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.root = NIL;
        self.members.clear();
        self.member_slots.clear();
    }

    fn maximum_overlap(&self) -> usize {
        if self.root == NIL {
            0
        } else {
            self.nodes[self.root].max.max(0) as usize
        }
    }
}

/// Lazy stabbing cursor: one root-to-key walk, yielding the turned-away set
/// at every step. The decomposition regions are disjoint, so no
/// deduplication is needed.
struct StabIter<'s, 'a, I>
where
    I: IntervalBounds,
{
    tree: &'s IntervalBinarySearchTree<'a, I>,
    point: &'s I::Endpoint,
    cursor: usize,
    current: Option<std::iter::Copied<hash_map::Values<'s, usize, &'a I>>>,
}

impl<'s, 'a, I> Iterator for StabIter<'s, 'a, I>
where
    I: IntervalBounds + 'a,
{
    type Item = &'a I;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(interval) = current.next() {
                    return Some(interval);
                }
                self.current = None;
            }
            if self.cursor == NIL {
                return None;
            }
            let tree: &'s IntervalBinarySearchTree<'a, I> = self.tree;
            let node = &tree.nodes[self.cursor];
            match self.point.cmp(node.key) {
                Ordering::Less => {
                    self.current = Some(node.less.iter());
                    self.cursor = node.left;
                }
                Ordering::Greater => {
                    self.current = Some(node.greater.iter());
                    self.cursor = node.right;
                }
                Ordering::Equal => {
                    self.current = Some(node.equal.iter());
                    self.cursor = NIL;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn iv(low: i32, high: i32) -> Interval<i32> {
        Interval::closed(low, high).unwrap()
    }

    /// The dataset of the endpoint-inclusion stress scenario; `i32::MIN`
    /// stands in for the unbounded low end of `g`.
    struct IbsData {
        a: Interval<i32>,
        b: Interval<i32>,
        c: Interval<i32>,
        d: Interval<i32>,
        e1: Interval<i32>,
        e2: Interval<i32>,
        f: Interval<i32>,
        g: Interval<i32>,
        h: Interval<i32>,
    }

    #[fixture]
    fn data() -> IbsData {
        IbsData {
            a: iv(9, 19),
            b: iv(2, 7),
            c: Interval::closed_open(1, 3).unwrap(),
            d: Interval::open_closed(17, 20).unwrap(),
            e1: iv(8, 12),
            e2: iv(8, 12),
            f: Interval::point(18),
            g: Interval::open_closed(i32::MIN, 17).unwrap(),
            h: Interval::open(5, 10).unwrap(),
        }
    }

    fn build<'a>(data: &'a IbsData) -> IntervalBinarySearchTree<'a, Interval<i32>> {
        IntervalBinarySearchTree::from_refs([
            &data.a, &data.b, &data.c, &data.d, &data.e1, &data.e2, &data.f, &data.g,
            &data.h,
        ])
        .unwrap()
    }

    fn stab_sorted<'a>(
        tree: &IntervalBinarySearchTree<'a, Interval<i32>>,
        point: i32,
    ) -> Vec<Interval<i32>> {
        let mut hits: Vec<Interval<i32>> = tree.find_point(&point).cloned().collect();
        hits.sort();
        hits
    }

    #[rstest]
    fn stabbing_matches_the_reference_answers(data: IbsData) {
        let tree = build(&data);

        assert_eq!(stab_sorted(&tree, 0), vec![data.g.clone()]);
        assert_eq!(
            stab_sorted(&tree, 7),
            vec![data.g.clone(), data.b.clone(), data.h.clone()]
        );
        assert_eq!(stab_sorted(&tree, 9).len(), 5);
        assert_eq!(stab_sorted(&tree, 18).len(), 3);
        assert_eq!(tree.find_point(&21).count(), 0);
    }

    #[rstest]
    fn stab_results_identify_the_right_members(data: IbsData) {
        let tree = build(&data);

        let at9: Vec<&Interval<i32>> = tree.find_point(&9).collect();
        assert!(at9.iter().any(|iv| std::ptr::eq(*iv, &data.a)));
        assert!(at9.iter().any(|iv| std::ptr::eq(*iv, &data.e1)));
        assert!(at9.iter().any(|iv| std::ptr::eq(*iv, &data.e2)));
        assert!(at9.iter().any(|iv| std::ptr::eq(*iv, &data.g)));
        assert!(at9.iter().any(|iv| std::ptr::eq(*iv, &data.h)));

        let at18: Vec<&Interval<i32>> = tree.find_point(&18).collect();
        assert!(at18.iter().any(|iv| std::ptr::eq(*iv, &data.a)));
        assert!(at18.iter().any(|iv| std::ptr::eq(*iv, &data.d)));
        assert!(at18.iter().any(|iv| std::ptr::eq(*iv, &data.f)));
    }

    #[rstest]
    fn span_and_maximum_overlap(data: IbsData) {
        let tree = build(&data);
        assert_eq!(
            tree.span(),
            Ok(Interval::open_closed(i32::MIN, 20).unwrap())
        );
        assert_eq!(tree.maximum_overlap(), 5);
    }

    #[rstest]
    fn range_queries_deduplicate_across_registration_nodes(data: IbsData) {
        let tree = build(&data);

        let hits = stab_range(&tree, iv(8, 12));
        assert_eq!(hits.len(), 5); // a, e1, e2, g, h

        let hits = stab_range(&tree, iv(0, 30));
        assert_eq!(hits.len(), 9);

        assert_eq!(tree.find(&iv(21, 30)).count(), 0);
        assert_eq!(tree.count_overlaps(&iv(8, 12)), 5);
    }

    fn stab_range<'a>(
        tree: &IntervalBinarySearchTree<'a, Interval<i32>>,
        query: Interval<i32>,
    ) -> Vec<&'a Interval<i32>> {
        tree.find(&query).collect()
    }

    #[rstest]
    fn removal_retraces_the_registration(data: IbsData) {
        let mut tree = build(&data);

        assert!(tree.remove(&data.g));
        assert!(!tree.remove(&data.g));
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.find_point(&0).count(), 0);
        assert_eq!(tree.maximum_overlap(), 4);

        assert!(tree.remove(&data.e2));
        assert_eq!(stab_sorted(&tree, 9).len(), 3);

        for member in [&data.a, &data.b, &data.c, &data.d, &data.e1, &data.f, &data.h] {
            assert!(tree.remove(member));
        }
        assert!(tree.is_empty());
        assert_eq!(tree.maximum_overlap(), 0);
        assert_eq!(tree.find_point(&9).count(), 0);
    }

    #[test]
    fn reference_twins_are_distinct_members_but_references_are_unique() {
        let twin_a = iv(8, 12);
        let twin_b = iv(8, 12);
        let mut tree = IntervalBinarySearchTree::new();
        assert_eq!(tree.add(&twin_a), Ok(true));
        assert_eq!(tree.add(&twin_b), Ok(true));
        assert_eq!(tree.add(&twin_a), Ok(false));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find_point(&10).count(), 2);
        assert_eq!(tree.maximum_overlap(), 2);
        assert!(!tree.allows_reference_duplicates());
    }

    #[test]
    fn deltas_respect_endpoint_inclusion() {
        let closed = iv(0, 10);
        let touching = iv(10, 20);
        let open_touch = Interval::open_closed(10, 20).unwrap();

        let mut tree = IntervalBinarySearchTree::new();
        tree.add(&closed).unwrap();
        tree.add(&touching).unwrap();
        assert_eq!(tree.maximum_overlap(), 2);

        let mut tree = IntervalBinarySearchTree::new();
        tree.add(&closed).unwrap();
        tree.add(&open_touch).unwrap();
        assert_eq!(tree.maximum_overlap(), 1);
    }

    #[test]
    fn many_keys_force_rotations_and_queries_survive() {
        let intervals: Vec<Interval<i32>> = (0..64).map(|i| iv(i, i + 5)).collect();
        let tree = IntervalBinarySearchTree::from_refs(intervals.iter()).unwrap();

        assert_eq!(tree.len(), 64);
        assert_eq!(tree.maximum_overlap(), 6);
        for p in 0..70 {
            let expected = intervals.iter().filter(|iv| iv.overlaps_point(&p)).count();
            assert_eq!(tree.find_point(&p).count(), expected, "stab {p}");
        }
        for (low, high) in [(0, 3), (10, 40), (63, 69), (68, 69)] {
            let query = iv(low, high);
            let expected = intervals.iter().filter(|i| i.overlaps(&query)).count();
            assert_eq!(tree.find(&query).count(), expected, "range {low}..{high}");
        }
    }

    #[test]
    fn iteration_and_sorted_iteration_agree_on_membership() {
        let intervals: Vec<Interval<i32>> = vec![iv(4, 6), iv(0, 2), iv(1, 9)];
        let tree = IntervalBinarySearchTree::from_refs(intervals.iter()).unwrap();
        assert_eq!(tree.iter().count(), 3);
        assert_eq!(
            tree.iter_sorted().collect::<Vec<_>>(),
            vec![&iv(0, 2), &iv(1, 9), &iv(4, 6)]
        );
    }
}
