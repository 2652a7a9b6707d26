//! Endpoint-keyed overlap-depth tracking.
//!
//! An AVL tree over endpoint values carrying the ±1 delta scheme: an
//! interval's low end contributes `+1` at its key (`delta` when the endpoint
//! is included, `delta_after` when excluded) and its high end `−1` (mirrored:
//! `delta_after` when included, `delta` when excluded). The in-order prefix
//! sums of `delta + delta_after` then equal the stab depth around each key,
//! and each node augments its subtree with that prefix's running maximum, so
//! the largest stab depth anywhere is read off the root.

use std::cmp::Ordering;

#[derive(Debug)]
pub(crate) struct DepthMap<'a, T: Ord> {
    root: Option<Box<Node<'a, T>>>,
}

#[derive(Debug)]
struct Node<'a, T> {
    key: &'a T,
    /// Contribution landing exactly on the key.
    delta: i32,
    /// Contribution landing immediately after the key.
    delta_after: i32,
    /// Interval endpoints currently referencing this key.
    uses: u32,
    height: i32,
    sum: i64,
    max: i64,
    left: Option<Box<Node<'a, T>>>,
    right: Option<Box<Node<'a, T>>>,
}

impl<'a, T> Node<'a, T> {
    fn new(key: &'a T) -> Self {
        Node {
            key,
            delta: 0,
            delta_after: 0,
            uses: 0,
            height: 0,
            sum: 0,
            max: 0,
            left: None,
            right: None,
        }
    }
}

fn height<T>(slot: &Option<Box<Node<'_, T>>>) -> i32 {
    slot.as_ref().map_or(-1, |n| n.height)
}

fn sum<T>(slot: &Option<Box<Node<'_, T>>>) -> i64 {
    slot.as_ref().map_or(0, |n| n.sum)
}

fn max<T>(slot: &Option<Box<Node<'_, T>>>) -> i64 {
    slot.as_ref().map_or(0, |n| n.max)
}

fn update<T>(node: &mut Node<'_, T>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    let left_sum = sum(&node.left);
    let at_key = left_sum + i64::from(node.delta);
    let past_key = at_key + i64::from(node.delta_after);
    node.sum = past_key + sum(&node.right);
    node.max = max(&node.left)
        .max(at_key)
        .max(past_key)
        .max(past_key + max(&node.right));
}

fn balance_factor<T>(slot: &Option<Box<Node<'_, T>>>) -> i32 {
    slot.as_ref()
        .map_or(0, |n| height(&n.left) - height(&n.right))
}

fn rotate_left<'a, T: Ord>(slot: &mut Option<Box<Node<'a, T>>>) {
    if let Some(mut node) = slot.take() {
        match node.right.take() {
            Some(mut pivot) => {
                node.right = pivot.left.take();
                update(&mut node);
                pivot.left = Some(node);
                update(&mut pivot);
                *slot = Some(pivot);
            }
            None => *slot = Some(node),
        }
    }
}

fn rotate_right<'a, T: Ord>(slot: &mut Option<Box<Node<'a, T>>>) {
    if let Some(mut node) = slot.take() {
        match node.left.take() {
            Some(mut pivot) => {
                node.left = pivot.right.take();
                update(&mut node);
                pivot.right = Some(node);
                update(&mut pivot);
                *slot = Some(pivot);
            }
            None => *slot = Some(node),
        }
    }
}

fn rebalance<'a, T: Ord>(slot: &mut Option<Box<Node<'a, T>>>) {
    let bf = balance_factor(slot);
    if bf > 1 {
        if let Some(node) = slot.as_mut() {
            if balance_factor(&node.left) < 0 {
                rotate_left(&mut node.left);
            }
        }
        rotate_right(slot);
    } else if bf < -1 {
        if let Some(node) = slot.as_mut() {
            if balance_factor(&node.right) > 0 {
                rotate_right(&mut node.right);
            }
        }
        rotate_left(slot);
    }
}

fn apply<'a, T, F>(slot: &mut Option<Box<Node<'a, T>>>, key: &'a T, f: F) -> u32
where
    T: Ord,
    F: FnOnce(&mut Node<'a, T>),
{
    let uses = match slot {
        None => {
            let mut node = Box::new(Node::new(key));
            f(&mut node);
            update(&mut node);
            let uses = node.uses;
            *slot = Some(node);
            return uses;
        }
        Some(node) => match key.cmp(node.key) {
            Ordering::Less => apply(&mut node.left, key, f),
            Ordering::Greater => apply(&mut node.right, key, f),
            Ordering::Equal => {
                f(node);
                node.uses
            }
        },
    };
    if let Some(node) = slot.as_mut() {
        update(node);
    }
    rebalance(slot);
    uses
}

fn remove_key<'a, T: Ord>(slot: &mut Option<Box<Node<'a, T>>>, key: &T) {
    let found = match slot.as_mut() {
        None => return,
        Some(node) => match key.cmp(node.key) {
            Ordering::Less => {
                remove_key(&mut node.left, key);
                false
            }
            Ordering::Greater => {
                remove_key(&mut node.right, key);
                false
            }
            Ordering::Equal => true,
        },
    };

    if found {
        let Some(mut node) = slot.take() else { return };
        match (node.left.take(), node.right.take()) {
            (None, None) => return,
            (Some(left), None) => {
                *slot = Some(left);
                return;
            }
            (None, Some(right)) => {
                *slot = Some(right);
                return;
            }
            (Some(left), Some(right)) => {
                node.left = Some(left);
                let mut right = Some(right);
                if let Some((key, delta, delta_after, uses)) = take_min(&mut right) {
                    node.key = key;
                    node.delta = delta;
                    node.delta_after = delta_after;
                    node.uses = uses;
                }
                node.right = right;
                *slot = Some(node);
            }
        }
    }

    if let Some(node) = slot.as_mut() {
        update(node);
    }
    rebalance(slot);
}

/// Splices out the leftmost node and returns its payload.
fn take_min<'a, T: Ord>(
    slot: &mut Option<Box<Node<'a, T>>>,
) -> Option<(&'a T, i32, i32, u32)> {
    let has_left = slot.as_ref().is_some_and(|n| n.left.is_some());
    if has_left {
        let result = {
            let node = slot.as_mut()?;
            let result = take_min(&mut node.left);
            update(node);
            result
        };
        rebalance(slot);
        result
    } else {
        let mut node = slot.take()?;
        *slot = node.right.take();
        Some((node.key, node.delta, node.delta_after, node.uses))
    }
}

impl<'a, T: Ord> DepthMap<'a, T> {
    pub fn new() -> Self {
        DepthMap { root: None }
    }

    /// Registers an interval's endpoint contributions.
    pub fn insert(&mut self, low: &'a T, low_included: bool, high: &'a T, high_included: bool) {
        apply(&mut self.root, low, |node| {
            if low_included {
                node.delta += 1;
            } else {
                node.delta_after += 1;
            }
            node.uses += 1;
        });
        apply(&mut self.root, high, |node| {
            if high_included {
                node.delta_after -= 1;
            } else {
                node.delta -= 1;
            }
            node.uses += 1;
        });
    }

    /// Withdraws an interval's endpoint contributions, pruning keys no
    /// endpoint references any more.
    pub fn remove(&mut self, low: &'a T, low_included: bool, high: &'a T, high_included: bool) {
        let uses = apply(&mut self.root, low, |node| {
            if low_included {
                node.delta -= 1;
            } else {
                node.delta_after -= 1;
            }
            node.uses -= 1;
        });
        if uses == 0 {
            remove_key(&mut self.root, low);
        }
        let uses = apply(&mut self.root, high, |node| {
            if high_included {
                node.delta_after += 1;
            } else {
                node.delta += 1;
            }
            node.uses -= 1;
        });
        if uses == 0 {
            remove_key(&mut self.root, high);
        }
    }

    /// The largest stab depth across the whole line.
    pub fn max_overlap(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.max.max(0) as usize)
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    #[cfg(test)]
    fn key_count(&self) -> usize {
        fn count<T>(slot: &Option<Box<Node<'_, T>>>) -> usize {
            slot.as_ref()
                .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
        }
        count(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn disjoint_intervals_keep_depth_one() {
        let keys: Vec<i32> = vec![0, 5, 10, 15];
        let mut map = DepthMap::new();
        map.insert(&keys[0], true, &keys[1], true);
        map.insert(&keys[2], true, &keys[3], true);
        assert_eq!(map.max_overlap(), 1);
    }

    #[test]
    fn nested_intervals_stack() {
        let keys: Vec<i32> = (0..10).collect();
        let mut map = DepthMap::new();
        map.insert(&keys[0], true, &keys[9], true);
        map.insert(&keys[1], true, &keys[8], true);
        map.insert(&keys[2], true, &keys[7], true);
        assert_eq!(map.max_overlap(), 3);

        map.remove(&keys[1], true, &keys[8], true);
        assert_eq!(map.max_overlap(), 2);
        map.remove(&keys[0], true, &keys[9], true);
        map.remove(&keys[2], true, &keys[7], true);
        assert_eq!(map.max_overlap(), 0);
        assert_eq!(map.key_count(), 0);
    }

    #[test]
    fn touching_closed_bounds_overlap_open_ones_do_not() {
        let keys: Vec<i32> = vec![0, 5, 10];
        let mut map = DepthMap::new();
        map.insert(&keys[0], true, &keys[1], true);
        map.insert(&keys[1], true, &keys[2], true);
        assert_eq!(map.max_overlap(), 2);

        let mut map = DepthMap::new();
        map.insert(&keys[0], true, &keys[1], false);
        map.insert(&keys[1], true, &keys[2], true);
        assert_eq!(map.max_overlap(), 1);

        let mut map = DepthMap::new();
        map.insert(&keys[0], true, &keys[1], true);
        map.insert(&keys[1], false, &keys[2], true);
        assert_eq!(map.max_overlap(), 1);
    }

    #[test]
    fn point_intervals_contribute_at_a_single_key() {
        let five = 5;
        let mut map = DepthMap::new();
        map.insert(&five, true, &five, true);
        map.insert(&five, true, &five, true);
        assert_eq!(map.max_overlap(), 2);
        map.remove(&five, true, &five, true);
        assert_eq!(map.max_overlap(), 1);
        map.remove(&five, true, &five, true);
        assert_eq!(map.max_overlap(), 0);
        assert_eq!(map.key_count(), 0);
    }

    #[test]
    fn interleaved_chains_track_the_deepest_point() {
        let keys: Vec<i32> = (0..100).collect();
        let mut map = DepthMap::new();
        // [i, i+10] for i in 0,2,4,...,38: the densest point sees 6 members.
        for i in (0..40).step_by(2) {
            map.insert(&keys[i], true, &keys[i + 10], true);
        }
        assert_eq!(map.max_overlap(), 6);
        for i in (0..40).step_by(2) {
            map.remove(&keys[i], true, &keys[i + 10], true);
        }
        assert_eq!(map.max_overlap(), 0);
        assert_eq!(map.key_count(), 0);
    }
}
