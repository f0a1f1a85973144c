//! Ordered Index Module
//!
//! Intrusive doubly-linked recency list stored in a flat arena.
//!
//! Slot 0 is the head sentinel and slot 1 the tail sentinel. Live nodes sit
//! between them, most recently used first. Links are slot indices, so the
//! structure has no owning cycles. Freed slots are chained through their
//! `next` field and reused before the arena grows.

use std::collections::TryReserveError;
use std::fmt;
use std::iter::FusedIterator;

const HEAD: usize = 0;
const TAIL: usize = 1;
const NIL: usize = usize::MAX;

// == Handle ==
/// Stable reference to a live node in an [`OrderedIndex`].
///
/// A handle stays valid until its node is unlinked. Using it afterwards, or
/// with a different index, is a caller bug: access panics if the slot is not
/// occupied, and silently refers to another entry if the slot was reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Returns the arena slot this handle points at.
    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Sentinel,
    Occupied(T),
    Free,
}

#[derive(Debug, Clone)]
struct Node<T> {
    prev: usize,
    next: usize,
    slot: Slot<T>,
}

impl<T> Node<T> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            prev,
            next,
            slot: Slot::Sentinel,
        }
    }
}

// == Ordered Index ==
/// Recency-ordered arena list with O(1) structural updates.
#[derive(Clone)]
pub struct OrderedIndex<T> {
    nodes: Vec<Node<T>>,
    free_head: usize,
    len: usize,
}

impl<T> OrderedIndex<T> {
    // == Constructor ==
    /// Creates an empty list holding only the two sentinels.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(NIL, TAIL), Node::sentinel(HEAD, NIL)],
            free_head: NIL,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` nodes before the
    /// arena reallocates.
    ///
    /// # Errors
    /// Returns the allocator's error instead of panicking or aborting when
    /// the reservation cannot be satisfied.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut list = Self::new();
        list.nodes.try_reserve_exact(capacity)?;
        Ok(list)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Stores `value` in a node placed directly after the head sentinel.
    pub fn push_front(&mut self, value: T) -> Handle {
        let idx = self.alloc(value);
        self.link_front(idx);
        self.len += 1;
        Handle(idx)
    }

    // == Move To Front ==
    /// Relinks the node directly after the head sentinel.
    ///
    /// Calling this on the current front node leaves the order unchanged.
    ///
    /// # Panics
    /// If `handle` does not refer to a live node.
    pub fn move_to_front(&mut self, handle: Handle) {
        self.check(handle);
        self.detach(handle.0);
        self.link_front(handle.0);
    }

    // == Unlink ==
    /// Removes the node from the chain and returns its contents.
    ///
    /// # Panics
    /// If `handle` does not refer to a live node.
    pub fn unlink(&mut self, handle: Handle) -> T {
        self.check(handle);
        self.detach(handle.0);

        let node = &mut self.nodes[handle.0];
        let slot = std::mem::replace(&mut node.slot, Slot::Free);
        node.prev = NIL;
        node.next = self.free_head;
        self.free_head = handle.0;
        self.len -= 1;

        match slot {
            Slot::Occupied(value) => value,
            Slot::Sentinel | Slot::Free => unreachable!("checked slot was not occupied"),
        }
    }

    // == Peek ==
    /// Least recently used node, if any.
    pub fn peek_back(&self) -> Option<Handle> {
        let idx = self.nodes[TAIL].prev;
        (idx != HEAD).then_some(Handle(idx))
    }

    /// Most recently used node, if any.
    pub fn peek_front(&self) -> Option<Handle> {
        let idx = self.nodes[HEAD].next;
        (idx != TAIL).then_some(Handle(idx))
    }

    // == Pop Back ==
    /// Unlinks and returns the least recently used node's contents.
    pub fn pop_back(&mut self) -> Option<T> {
        self.peek_back().map(|handle| self.unlink(handle))
    }

    /// Neighbour one step towards the head, if it is a live node.
    ///
    /// Starting from [`peek_back`](Self::peek_back), this walks the list
    /// from least to most recently used.
    pub fn prev_of(&self, handle: Handle) -> Option<Handle> {
        self.check(handle);
        let idx = self.nodes[handle.0].prev;
        (idx != HEAD).then_some(Handle(idx))
    }

    // == Access ==
    /// # Panics
    /// If `handle` does not refer to a live node.
    pub fn get(&self, handle: Handle) -> &T {
        match self.nodes.get(handle.0).map(|node| &node.slot) {
            Some(Slot::Occupied(value)) => value,
            _ => panic!("{handle:?} does not refer to a live node"),
        }
    }

    /// # Panics
    /// If `handle` does not refer to a live node.
    pub fn get_mut(&mut self, handle: Handle) -> &mut T {
        match self.nodes.get_mut(handle.0).map(|node| &mut node.slot) {
            Some(Slot::Occupied(value)) => value,
            _ => panic!("{handle:?} does not refer to a live node"),
        }
    }

    // == Clear ==
    /// Drops every node and releases all non-sentinel slots.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free_head = NIL;
        self.len = 0;
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            front: self.nodes[HEAD].next,
            back: self.nodes[TAIL].prev,
            remaining: self.len,
        }
    }

    fn check(&self, handle: Handle) {
        let live = matches!(
            self.nodes.get(handle.0).map(|node| &node.slot),
            Some(Slot::Occupied(_))
        );
        assert!(live, "{handle:?} does not refer to a live node");
    }

    fn alloc(&mut self, value: T) -> usize {
        if self.free_head != NIL {
            let idx = self.free_head;
            let node = &mut self.nodes[idx];
            self.free_head = node.next;
            node.slot = Slot::Occupied(value);
            idx
        } else {
            self.nodes.push(Node {
                prev: NIL,
                next: NIL,
                slot: Slot::Occupied(value),
            });
            self.nodes.len() - 1
        }
    }

    fn detach(&mut self, idx: usize) {
        let Node { prev, next, .. } = self.nodes[idx];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    /// Walks the chain in both directions and panics on any broken link,
    /// duplicate node or count mismatch.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = vec![false; self.nodes.len()];
        let mut idx = self.nodes[HEAD].next;
        let mut prev = HEAD;
        let mut count = 0;
        while idx != TAIL {
            assert!(!seen[idx], "slot {idx} appears twice in the chain");
            seen[idx] = true;
            assert!(matches!(self.nodes[idx].slot, Slot::Occupied(_)));
            assert_eq!(self.nodes[idx].prev, prev, "broken back link at {idx}");
            prev = idx;
            idx = self.nodes[idx].next;
            count += 1;
        }
        assert_eq!(self.nodes[TAIL].prev, prev);
        assert_eq!(count, self.len);

        let occupied = self
            .nodes
            .iter()
            .filter(|node| matches!(node.slot, Slot::Occupied(_)))
            .count();
        assert_eq!(occupied, self.len, "occupied slot outside the chain");

        let mut free = 0;
        let mut idx = self.free_head;
        while idx != NIL {
            assert!(matches!(self.nodes[idx].slot, Slot::Free));
            idx = self.nodes[idx].next;
            free += 1;
        }
        assert_eq!(free + self.len + 2, self.nodes.len(), "leaked slot");
    }
}

impl<T> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, value)| value)).finish()
    }
}

// == Iterator ==
/// Iterator over `(Handle, &T)` from most to least recently used.
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn value(&self, idx: usize) -> &'a T {
        let nodes = self.nodes;
        match &nodes[idx].slot {
            Slot::Occupied(value) => value,
            Slot::Sentinel | Slot::Free => unreachable!("chain reached a non-live slot"),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front;
        self.front = self.nodes[idx].next;
        self.remaining -= 1;
        Some((Handle(idx), self.value(idx)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back;
        self.back = self.nodes[idx].prev;
        self.remaining -= 1;
        Some((Handle(idx), self.value(idx)))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &OrderedIndex<T>) -> Vec<T> {
        list.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_list_new() {
        let list: OrderedIndex<u32> = OrderedIndex::new();
        assert!(list.is_empty());
        assert_eq!(list.peek_back(), None);
        assert_eq!(list.peek_front(), None);
        list.assert_consistent();
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = OrderedIndex::new();
        let a = list.push_front('a');
        list.push_front('b');
        let c = list.push_front('c');

        assert_eq!(list.len(), 3);
        assert_eq!(values(&list), vec!['c', 'b', 'a']);
        assert_eq!(list.peek_back(), Some(a));
        assert_eq!(list.peek_front(), Some(c));
        list.assert_consistent();
    }

    #[test]
    fn test_move_to_front() {
        let mut list = OrderedIndex::new();
        let a = list.push_front('a');
        list.push_front('b');
        list.push_front('c');

        list.move_to_front(a);

        assert_eq!(values(&list), vec!['a', 'c', 'b']);
        list.assert_consistent();
    }

    #[test]
    fn test_move_to_front_when_already_front() {
        let mut list = OrderedIndex::new();
        list.push_front(1);
        let b = list.push_front(2);

        list.move_to_front(b);
        list.move_to_front(b);

        assert_eq!(values(&list), vec![2, 1]);
        list.assert_consistent();
    }

    #[test]
    fn test_move_to_front_single_node() {
        let mut list = OrderedIndex::new();
        let only = list.push_front(1);

        list.move_to_front(only);

        assert_eq!(list.peek_front(), Some(only));
        assert_eq!(list.peek_back(), Some(only));
        list.assert_consistent();
    }

    #[test]
    fn test_unlink_middle() {
        let mut list = OrderedIndex::new();
        list.push_front('a');
        let b = list.push_front('b');
        list.push_front('c');

        assert_eq!(list.unlink(b), 'b');

        assert_eq!(values(&list), vec!['c', 'a']);
        list.assert_consistent();
    }

    #[test]
    fn test_pop_back_drains_in_lru_order() {
        let mut list = OrderedIndex::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.assert_consistent();
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = OrderedIndex::new();
        let a = list.push_front('a');
        list.push_front('b');

        list.unlink(a);
        let c = list.push_front('c');

        assert_eq!(c.slot(), a.slot());
        assert_eq!(values(&list), vec!['c', 'b']);
        list.assert_consistent();
    }

    #[test]
    fn test_prev_of_walks_towards_head() {
        let mut list = OrderedIndex::new();
        let a = list.push_front('a');
        let b = list.push_front('b');
        let c = list.push_front('c');

        assert_eq!(list.prev_of(a), Some(b));
        assert_eq!(list.prev_of(b), Some(c));
        assert_eq!(list.prev_of(c), None);
    }

    #[test]
    fn test_try_with_capacity() {
        let mut list = OrderedIndex::try_with_capacity(8).unwrap();
        assert!(list.is_empty());
        list.push_front(1);
        list.assert_consistent();
    }

    #[test]
    fn test_try_with_capacity_overflow_is_an_error() {
        let result = OrderedIndex::<u64>::try_with_capacity(usize::MAX - 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = OrderedIndex::new();
        let a = list.push_front(1);

        *list.get_mut(a) += 41;

        assert_eq!(*list.get(a), 42);
    }

    #[test]
    fn test_clear_resets_arena() {
        let mut list = OrderedIndex::new();
        list.push_front(1);
        let b = list.push_front(2);
        list.unlink(b);

        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.peek_back(), None);
        list.assert_consistent();

        list.push_front(3);
        assert_eq!(values(&list), vec![3]);
        list.assert_consistent();
    }

    #[test]
    fn test_iter_both_directions() {
        let mut list = OrderedIndex::new();
        for i in 0..4 {
            list.push_front(i);
        }

        let forward: Vec<_> = list.iter().map(|(_, v)| *v).collect();
        let backward: Vec<_> = list.iter().rev().map(|(_, v)| *v).collect();
        assert_eq!(forward, vec![3, 2, 1, 0]);
        assert_eq!(backward, vec![0, 1, 2, 3]);

        let mut iter = list.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next().map(|(_, v)| *v), Some(3));
        assert_eq!(iter.next_back().map(|(_, v)| *v), Some(0));
        assert_eq!(iter.len(), 2);
    }

    #[test]
    #[should_panic(expected = "does not refer to a live node")]
    fn test_unlink_stale_handle_panics() {
        let mut list = OrderedIndex::new();
        let a = list.push_front(1);
        list.unlink(a);
        list.unlink(a);
    }

    #[test]
    #[should_panic(expected = "does not refer to a live node")]
    fn test_sentinel_handle_panics() {
        let list: OrderedIndex<u8> = OrderedIndex::new();
        list.get(Handle(HEAD));
    }
}
