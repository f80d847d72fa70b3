//! Many singly-linked stacks sharing one node array.
//!
//! # Overview
//!
//! - A stack is nothing but the handle of its top node. The caller keeps it;
//!   the pool only stores nodes.
//! - Recycled nodes form one more stack inside the same array, the free list.
//!   Freeing a node pushes it onto the free list, allocating pops it off, so
//!   the most recently freed node is the next one reused.
//! - Every node belongs to exactly one chain at a time: some caller stack, or
//!   the free list.
//!
//! Push and pop share one primitive, `splice_top`, which moves the top node
//! of one chain onto the front of another. `free_stack` moves a whole chain
//! by relinking its bottom node.

use core::fmt;
use core::mem;
use core::ops::{Index, IndexMut};

use crate::StackIndex;
use crate::cfg;
use crate::error::StackError;
use crate::iter::{CursorMut, Iter};
use crate::storage::{Node, NodeStorage};

// -----------------------------------------------------------------------------
// StackPool

/// A pool of singly-linked stacks addressed by integer handles.
///
/// `N` is the handle type, see [`StackIndex`]. Handle `0` is the empty stack.
///
/// Handles remain valid when the pool grows, but references returned by
/// [`value`](Self::value) and friends must be fetched again after a push.
///
/// # Examples
///
/// ```
/// use sp_pool::StackPool;
///
/// let mut pool = StackPool::<i32>::new();
/// let mut stack = pool.new_stack();
///
/// stack = pool.push(10, stack);
/// stack = pool.push(20, stack);
/// assert_eq!(pool.iter(stack).copied().collect::<Vec<_>>(), [20, 10]);
///
/// stack = pool.pop(stack);
/// assert_eq!(pool[stack], 10);
///
/// stack = pool.free_stack(stack);
/// assert!(pool.is_empty(stack));
/// ```
#[derive(Clone)]
pub struct StackPool<T, N = usize> {
    storage: NodeStorage<T, N>,
    free_head: N,
}

impl<T, N: StackIndex> StackPool<T, N> {
    /// Creates an empty pool.
    ///
    /// This function does not allocate any memory.
    #[inline]
    pub const fn new() -> Self {
        Self {
            storage: NodeStorage::new(),
            free_head: N::END,
        }
    }

    /// Creates an empty pool with room for at least `n` nodes.
    pub fn with_capacity(n: usize) -> Self {
        let mut pool = Self::new();
        pool.reserve(n);
        pool
    }

    /// Returns the handle of a new, empty stack.
    #[inline(always)]
    pub fn new_stack(&self) -> N {
        self.end()
    }

    /// Returns the handle of an empty stack, which is also the end of every stack.
    #[inline(always)]
    pub fn end(&self) -> N {
        N::END
    }

    /// Returns `true` if `head` is the empty stack.
    #[inline(always)]
    pub fn is_empty(&self, head: N) -> bool {
        head.is_end()
    }

    /// Requests capacity for at least `n` nodes in total.
    #[inline]
    pub fn reserve(&mut self, n: usize) {
        self.storage.reserve(n);
    }

    /// Returns the number of nodes the pool can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns the number of nodes created so far, whether in use or free.
    #[inline]
    pub fn slots(&self) -> usize {
        self.storage.len()
    }

    /// Returns the head of the free list.
    #[inline]
    pub fn free_head(&self) -> N {
        self.free_head
    }

    /// Counts the nodes waiting on the free list.
    ///
    /// O(n) time complexity.
    pub fn free_len(&self) -> usize {
        self.chain_len(self.free_head)
    }

    /// Counts the nodes of the stack at `head`.
    ///
    /// O(n) time complexity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<&str, u32>::new();
    /// let stack = pool.push("a", pool.new_stack());
    /// let stack = pool.push("b", stack);
    ///
    /// assert_eq!(pool.stack_len(stack), 2);
    /// assert_eq!(pool.stack_len(pool.end()), 0);
    /// ```
    pub fn stack_len(&self, head: N) -> usize {
        self.chain_len(head)
    }

    fn chain_len(&self, mut head: N) -> usize {
        let mut len = 0;
        while !head.is_end() {
            len += 1;
            head = self.next(head);
        }
        len
    }

    // -------------------------------------------------------------------------
    // Accessors

    /// Returns the value on top of the stack at `head`.
    ///
    /// Fails with [`StackError::EmptyValue`] if the stack is empty.
    #[inline]
    pub fn try_value(&self, head: N) -> Result<&T, StackError> {
        if head.is_end() {
            return Err(StackError::EmptyValue);
        }
        let node = self.storage.node(head);
        debug_check_live(node, head);
        Ok(&node.value)
    }

    /// Mutable version of [`try_value`](Self::try_value).
    #[inline]
    pub fn try_value_mut(&mut self, head: N) -> Result<&mut T, StackError> {
        if head.is_end() {
            return Err(StackError::EmptyValue);
        }
        let node = self.storage.node_mut(head);
        debug_check_live(node, head);
        Ok(&mut node.value)
    }

    /// Returns the value on top of the stack at `head`.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    #[inline]
    pub fn value(&self, head: N) -> &T {
        self.try_value(head).unwrap_or_else(|e| e.handle_error())
    }

    /// Returns a mutable reference to the value on top of the stack at `head`.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    #[inline]
    pub fn value_mut(&mut self, head: N) -> &mut T {
        self.try_value_mut(head).unwrap_or_else(|e| e.handle_error())
    }

    /// Returns the handle following `handle` in its chain.
    ///
    /// `handle` must not be the empty stack; no check is made beyond the
    /// bounds check of the node array.
    #[inline]
    pub fn next(&self, handle: N) -> N {
        self.storage.node(handle).next
    }

    /// Returns a mutable reference to the link following `handle`.
    ///
    /// Rewriting links by hand can merge or cut chains; the pool does not
    /// notice.
    #[inline]
    pub fn next_mut(&mut self, handle: N) -> &mut N {
        &mut self.storage.node_mut(handle).next
    }

    // -------------------------------------------------------------------------
    // Stack operations

    /// Moves the top node of the chain at `from` onto the front of the chain
    /// at `onto`.
    ///
    /// Returns the new heads of both chains: what was below the moved node,
    /// and the moved node itself.
    #[inline]
    fn splice_top(&mut self, from: N, onto: N) -> (N, N) {
        let rest = mem::replace(&mut self.storage.node_mut(from).next, onto);
        (rest, from)
    }

    /// Pushes `value` onto the stack at `head` and returns the new head.
    ///
    /// The most recently freed node is reused if there is one, otherwise the
    /// node array grows by one.
    ///
    /// Fails with [`StackError::HandleOverflow`] if a new node is needed and
    /// its handle does not fit in `N`.
    pub fn try_push(&mut self, value: T, head: N) -> Result<N, StackError> {
        let free = self.free_head;
        if free.is_end() {
            let handle = self.storage.append(value, head)?;
            log::trace!("free list empty, appended node {handle}");
            return Ok(handle);
        }

        let node = self.storage.node_mut(free);
        node.value = value;
        cfg::debug! { node.released = false; }

        let (rest, head) = self.splice_top(free, head);
        self.free_head = rest;
        Ok(head)
    }

    /// Pushes `value` onto the stack at `head` and returns the new head.
    ///
    /// # Panics
    ///
    /// Panics if the node array outgrows the handle type `N`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<char>::new();
    /// let a = pool.push('a', pool.new_stack());
    /// let b = pool.push('b', a);
    ///
    /// assert_eq!(pool.next(b), a);
    /// assert_eq!(pool[b], 'b');
    /// ```
    #[inline]
    pub fn push(&mut self, value: T, head: N) -> N {
        self.try_push(value, head).unwrap_or_else(|e| e.handle_error())
    }

    /// Removes the top node of the stack at `head` and returns the new head.
    ///
    /// The node goes to the free list. Its value stays in place until the node
    /// is reused.
    ///
    /// Fails with [`StackError::EmptyPop`] if the stack is empty, leaving the
    /// pool untouched.
    pub fn try_pop(&mut self, head: N) -> Result<N, StackError> {
        if head.is_end() {
            return Err(StackError::EmptyPop);
        }
        debug_check_live(self.storage.node(head), head);

        let (rest, free) = self.splice_top(head, self.free_head);
        cfg::debug! { self.storage.node_mut(free).released = true; }
        self.free_head = free;
        Ok(rest)
    }

    /// Removes the top node of the stack at `head` and returns the new head.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<u8>::new();
    /// let bottom = pool.push(1, pool.new_stack());
    /// let top = pool.push(2, bottom);
    ///
    /// assert_eq!(pool.pop(top), bottom);
    /// assert_eq!(pool.pop(bottom), pool.end());
    /// ```
    #[inline]
    pub fn pop(&mut self, head: N) -> N {
        self.try_pop(head).unwrap_or_else(|e| e.handle_error())
    }

    /// Frees every node of the stack at `head` at once and returns the empty
    /// stack.
    ///
    /// The whole chain is put in front of the free list. Finding the bottom
    /// node takes O(n) time, the splice itself is O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<i32>::new();
    /// let mut stack = pool.new_stack();
    /// for i in 0..3 {
    ///     stack = pool.push(i, stack);
    /// }
    ///
    /// stack = pool.free_stack(stack);
    /// assert!(pool.is_empty(stack));
    /// assert_eq!(pool.free_len(), 3);
    /// ```
    pub fn free_stack(&mut self, head: N) -> N {
        if head.is_end() {
            return head;
        }

        cfg::debug! {
            let mut current = head;
            while !current.is_end() {
                let node = self.storage.node_mut(current);
                debug_check_live(node, current);
                node.released = true;
                current = node.next;
            }
        }

        let tail = self.last(head);
        *self.next_mut(tail) = self.free_head;
        self.free_head = head;
        N::END
    }

    /// Returns the bottom node of the non-empty chain at `head`.
    fn last(&self, mut head: N) -> N {
        debug_assert!(!head.is_end());
        loop {
            let next = self.next(head);
            if next.is_end() {
                return head;
            }
            head = next;
        }
    }

    // -------------------------------------------------------------------------
    // Iteration

    /// Iterates over the stack at `head`, from top to bottom.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<i32>::new();
    /// let mut stack = pool.new_stack();
    /// for i in 1..=3 {
    ///     stack = pool.push(i, stack);
    /// }
    ///
    /// let sum: i32 = pool.iter(stack).sum();
    /// assert_eq!(sum, 6);
    /// assert_eq!(pool.iter(stack).next(), Some(&3));
    /// ```
    #[inline]
    pub fn iter(&self, head: N) -> Iter<'_, T, N> {
        Iter::new(self, head)
    }

    /// Returns a cursor that walks the stack at `head` and can modify values.
    #[inline]
    pub fn cursor_mut(&mut self, head: N) -> CursorMut<'_, T, N> {
        CursorMut::new(self, head)
    }

    /// Calls `f` on every value of the stack at `head`, from top to bottom.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sp_pool::StackPool;
    /// let mut pool = StackPool::<i32>::new();
    /// let stack = pool.push(1, pool.new_stack());
    /// let stack = pool.push(2, stack);
    ///
    /// pool.for_each_mut(stack, |v| *v *= 10);
    /// assert!(pool.iter(stack).eq(&[20, 10]));
    /// ```
    pub fn for_each_mut(&mut self, head: N, mut f: impl FnMut(&mut T)) {
        let mut cursor = self.cursor_mut(head);
        while let Some(value) = cursor.current_mut() {
            f(value);
            cursor.advance();
        }
    }
}

/// Trips when a handle points at a node that sits on the free list.
#[inline(always)]
#[cfg_attr(
    not(any(debug_assertions, feature = "debug")),
    expect(unused_variables, reason = "checks compiled out")
)]
fn debug_check_live<T, N: StackIndex>(node: &Node<T, N>, handle: N) {
    cfg::debug! {
        let stale = node.released;
        if stale {
            log::warn!("handle {handle} refers to a node on the free list");
        }
        assert!(!stale, "stale handle {handle}");
    }
}

impl<T, N: StackIndex> Default for StackPool<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N: StackIndex> Index<N> for StackPool<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, head: N) -> &T {
        self.value(head)
    }
}

impl<T, N: StackIndex> IndexMut<N> for StackPool<T, N> {
    #[inline]
    fn index_mut(&mut self, head: N) -> &mut T {
        self.value_mut(head)
    }
}

impl<T, N: StackIndex> fmt::Debug for StackPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackPool")
            .field("capacity", &self.capacity())
            .field("slots", &self.slots())
            .field("free", &self.free_len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::StackPool;
    use crate::StackError;

    fn collect<N: crate::StackIndex>(pool: &StackPool<i32, N>, head: N) -> Vec<i32> {
        pool.iter(head).copied().collect()
    }

    fn handles(pool: &StackPool<i32>, mut head: usize) -> Vec<usize> {
        let mut out = Vec::new();
        while !pool.is_empty(head) {
            out.push(head);
            head = pool.next(head);
        }
        out
    }

    #[test]
    fn is_sync_send() {
        use core::panic::{RefUnwindSafe, UnwindSafe};

        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}
        fn is_unwindsafe<T: UnwindSafe>() {}
        fn is_refunwindsafe<T: RefUnwindSafe>() {}

        is_send::<StackPool<i32>>();
        is_sync::<StackPool<i32>>();
        is_unwindsafe::<StackPool<i32>>();
        is_refunwindsafe::<StackPool<i32>>();
    }

    #[test]
    fn new_pool_is_empty() {
        let pool = StackPool::<i32>::new();
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.slots(), 0);
        assert_eq!(pool.free_head(), 0);
        assert_eq!(pool.new_stack(), pool.end());
        assert!(pool.is_empty(pool.new_stack()));

        let pool = StackPool::<i32, u16>::with_capacity(16);
        assert!(pool.capacity() >= 16);
        assert_eq!(pool.slots(), 0);
        assert_eq!(pool.free_head(), 0);
    }

    #[test]
    fn push_pop_free_walkthrough() {
        let mut pool = StackPool::<i32>::with_capacity(0);

        let h1 = pool.push(10, pool.new_stack());
        assert_eq!(h1, 1);
        assert_eq!(pool[h1], 10);
        assert_eq!(pool.next(h1), pool.end());

        let h2 = pool.push(20, h1);
        assert_eq!(h2, 2);
        assert_eq!(pool[h2], 20);
        assert_eq!(pool.next(h2), h1);
        assert_eq!(collect(&pool, h2), [20, 10]);

        assert_eq!(pool.pop(h2), h1);
        assert_eq!(collect(&pool, h1), [10]);
        assert_eq!(pool.free_head(), h2);

        let empty = pool.free_stack(h1);
        assert!(pool.is_empty(empty));
        assert_eq!(pool.free_head(), h1);
        assert_eq!(pool.free_len(), 2);

        let slots = pool.slots();
        let reused = pool.push(30, pool.new_stack());
        assert_eq!(reused, h1);
        assert_eq!(pool.slots(), slots);
        assert_eq!(pool.free_head(), h2);
    }

    #[test]
    fn iteration_is_reverse_push_order() {
        let mut pool = StackPool::<i32, u32>::new();
        let mut head = pool.new_stack();
        for i in 0..100 {
            head = pool.push(i, head);
        }
        let expected: Vec<i32> = (0..100).rev().collect();
        assert_eq!(collect(&pool, head), expected);
        assert_eq!(pool.iter(head).count(), 100);
        assert_eq!(pool.stack_len(head), 100);
    }

    #[test]
    fn pop_undoes_push() {
        let mut pool = StackPool::<i32>::new();
        let mut head = pool.new_stack();
        for i in 0..4 {
            head = pool.push(i, head);
        }
        let before = collect(&pool, head);

        let pushed = pool.push(99, head);
        assert_eq!(pool.pop(pushed), head);
        assert_eq!(collect(&pool, head), before);

        // The popped node is recycled by the next push.
        assert_eq!(pool.push(7, head), pushed);
    }

    #[test]
    fn pop_keeps_value_until_reuse() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        let b = pool.push(2, a);
        pool.pop(b);
        assert_eq!(pool.storage.node(b).value, 2);
    }

    #[test]
    fn free_list_is_lifo() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        let b = pool.push(2, pool.new_stack());
        let c = pool.push(3, pool.new_stack());

        pool.pop(a);
        pool.pop(c);
        pool.pop(b);

        let s = pool.new_stack();
        assert_eq!(pool.push(10, s), b);
        assert_eq!(pool.push(11, s), c);
        assert_eq!(pool.push(12, s), a);
        assert_eq!(pool.free_head(), pool.end());
    }

    #[test]
    fn free_stack_on_empty_is_noop() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        pool.pop(a);

        assert_eq!(pool.free_stack(pool.end()), pool.end());
        assert_eq!(pool.free_head(), a);
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    fn free_stack_prepends_chain_to_free_list() {
        let mut pool = StackPool::<i32>::new();
        let old = pool.push(0, pool.new_stack());
        pool.pop(old);

        let mut head = pool.new_stack();
        for i in 1..=3 {
            head = pool.push(i, head);
        }
        let chain = handles(&pool, head);
        assert_eq!(pool.free_head(), pool.end());

        let free = pool.push(4, pool.new_stack());
        pool.pop(free);

        assert_eq!(pool.free_stack(head), pool.end());
        assert_eq!(handles(&pool, pool.free_head())[..3], chain[..]);
        assert_eq!(pool.free_len(), 4);
    }

    #[test]
    fn freed_nodes_are_reused_before_growth() {
        let mut pool = StackPool::<i32>::new();
        let mut head = pool.new_stack();
        for i in 0..37 {
            head = pool.push(i, head);
        }
        let capacity = pool.capacity();
        let slots = pool.slots();

        head = pool.free_stack(head);
        for i in 0..slots as i32 {
            head = pool.push(i, head);
        }
        assert_eq!(pool.capacity(), capacity);
        assert_eq!(pool.slots(), slots);
        assert_eq!(pool.free_len(), 0);

        pool.push(0, head);
        assert_eq!(pool.slots(), slots + 1);
    }

    #[test]
    fn independent_stacks_are_disjoint() {
        let mut pool = StackPool::<i32>::new();
        let mut a = pool.new_stack();
        let mut b = pool.new_stack();
        for i in 0..3 {
            a = pool.push(i, a);
            if i < 2 {
                b = pool.push(100 + i, b);
            }
        }

        let ha: BTreeSet<usize> = handles(&pool, a).into_iter().collect();
        let hb: BTreeSet<usize> = handles(&pool, b).into_iter().collect();
        assert_eq!(ha.len(), 3);
        assert_eq!(hb.len(), 2);
        assert!(ha.is_disjoint(&hb));

        a = pool.free_stack(a);
        assert!(pool.is_empty(a));
        assert_eq!(collect(&pool, b), [101, 100]);

        // Reused nodes from `a` do not disturb `b`.
        let c = pool.push(7, pool.new_stack());
        assert!(ha.contains(&c));
        assert_eq!(collect(&pool, b), [101, 100]);
    }

    #[test]
    fn empty_access_reports_without_mutation() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        pool.pop(a);

        assert_eq!(pool.try_value(pool.end()), Err(StackError::EmptyValue));
        assert_eq!(pool.try_value_mut(0), Err(StackError::EmptyValue));
        assert_eq!(pool.try_pop(0), Err(StackError::EmptyPop));
        assert_eq!(pool.free_head(), a);
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.slots(), 1);
    }

    #[test]
    fn empty_pop_panics_once_and_leaves_pool_intact() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());

        let result = catch_unwind(AssertUnwindSafe(|| pool.pop(0)));
        assert!(result.is_err());
        assert_eq!(pool.free_head(), 0);
        assert_eq!(collect(&pool, a), [1]);
    }

    #[test]
    #[should_panic(expected = "Trying to get value from an invalid stack")]
    fn value_of_empty_panics() {
        let pool = StackPool::<i32>::new();
        pool.value(pool.end());
    }

    #[test]
    #[should_panic(expected = "Trying to pop from an empty stack")]
    fn pop_of_empty_panics() {
        let mut pool = StackPool::<i32>::new();
        let empty = pool.new_stack();
        pool.pop(empty);
    }

    #[test]
    #[should_panic(expected = "does not fit in the handle type")]
    fn push_past_handle_range_panics() {
        let mut pool = StackPool::<(), u8>::new();
        let mut head = pool.new_stack();
        for _ in 0..=u8::MAX as usize {
            head = pool.push((), head);
        }
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "debug"))]
    #[should_panic(expected = "stale handle")]
    fn stale_handle_is_caught() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        let b = pool.push(2, a);
        pool.free_stack(b);
        pool.value(a);
    }

    #[test]
    fn value_mut_and_index_mut() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        *pool.value_mut(a) += 1;
        pool[a] *= 10;
        assert_eq!(pool[a], 20);
    }

    #[test]
    fn next_mut_relinks() {
        let mut pool = StackPool::<i32>::new();
        let a = pool.push(1, pool.new_stack());
        let b = pool.push(2, a);
        let c = pool.push(3, pool.new_stack());

        // Cut `a` out of `b` and graft `c` in its place.
        *pool.next_mut(b) = c;
        assert_eq!(collect(&pool, b), [2, 3]);
        assert_eq!(collect(&pool, a), [1]);
    }

    #[test]
    fn clone_is_independent() {
        let mut pool = StackPool::<i32>::new();
        let mut head = pool.new_stack();
        for i in 0..5 {
            head = pool.push(i, head);
        }
        let popped = pool.pop(head);

        let mut copy = pool.clone();
        assert_eq!(collect(&copy, popped), collect(&pool, popped));
        assert_eq!(copy.free_head(), pool.free_head());

        copy.for_each_mut(popped, |v| *v = -1);
        copy.free_stack(popped);
        assert_eq!(collect(&pool, popped), [3, 2, 1, 0]);
        assert_eq!(pool.free_len(), 1);
        assert_eq!(copy.free_len(), 5);
    }

    #[test]
    fn debug_format() {
        let mut pool = StackPool::<i32>::with_capacity(4);
        let a = pool.push(1, pool.new_stack());
        pool.push(2, a);
        pool.pop(a);

        let text = alloc::format!("{pool:?}");
        assert!(text.starts_with("StackPool {"));
        assert!(text.contains("slots: 2"));
        assert!(text.contains("free: 1"));
    }
}
