use core::fmt;
use core::iter::FusedIterator;
use core::ptr;

use crate::{StackIndex, StackPool};

// -----------------------------------------------------------------------------
// Iter

/// A forward iterator over one stack of a [`StackPool`], from top to bottom.
///
/// Created by [`StackPool::iter`]. Iterators are cheap to clone and never
/// affect each other, so the same head can seed as many walks as needed.
///
/// # Examples
///
/// ```
/// use sp_pool::StackPool;
///
/// let mut pool = StackPool::<char>::new();
/// let a = pool.push('a', pool.new_stack());
/// let b = pool.push('b', a);
///
/// let mut iter = pool.iter(b);
/// let copy = iter.clone();
/// assert_eq!(iter.next(), Some(&'b'));
/// assert_eq!(iter.handle(), a);
///
/// assert_eq!(copy.collect::<Vec<_>>(), [&'b', &'a']);
/// ```
pub struct Iter<'a, T, N: StackIndex = usize> {
    pool: &'a StackPool<T, N>,
    current: N,
}

impl<'a, T, N: StackIndex> Iter<'a, T, N> {
    #[inline]
    pub(crate) const fn new(pool: &'a StackPool<T, N>, head: N) -> Self {
        Self {
            pool,
            current: head,
        }
    }

    /// Returns the handle of the node the iterator will yield next.
    ///
    /// Returns the empty stack once the iterator is exhausted.
    #[inline]
    pub fn handle(&self) -> N {
        self.current
    }
}

impl<T, N: StackIndex> Clone for Iter<'_, T, N> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            current: self.current,
        }
    }
}

impl<'a, T, N: StackIndex> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_end() {
            return None;
        }
        let value = self.pool.value(self.current);
        self.current = self.pool.next(self.current);
        Some(value)
    }
}

impl<T, N: StackIndex> FusedIterator for Iter<'_, T, N> {}

/// Two iterators are equal if they walk the same pool and stand on the same node.
impl<T, N: StackIndex> PartialEq for Iter<'_, T, N> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.pool, other.pool) && self.current == other.current
    }
}

impl<T, N: StackIndex> Eq for Iter<'_, T, N> {}

impl<T, N: StackIndex> fmt::Debug for Iter<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("current", &self.current)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// CursorMut

/// A cursor over one stack of a [`StackPool`] that can modify values in place.
///
/// Created by [`StackPool::cursor_mut`]. Unlike [`Iter`], the cursor lends out
/// one value at a time, so it can hold the pool mutably.
///
/// # Examples
///
/// ```
/// use sp_pool::StackPool;
///
/// let mut pool = StackPool::<i32, u32>::new();
/// let a = pool.push(1, pool.new_stack());
/// let b = pool.push(2, a);
///
/// let mut cursor = pool.cursor_mut(b);
/// while let Some(value) = cursor.current_mut() {
///     *value += 100;
///     cursor.advance();
/// }
/// assert!(cursor.is_end());
///
/// assert!(pool.iter(b).eq(&[102, 101]));
/// ```
pub struct CursorMut<'a, T, N: StackIndex = usize> {
    pool: &'a mut StackPool<T, N>,
    current: N,
}

impl<'a, T, N: StackIndex> CursorMut<'a, T, N> {
    #[inline]
    pub(crate) const fn new(pool: &'a mut StackPool<T, N>, head: N) -> Self {
        Self {
            pool,
            current: head,
        }
    }

    /// Returns the handle of the node under the cursor.
    #[inline]
    pub fn handle(&self) -> N {
        self.current
    }

    /// Returns `true` once the cursor has walked past the bottom node.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current.is_end()
    }

    /// Returns the value under the cursor, or `None` at the end.
    #[inline]
    pub fn current(&self) -> Option<&T> {
        self.pool.try_value(self.current).ok()
    }

    /// Returns the value under the cursor mutably, or `None` at the end.
    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.pool.try_value_mut(self.current).ok()
    }

    /// Moves to the next node. Does nothing at the end.
    #[inline]
    pub fn advance(&mut self) {
        if !self.current.is_end() {
            self.current = self.pool.next(self.current);
        }
    }
}

impl<T, N: StackIndex> fmt::Debug for CursorMut<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("current", &self.current)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
