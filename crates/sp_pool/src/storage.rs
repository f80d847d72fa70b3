//! Contiguous node storage addressed by 1-based handles.
//!
//! Storage only ever grows by appending. Handles stay valid across growth,
//! references obtained from the storage do not.

use alloc::vec::Vec;

use crate::StackIndex;
use crate::cfg;
use crate::error::StackError;

// -----------------------------------------------------------------------------
// Node

/// A value plus the handle of the next node of whatever chain holds it.
#[derive(Clone)]
pub(crate) struct Node<T, N> {
    pub value: T,
    pub next: N,
    /// Set while the node sits on the free list.
    #[cfg(any(debug_assertions, feature = "debug"))]
    pub released: bool,
}

impl<T, N> Node<T, N> {
    #[inline]
    const fn new(value: T, next: N) -> Self {
        cfg::debug! {
            if { Self { value, next, released: false } }
            else { Self { value, next } }
        }
    }
}

// -----------------------------------------------------------------------------
// NodeStorage

#[derive(Clone)]
pub(crate) struct NodeStorage<T, N> {
    nodes: Vec<Node<T, N>>,
}

impl<T, N: StackIndex> NodeStorage<T, N> {
    #[inline]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Makes room for at least `n` nodes in total.
    pub fn reserve(&mut self, n: usize) {
        let capacity = self.nodes.capacity();
        if n > capacity {
            self.nodes.reserve(n - self.nodes.len());
            log::trace!(
                "node storage grown from {capacity} to {} slots",
                self.nodes.capacity()
            );
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of nodes ever created.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a fresh node and returns its handle.
    ///
    /// Nothing is appended if the new length does not fit in `N`.
    pub fn append(&mut self, value: T, next: N) -> Result<N, StackError> {
        let len = self.nodes.len() + 1;
        let Some(handle) = N::from_len(len) else {
            return Err(StackError::HandleOverflow { len });
        };
        self.nodes.push(Node::new(value, next));
        Ok(handle)
    }

    #[inline]
    pub fn node(&self, handle: N) -> &Node<T, N> {
        &self.nodes[handle.to_slot()]
    }

    #[inline]
    pub fn node_mut(&mut self, handle: N) -> &mut Node<T, N> {
        &mut self.nodes[handle.to_slot()]
    }
}

// -----------------------------------------------------------------------------
// Tests
