//! Iterators over the elements of a BK-tree.
//!
//! Both iterators walk the tree in pre-order with an explicit stack, so arbitrarily deep trees
//! never exhaust the call stack.

use std::iter::FusedIterator;

use tinyvec::TinyVec;

use crate::bktree::Node;

/// A borrowing pre-order iterator over the elements of a BK-tree.
///
/// Each node is yielded before its children, and children are visited in increasing distance
/// order. No other ordering is promised.
#[derive(Debug, Clone)]
pub struct Iter<'a, E> {
    // Use TinyVec to avoid heap allocations for shallow trees
    stack: TinyVec<[Option<&'a Node<E>>; 32]>,
    remaining: Option<usize>,
}

impl<'a, E> Iter<'a, E> {
    pub(crate) fn new(root: Option<&'a Node<E>>) -> Self {
        let mut stack = TinyVec::new();
        if root.is_some() {
            stack.push(root);
        }
        Self {
            stack,
            remaining: None,
        }
    }

    /// An iterator that knows up front how many elements it will yield.
    pub(crate) fn with_len(root: Option<&'a Node<E>>, len: usize) -> Self {
        Self {
            remaining: Some(len),
            ..Self::new(root)
        }
    }
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop().flatten()?;
        // Note: pushed in reverse so that the closest child is popped first
        for (_, child) in node.children().rev() {
            self.stack.push(Some(child));
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (self.stack.len(), None),
        }
    }
}

impl<E> FusedIterator for Iter<'_, E> {}

/// An owning pre-order iterator over the elements of a BK-tree.
///
/// Yields elements in the same order as [`Iter`].
#[derive(Debug)]
pub struct IntoIter<E> {
    stack: Vec<Node<E>>,
    remaining: usize,
}

impl<E> IntoIter<E> {
    pub(crate) fn new(root: Option<Node<E>>, len: usize) -> Self {
        Self {
            stack: root.into_iter().collect(),
            remaining: len,
        }
    }
}

impl<E> Iterator for IntoIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        let Node { value, children } = self.stack.pop()?;
        self.stack.extend(children.into_values().rev());
        self.remaining = self.remaining.saturating_sub(1);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for IntoIter<E> {}

impl<E> FusedIterator for IntoIter<E> {}

impl<E> Drop for IntoIter<E> {
    fn drop(&mut self) {
        // Tear down the remaining subtrees one node at a time instead of through recursive drops.
        while let Some(node) = self.stack.pop() {
            self.stack.extend(node.children.into_values());
        }
    }
}
