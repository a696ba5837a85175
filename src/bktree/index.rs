use std::fmt;

use crate::bktree::neighbor::Neighbor;
use crate::bktree::traversal::{IntoIter, Iter};
use crate::bktree::Node;
use crate::distance::DistanceFunction;
use crate::error::{BKIndexError, Result};
use crate::r#type::DiscreteDistance;

/// A [BK-tree](https://en.wikipedia.org/wiki/BK-tree): a set over a discrete metric space that
/// answers "which elements lie within distance `r` of this one?" without scanning every element.
///
/// The tree holds no duplicates: two elements at distance zero from each other are the same
/// element, and adding the second one is a no-op. Note that this holds even for values that are
/// distinguishable by other means, so a distance function that maps distinct values to zero makes
/// the tree silently keep only the first of them.
///
/// Elements cannot be removed. The shape of the tree depends on insertion order and is never
/// rebalanced.
///
/// This type has no internal synchronization. Mutating methods take `&mut self`; share a tree
/// that is still being built behind a lock.
///
/// ```
/// use bk_index::distance::AbsoluteDifference;
/// use bk_index::BKTree;
///
/// let tree = BKTree::with_elements(AbsoluteDifference, [1, 3, 5, 7, 9, 11, 13]).unwrap();
///
/// let neighbors = tree.nearest_neighbors(&5, 2);
/// assert_eq!(neighbors.len(), 3);
/// assert_eq!(*neighbors[0].value, 5);
/// ```
pub struct BKTree<E, F> {
    root: Option<Node<E>>,
    distance_function: F,
    len: usize,
}

impl<E, F> BKTree<E, F> {
    /// Create an empty tree that measures distances with `distance_function`.
    pub fn new(distance_function: F) -> Self {
        Self {
            root: None,
            distance_function,
            len: 0,
        }
    }

    /// The number of elements in this tree.
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.root.is_none(), self.len == 0);
        self.len
    }

    /// Returns `true` if this tree contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Remove all elements from this tree.
    ///
    /// Previously exported snapshots (e.g. from [`to_vec`][Self::to_vec]) are unaffected.
    pub fn clear(&mut self) {
        tracing::debug!(discarded = self.len, "clearing BK-tree");
        self.discard_nodes();
    }

    /// The distance function used by this tree.
    pub fn distance_function(&self) -> &F {
        &self.distance_function
    }

    /// Access the root node of this tree for manual traversal.
    pub fn root(&self) -> Option<&Node<E>> {
        self.root.as_ref()
    }

    /// Iterate over all elements in this tree. The order of elements is not defined.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter::with_len(self.root.as_ref(), self.len)
    }

    /// Copy all elements of this tree into a new vector. The order of elements is not defined.
    ///
    /// The vector is independent of the tree.
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        let mut elements = Vec::with_capacity(self.len);
        elements.extend(self.iter().cloned());
        elements
    }

    fn discard_nodes(&mut self) {
        // Dropping through the owning iterator tears the tree down without recursion.
        drop(IntoIter::new(self.root.take(), self.len));
        self.len = 0;
    }
}

impl<E, F: DistanceFunction<E>> BKTree<E, F> {
    /// Create a tree that measures distances with `distance_function` and holds the given
    /// elements.
    ///
    /// Fails with [`BKIndexError::InvalidArgument`] if any element cannot be placed in the tree.
    pub fn with_elements<I>(distance_function: F, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
    {
        let mut tree = Self::new(distance_function);
        tree.add_all(elements)?;
        tracing::debug!(elements = tree.len, "built BK-tree");
        Ok(tree)
    }

    /// Add `value` to this tree if it is not already present.
    ///
    /// Returns `Ok(true)` if the tree did not contain `value`, and `Ok(false)` if an element at
    /// distance zero from it was already stored.
    ///
    /// Fails with [`BKIndexError::InvalidArgument`] if the distance function reports a negative
    /// distance between `value` and a stored element, or one too large to key a child (see
    /// [`DiscreteDistance::to_key`]). The tree is unchanged in that case.
    pub fn add(&mut self, value: E) -> Result<bool> {
        let added = match self.root.as_mut() {
            Some(root) => root.add(value, &self.distance_function)?,
            None => {
                self.root = Some(Node::new(value));
                true
            }
        };
        if added {
            self.len += 1;
        }
        Ok(added)
    }

    /// Add every element of `values` in iteration order.
    ///
    /// Returns `Ok(true)` if at least one element was not already present. Stops at the first
    /// element that cannot be placed; elements before it stay in the tree.
    pub fn add_all<I>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = E>,
    {
        let mut added_any = false;
        for value in values {
            added_any |= self.add(value)?;
        }
        Ok(added_any)
    }

    /// Returns `true` if this tree contains an element at distance zero from `value`.
    pub fn contains(&self, value: &E) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.contains(value, &self.distance_function))
    }

    /// Returns `true` if this tree contains every element of `values`.
    pub fn contains_all<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        values.into_iter().all(|value| self.contains(value))
    }

    /// All elements within `radius` of `query`, as measured by this tree's distance function.
    ///
    /// Elements are included if their distance from `query` is less than *or equal to* `radius`.
    /// Results are sorted by increasing distance; the order among elements at the same distance
    /// is undefined. A negative `radius` matches nothing.
    pub fn nearest_neighbors(
        &self,
        query: &E,
        radius: F::Distance,
    ) -> Vec<Neighbor<'_, E, F::Distance>> {
        let mut results = vec![];
        let Some(root) = self.root.as_ref() else {
            return results;
        };
        if radius.is_negative() {
            return results;
        }

        let visited = root.nearest_neighbors(query, radius, &mut results, &self.distance_function);
        tracing::trace!(
            visited,
            stored = self.len,
            matches = results.len(),
            "BK-tree radius query"
        );

        results.sort_unstable_by(Neighbor::cmp_distance);
        results
    }

    /// Answer a radius query for each of `queries` in parallel.
    ///
    /// The `i`-th result holds the neighbors of `queries[i]`, as returned by
    /// [`nearest_neighbors`][Self::nearest_neighbors].
    #[cfg(feature = "rayon")]
    pub fn par_nearest_neighbors_batch(
        &self,
        queries: &[E],
        radius: F::Distance,
    ) -> Vec<Vec<Neighbor<'_, E, F::Distance>>>
    where
        E: Sync,
        F: Sync,
    {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map(|query| self.nearest_neighbors(query, radius))
            .collect()
    }

    /// Unsupported; elements may not be removed from a BK-tree.
    ///
    /// Always fails with [`BKIndexError::UnsupportedOperation`].
    pub fn remove(&mut self, _value: &E) -> Result<bool> {
        Err(BKIndexError::UnsupportedOperation("remove"))
    }

    /// Unsupported; elements may not be removed from a BK-tree.
    ///
    /// Always fails with [`BKIndexError::UnsupportedOperation`].
    pub fn remove_all<'a, I>(&mut self, _values: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        Err(BKIndexError::UnsupportedOperation("remove_all"))
    }

    /// Unsupported; elements may not be removed from a BK-tree.
    ///
    /// Always fails with [`BKIndexError::UnsupportedOperation`].
    pub fn retain_all<'a, I>(&mut self, _values: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        Err(BKIndexError::UnsupportedOperation("retain_all"))
    }
}

impl<E, F> Drop for BKTree<E, F> {
    fn drop(&mut self) {
        self.discard_nodes();
    }
}

impl<E: Clone, F: Clone> Clone for BKTree<E, F> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.as_ref().map(Node::clone_subtree),
            distance_function: self.distance_function.clone(),
            len: self.len,
        }
    }
}

impl<E: fmt::Debug, F> fmt::Debug for BKTree<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, E, F> IntoIterator for &'a BKTree<E, F> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E, F> IntoIterator for BKTree<E, F> {
    type Item = E;
    type IntoIter = IntoIter<E>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = std::mem::take(&mut self.len);
        IntoIter::new(self.root.take(), len)
    }
}
