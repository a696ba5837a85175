use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::fmt;

use tinyvec::TinyVec;

use crate::bktree::neighbor::Neighbor;
use crate::bktree::traversal::Iter;
use crate::distance::DistanceFunction;
use crate::error::{BKIndexError, Result};
use crate::r#type::DiscreteDistance;

/// A node in a BK-tree.
///
/// Each node owns one element and the subtrees of its children. Every child is keyed by its exact
/// distance from this node's element, so a node never has two children at the same distance.
///
/// Nodes are only ever borrowed from a [`BKTree`][crate::BKTree]; clone the tree to get an owned
/// copy.
pub struct Node<E> {
    pub(crate) value: E,
    pub(crate) children: BTreeMap<usize, Node<E>>,
}

impl<E> Node<E> {
    pub(crate) fn new(value: E) -> Self {
        Self {
            value,
            children: BTreeMap::new(),
        }
    }

    /// The element stored in this node.
    pub fn value(&self) -> &E {
        &self.value
    }

    /// The children of this node with their distance from this node, in increasing distance order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = (usize, &Node<E>)> + '_ {
        self.children.iter().map(|(distance, child)| (*distance, child))
    }

    /// The child at exactly `distance` from this node, if any.
    pub fn child(&self, distance: usize) -> Option<&Node<E>> {
        self.children.get(&distance)
    }

    /// Returns `true` if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The number of elements in the subtree rooted at this node, including this node.
    ///
    /// This walks the whole subtree.
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order iterator over the elements of this subtree: this node first, then each child
    /// subtree in increasing distance order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter::new(Some(self))
    }

    /// Insert `value` below this node.
    ///
    /// Returns `Ok(false)` if an element at distance zero from `value` is already present.
    pub(crate) fn add<F>(&mut self, value: E, distance_function: &F) -> Result<bool>
    where
        F: DistanceFunction<E>,
    {
        let mut node = self;
        loop {
            let distance = distance_function.distance(&value, &node.value);
            let key = match distance.to_key() {
                Some(0) => return Ok(false),
                Some(key) => key,
                None if distance.is_negative() => {
                    tracing::warn!(?distance, "distance function returned a negative distance");
                    return Err(BKIndexError::InvalidArgument(format!(
                        "distance function returned negative distance {:?}",
                        distance
                    )));
                }
                None => {
                    tracing::warn!(?distance, "distance does not fit into a child key");
                    return Err(BKIndexError::InvalidArgument(format!(
                        "distance {:?} exceeds the largest child key {}",
                        distance,
                        usize::MAX
                    )));
                }
            };

            match node.children.entry(key) {
                Entry::Occupied(entry) => node = entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(Node::new(value));
                    return Ok(true);
                }
            }
        }
    }

    /// Returns `true` if an element at distance zero from `value` is stored below this node.
    pub fn contains<F>(&self, value: &E, distance_function: &F) -> bool
    where
        F: DistanceFunction<E>,
    {
        let mut node = self;
        loop {
            // A missing child at the routing distance means the value is absent.
            match distance_function.distance(value, &node.value).to_key() {
                Some(0) => return true,
                Some(key) => match node.children.get(&key) {
                    Some(child) => node = child,
                    None => return false,
                },
                None => return false,
            }
        }
    }

    /// Push every element of this subtree within `radius` of `query` into `results`.
    ///
    /// Only children whose key lies in `[d - radius, d + radius]`, where `d` is the distance from
    /// `query` to this node, are visited: by the triangle inequality no other subtree can hold a
    /// match. Results are emitted in no particular order.
    ///
    /// Returns the number of nodes visited.
    pub fn nearest_neighbors<'a, F, S>(
        &'a self,
        query: &E,
        radius: F::Distance,
        results: &mut S,
        distance_function: &F,
    ) -> usize
    where
        F: DistanceFunction<E>,
        S: Extend<Neighbor<'a, E, F::Distance>>,
    {
        let Some(radius_key) = radius.to_saturating_key() else {
            return 0;
        };

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Option<&'a Node<E>>; 32]> = TinyVec::new();
        stack.push(Some(self));

        let mut visited = 0;
        while let Some(Some(node)) = stack.pop() {
            visited += 1;

            let distance = distance_function.distance(query, &node.value);
            let Some(key) = distance.to_saturating_key() else {
                continue;
            };

            if distance <= radius {
                results.extend(std::iter::once(Neighbor::new(&node.value, distance)));
            }

            let min_key = key.saturating_sub(radius_key);
            let max_key = key.saturating_add(radius_key);
            for child in node.children.range(min_key..=max_key).map(|(_, child)| child) {
                stack.push(Some(child));
            }
        }

        visited
    }

    /// Deep copy of this subtree, built bottom-up with an explicit stack.
    pub(crate) fn clone_subtree(&self) -> Node<E>
    where
        E: Clone,
    {
        let mut root_children = BTreeMap::new();
        let mut root_pending = self.children.iter();
        let mut frames: Vec<CloneFrame<'_, E>> = vec![];

        loop {
            let next = match frames.last_mut() {
                Some(frame) => frame.pending.next(),
                None => root_pending.next(),
            };
            if let Some((&key, source)) = next {
                frames.push(CloneFrame {
                    key,
                    source,
                    pending: source.children.iter(),
                    children: BTreeMap::new(),
                });
                continue;
            }

            // All children of the top frame are copied
            let Some(frame) = frames.pop() else {
                return Node {
                    value: self.value.clone(),
                    children: root_children,
                };
            };
            let node = Node {
                value: frame.source.value.clone(),
                children: frame.children,
            };
            let siblings = match frames.last_mut() {
                Some(parent) => &mut parent.children,
                None => &mut root_children,
            };
            siblings.insert(frame.key, node);
        }
    }
}

struct CloneFrame<'a, E> {
    key: usize,
    source: &'a Node<E>,
    pending: btree_map::Iter<'a, usize, Node<E>>,
    children: BTreeMap<usize, Node<E>>,
}

/// Shows this node's element and the keys of its children, without descending into them.
impl<E: fmt::Debug> fmt::Debug for Node<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<usize> = self.children.keys().copied().collect();
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("children", &keys)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::Node;
    use crate::bktree::Neighbor;
    use crate::distance::AbsoluteDifference;
    use crate::error::BKIndexError;

    #[test]
    fn add_and_size() {
        let mut node = Node::new(17);

        assert_eq!(node.size(), 1);
        assert!(!node.add(17, &AbsoluteDifference).unwrap());
        assert_eq!(node.size(), 1);

        assert!(node.add(18, &AbsoluteDifference).unwrap());
        assert_eq!(node.size(), 2);
    }

    #[test]
    fn add_descends_into_existing_child() {
        let mut node = Node::new(10);
        node.add(13, &AbsoluteDifference).unwrap();
        // 7 is also 3 away from 10, so it lands below 13 at distance 6
        node.add(7, &AbsoluteDifference).unwrap();

        assert_eq!(node.children().count(), 1);
        let child = node.child(3).unwrap();
        assert_eq!(*child.value(), 13);
        assert_eq!(*child.child(6).unwrap().value(), 7);
        assert!(child.child(6).unwrap().is_leaf());
    }

    #[test]
    fn add_rejects_negative_distance() {
        let mut node = Node::new(1i32);
        let negative = |a: &i32, b: &i32| -(a - b).abs();
        assert!(node.add(5, &negative).is_err());
        assert_eq!(node.size(), 1);
    }

    #[test]
    fn contains() {
        let mut node = Node::new(17);

        assert!(node.contains(&17, &AbsoluteDifference));
        assert!(!node.contains(&18, &AbsoluteDifference));

        node.add(18, &AbsoluteDifference).unwrap();
        assert!(node.contains(&18, &AbsoluteDifference));
    }

    #[test]
    fn iter_visits_every_element_once() {
        let mut node = Node::new(17);
        for i in [17, 18, 19, 20, 21] {
            node.add(i, &AbsoluteDifference).unwrap();
        }

        let mut values: Vec<i32> = node.iter().copied().collect();
        assert_eq!(values.len(), 5);
        values.sort();
        assert_eq!(values, vec![17, 18, 19, 20, 21]);
    }

    #[test]
    fn iter_is_pre_order_by_distance() {
        let mut node = Node::new(10);
        for i in [14, 11, 12, 9] {
            node.add(i, &AbsoluteDifference).unwrap();
        }
        // 10 -> {1: 11 -> {2: 9}, 2: 12, 4: 14}
        let values: Vec<i32> = node.iter().copied().collect();
        assert_eq!(values, vec![10, 11, 9, 12, 14]);
    }

    #[test]
    fn nearest_neighbors() {
        let mut node = Node::new(1);
        for i in [2, 3, 17] {
            node.add(i, &AbsoluteDifference).unwrap();
        }

        let mut results: Vec<Neighbor<'_, i32, i32>> = vec![];
        node.nearest_neighbors(&2, 1, &mut results, &AbsoluteDifference);

        let mut values: Vec<i32> = results.iter().map(|n| *n.value).collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn add_rejects_distances_beyond_usize() {
        let mut node = Node::new(0u128);
        let huge = u128::from(u64::MAX) * 4;
        assert!(node.add(5, &AbsoluteDifference).unwrap());
        assert!(matches!(
            node.add(huge, &AbsoluteDifference),
            Err(BKIndexError::InvalidArgument(_))
        ));
        assert_eq!(node.size(), 2);
        assert!(!node.contains(&huge, &AbsoluteDifference));
    }

    #[test]
    fn huge_radius_reaches_every_child() {
        let mut node = Node::new(0u128);
        for i in [1, 2, 100] {
            node.add(i, &AbsoluteDifference).unwrap();
        }

        let mut results: Vec<Neighbor<'_, u128, u128>> = vec![];
        let radius = u128::from(u64::MAX) * 4;
        node.nearest_neighbors(&radius, radius, &mut results, &AbsoluteDifference);
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn debug_lists_child_keys_only() {
        let mut node = Node::new(10);
        for i in [14, 11, 12, 9] {
            node.add(i, &AbsoluteDifference).unwrap();
        }
        assert_eq!(
            format!("{:?}", node),
            "Node { value: 10, children: [1, 2, 4] }"
        );
    }

    #[test]
    fn clone_subtree_keeps_shape() {
        let mut node = Node::new(10);
        for i in [14, 11, 12, 9, 13, 20] {
            node.add(i, &AbsoluteDifference).unwrap();
        }

        let copy = node.clone_subtree();
        assert!(copy.iter().eq(node.iter()));
        assert_eq!(*copy.child(1).unwrap().child(2).unwrap().value(), 9);
        assert_eq!(
            copy.children().map(|(key, _)| key).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 10]
        );
    }

    #[test]
    fn nearest_neighbors_prunes_distant_children() {
        let mut node = Node::new(0);
        for i in [1, 2, 100, 101, 102] {
            node.add(i, &AbsoluteDifference).unwrap();
        }

        let mut results: Vec<Neighbor<'_, i32, i32>> = vec![];
        let visited = node.nearest_neighbors(&1, 1, &mut results, &AbsoluteDifference);
        assert_eq!(results.len(), 3);
        // the subtree at distance 100 is never entered
        assert_eq!(visited, 3);
    }
}
