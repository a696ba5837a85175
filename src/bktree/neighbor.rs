use std::cmp::Ordering;

use crate::r#type::DiscreteDistance;

/// An element found by a radius query, together with its distance from the query.
#[derive(Debug)]
pub struct Neighbor<'a, E, D> {
    /// The stored element.
    pub value: &'a E,
    /// The distance between the query and `value`, exactly as the distance function reported it.
    ///
    /// A distance function may clamp distances that overflow its distance type; for example
    /// [`AbsoluteDifference`][crate::distance::AbsoluteDifference] reports `i32::MAX` between
    /// `i32::MIN` and `0`.
    pub distance: D,
}

impl<'a, E, D: DiscreteDistance> Neighbor<'a, E, D> {
    pub(crate) fn new(value: &'a E, distance: D) -> Self {
        Self { value, distance }
    }

    /// Order two neighbors by their distance from the query only.
    #[inline]
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance.cmp(&other.distance)
    }
}

impl<E, D: Copy> Clone for Neighbor<'_, E, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, D: Copy> Copy for Neighbor<'_, E, D> {}

impl<E: PartialEq, D: PartialEq> PartialEq for Neighbor<'_, E, D> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.value == other.value
    }
}

impl<E: Eq, D: Eq> Eq for Neighbor<'_, E, D> {}
