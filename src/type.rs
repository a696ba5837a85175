use std::fmt::Debug;

use num_traits::{PrimInt, ToPrimitive};

/// A trait for types that can be used as distances between elements of a BK-tree.
///
/// This trait is sealed and cannot be implemented for external types. Children are keyed by
/// distance, so the tree needs a lossless mapping from each distance onto a `usize` slot, which
/// only the primitive integers provide.
pub trait DiscreteDistance:
    private::Sealed + PrimInt + ToPrimitive + Debug + Default + Send + Sync
{
    /// The child slot for this distance.
    ///
    /// Returns `None` if the distance is negative or does not fit into a `usize` (e.g. a `u128`
    /// distance, or a `u64` distance on a 32-bit target). Every child of a node is keyed by exactly
    /// this value, so such distances cannot be stored.
    #[inline]
    fn to_key(self) -> Option<usize> {
        if self < Self::zero() {
            None
        } else {
            self.to_usize()
        }
    }

    /// The child slot for this distance, clamped to `usize::MAX`. `None` if negative.
    ///
    /// Queries use this to bound the range of child keys worth visiting: a clamped key still
    /// covers every key that can exist in the tree.
    #[inline]
    fn to_saturating_key(self) -> Option<usize> {
        if self < Self::zero() {
            None
        } else {
            Some(self.to_usize().unwrap_or(usize::MAX))
        }
    }

    /// Returns `true` if this distance is below zero.
    #[inline]
    fn is_negative(self) -> bool {
        self < Self::zero()
    }
}

impl DiscreteDistance for i8 {}
impl DiscreteDistance for u8 {}
impl DiscreteDistance for i16 {}
impl DiscreteDistance for u16 {}
impl DiscreteDistance for i32 {}
impl DiscreteDistance for u32 {}
impl DiscreteDistance for i64 {}
impl DiscreteDistance for u64 {}
impl DiscreteDistance for isize {}
impl DiscreteDistance for usize {}
impl DiscreteDistance for i128 {}
impl DiscreteDistance for u128 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for isize {}
    impl Sealed for usize {}
    impl Sealed for i128 {}
    impl Sealed for u128 {}
}
