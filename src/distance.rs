//! Distance functions for BK-trees.
//!
//! A BK-tree only works with a distance function that turns its element type into a
//! [metric space](https://en.wikipedia.org/wiki/Metric_space):
//!
//! 1. d(x, y) ≥ 0
//! 2. d(x, y) = 0 if and only if x = y
//! 3. d(x, y) = d(y, x)
//! 4. d(x, z) ≤ d(x, y) + d(y, z)
//!
//! None of these properties are checked. A function that breaks them still builds a tree, but
//! radius queries on that tree may silently miss matches.
//!
//! Any closure of the form `Fn(&E, &E) -> D` is a distance function. This module also provides a
//! few common metrics.

use crate::r#type::DiscreteDistance;

/// A function that calculates the discrete distance between two elements.
pub trait DistanceFunction<E: ?Sized> {
    /// The integer type distances are measured in.
    type Distance: DiscreteDistance;

    /// Returns the discrete distance between `first` and `second`.
    fn distance(&self, first: &E, second: &E) -> Self::Distance;
}

impl<E: ?Sized, D: DiscreteDistance, F> DistanceFunction<E> for F
where
    F: Fn(&E, &E) -> D,
{
    type Distance = D;

    #[inline]
    fn distance(&self, first: &E, second: &E) -> D {
        self(first, second)
    }
}

/// Absolute difference between two integers.
///
/// The distance is measured in the element type itself. Differences that do not fit into that
/// type (e.g. between `i32::MIN` and `i32::MAX`) saturate at its maximum value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteDifference;

impl<N: DiscreteDistance> DistanceFunction<N> for AbsoluteDifference {
    type Distance = N;

    #[inline]
    fn distance(&self, first: &N, second: &N) -> N {
        let (low, high) = if first < second {
            (*first, *second)
        } else {
            (*second, *first)
        };
        high.checked_sub(&low).unwrap_or(N::max_value())
    }
}

/// Levenshtein edit distance between two strings.
///
/// Counts the minimum number of single-character insertions, deletions and substitutions needed
/// to turn one string into the other. Characters are Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Levenshtein;

impl<S: AsRef<str> + ?Sized> DistanceFunction<S> for Levenshtein {
    type Distance = usize;

    fn distance(&self, first: &S, second: &S) -> usize {
        levenshtein(first.as_ref(), second.as_ref())
    }
}

/// Hamming distance between two sequences.
///
/// Counts the positions at which the sequences differ. When the lengths differ, every item past
/// the end of the shorter sequence counts as a mismatch, which keeps the function a metric over
/// sequences of any length.
///
/// Works on slices, arrays and vectors of any `PartialEq` item, and on strings, which are compared
/// byte by byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hamming;

macro_rules! impl_hamming_for_slices {
    ($($ty:ty),+) => {
        $(
            impl<T: PartialEq> DistanceFunction<$ty> for Hamming {
                type Distance = usize;

                #[inline]
                fn distance(&self, first: &$ty, second: &$ty) -> usize {
                    hamming(&first[..], &second[..])
                }
            }
        )+
    };
}

impl_hamming_for_slices!([T], Vec<T>);

impl<'a, T: PartialEq> DistanceFunction<&'a [T]> for Hamming {
    type Distance = usize;

    #[inline]
    fn distance(&self, first: &&'a [T], second: &&'a [T]) -> usize {
        hamming(first, second)
    }
}

impl<T: PartialEq, const N: usize> DistanceFunction<[T; N]> for Hamming {
    type Distance = usize;

    #[inline]
    fn distance(&self, first: &[T; N], second: &[T; N]) -> usize {
        hamming(first, second)
    }
}

macro_rules! impl_hamming_for_strings {
    ($($ty:ty),+) => {
        $(
            impl DistanceFunction<$ty> for Hamming {
                type Distance = usize;

                #[inline]
                fn distance(&self, first: &$ty, second: &$ty) -> usize {
                    hamming(first.as_bytes(), second.as_bytes())
                }
            }
        )+
    };
}

impl_hamming_for_strings!(str, String);

impl<'a> DistanceFunction<&'a str> for Hamming {
    type Distance = usize;

    #[inline]
    fn distance(&self, first: &&'a str, second: &&'a str) -> usize {
        hamming(first.as_bytes(), second.as_bytes())
    }
}

fn hamming<T: PartialEq>(first: &[T], second: &[T]) -> usize {
    let mismatches = first
        .iter()
        .zip(second.iter())
        .filter(|(a, b)| a != b)
        .count();
    mismatches + first.len().abs_diff(second.len())
}

/// Two-row dynamic programming edit distance.
pub(crate) fn levenshtein(first: &str, second: &str) -> usize {
    if first == second {
        return 0;
    }

    let second: Vec<char> = second.chars().collect();
    if second.is_empty() {
        return first.chars().count();
    }

    let mut previous: Vec<usize> = (0..=second.len()).collect();
    let mut current = vec![0; second.len() + 1];

    for (i, a) in first.chars().enumerate() {
        current[0] = i + 1;
        for (j, b) in second.iter().enumerate() {
            let substitution = previous[j] + usize::from(a != *b);
            let insertion = current[j] + 1;
            let deletion = previous[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[second.len()]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn closures_are_distance_functions() {
        let difference = |a: &i32, b: &i32| (a - b).abs();
        assert_eq!(difference.distance(&17, &20), 3);
        assert_eq!(difference.distance(&20, &17), 3);
    }

    #[test]
    fn absolute_difference() {
        assert_eq!(AbsoluteDifference.distance(&5i32, &5), 0);
        assert_eq!(AbsoluteDifference.distance(&3i32, &-4), 7);
        assert_eq!(AbsoluteDifference.distance(&2u8, &250), 248);
        assert_eq!(AbsoluteDifference.distance(&i32::MIN, &i32::MAX), i32::MAX);
    }

    #[test]
    fn absolute_difference_saturates() {
        // the true distance 2^31 does not fit into i32
        assert_eq!(AbsoluteDifference.distance(&i32::MIN, &0), i32::MAX);
        assert_eq!(AbsoluteDifference.distance(&0, &i32::MIN), i32::MAX);
        // widen the element type to get exact distances
        assert_eq!(
            AbsoluteDifference.distance(&i64::from(i32::MIN), &0),
            1i64 << 31
        );
    }

    #[test]
    fn levenshtein_distances() {
        assert_eq!(Levenshtein.distance("", ""), 0);
        assert_eq!(Levenshtein.distance("", "abc"), 3);
        assert_eq!(Levenshtein.distance("abc", ""), 3);
        assert_eq!(Levenshtein.distance("kitten", "sitting"), 3);
        assert_eq!(Levenshtein.distance("flaw", "lawn"), 2);
        assert_eq!(Levenshtein.distance("exaple", "example"), 1);
        // characters, not bytes
        assert_eq!(Levenshtein.distance("café", "cafe"), 1);
        assert_eq!(
            Levenshtein.distance(&"sitting".to_string(), &"kitten".to_string()),
            3
        );
    }

    #[test]
    fn hamming_distances() {
        assert_eq!(Hamming.distance("karolin", "kathrin"), 3);
        assert_eq!(Hamming.distance(&[0u8, 1, 2], &[0u8, 1, 2]), 0);
        assert_eq!(Hamming.distance("abc", "abcde"), 2);
        assert_eq!(Hamming.distance(&vec![1u8, 2], &vec![2u8]), 2);
    }

    #[test]
    fn hamming_over_any_items() {
        let first: Vec<char> = "karolin".chars().collect();
        let second: Vec<char> = "kathrin".chars().collect();
        assert_eq!(Hamming.distance(&first, &second), 3);

        assert_eq!(Hamming.distance(&[1u32, 2, 3][..], &[1u32, 5][..]), 2);
        assert_eq!(Hamming.distance(&[0.5f64, 1.0], &[0.5f64, 2.0]), 1);
        assert_eq!(Hamming.distance(&"abc".to_string(), &"abd".to_string()), 1);
    }
}
