#![doc = include_str!("../README.md")]

pub mod bktree;
pub mod distance;
mod error;
mod r#type;

pub use bktree::{BKTree, Neighbor, Node};
pub use distance::DistanceFunction;
pub use error::{BKIndexError, Result};
pub use r#type::DiscreteDistance;

#[cfg(test)]
pub(crate) mod test;
