//! An implementation of a BK-tree over a discrete metric space.

#![warn(missing_docs)]

mod index;
mod neighbor;
mod node;
pub mod traversal;

pub use index::BKTree;
pub use neighbor::Neighbor;
pub use node::Node;
