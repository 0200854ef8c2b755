//! An immutable k-d tree over points of any dimension, with exact and approximate nearest
//! neighbor, radius and box queries.

#![warn(missing_docs)]

mod batch;
mod builder;
mod geo;
mod index;
mod knn;
mod radius;
mod range;
mod split;
mod traversal;

pub use builder::{KDTreeBuilder, DEFAULT_LEAF_SIZE};
pub use index::{KDTree, KDTreeMetadata};
pub use split::Splitter;
pub use traversal::Node;
