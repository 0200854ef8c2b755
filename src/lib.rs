#![doc = include_str!("../README.md")]

mod buffer;
mod error;
pub mod indices;
pub mod kdtree;
pub mod metric;
mod neighbor;
mod points;
mod r#type;

pub use buffer::ResultBuffer;
pub use error::{PointIndexError, Result};
pub use neighbor::{sort_neighbors, Neighbor};
pub use points::{flatten_rows, PointSet};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
