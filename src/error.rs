use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Every error is raised by the call that received the offending input, before any output buffer
/// passed to that call is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointIndexError {
    /// A point set or a batch of queries contained no points.
    #[error("Input contains no points")]
    EmptyInput,

    /// A point had a different number of coordinates than the tree or the other operand.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A query or build parameter was out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A coordinate buffer could not be read as a rectangular n × d matrix.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, PointIndexError>;

/// Fail with [`PointIndexError::DimensionMismatch`] when `actual` differs from `expected`.
#[inline]
pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PointIndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
