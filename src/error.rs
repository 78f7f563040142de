//! Crate-wide error type.
//!
//! Every failure the core can report is a programmer-contract violation:
//! a tensor of the wrong shape, an index outside its tensor, or an update
//! requested before any gradient was recorded. They are returned as
//! [`Error`] and never retried; callers usually just propagate them with `?`.
//!
//! [`Error::kind`] folds the detailed variants into the three coarse
//! [`ErrorKind`]s so callers can branch without matching on every variant.

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rank or dimension mismatch, including size overflow.
    Shape,
    /// Index rank mismatch or out-of-bounds coordinate.
    Index,
    /// Operation invalid for the current state of a layer.
    State,
}

/// All errors produced by tensor construction, tensor math and layers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The element count of a shape does not fit in `usize`.
    #[error("shape {shape} overflows the addressable element count")]
    ShapeOverflow {
        /// The offending shape, `d0xd1x...`.
        shape: String,
    },

    /// An operation that only accepts matrices was given another rank.
    #[error("{op} requires a matrix, got rank {rank} tensor of shape {shape}")]
    NotAMatrix {
        /// Operation that rejected the tensor.
        op: &'static str,
        /// Rank actually received.
        rank: usize,
        /// Shape actually received.
        shape: String,
    },

    /// Inner dimensions of a matrix product disagree.
    #[error("{op}: inner dimensions must match, {lhs} * {rhs}")]
    InnerDimMismatch {
        /// Operation that rejected the operands.
        op: &'static str,
        /// Shape of the left operand.
        lhs: String,
        /// Shape of the right operand.
        rhs: String,
    },

    /// Two tensors that must share a shape do not.
    #[error("{op}: shape mismatch, expected {expected}, got {got}")]
    ShapeMismatch {
        /// Operation that compared the shapes.
        op: &'static str,
        /// Shape required.
        expected: String,
        /// Shape received.
        got: String,
    },

    /// Tried to drop a row or column from a dimension of size zero.
    #[error("{op}: nothing to remove from tensor of shape {shape}")]
    EmptyDimension {
        /// Operation that found nothing to remove.
        op: &'static str,
        /// Shape of the input.
        shape: String,
    },

    /// Normal distribution parameters were rejected.
    #[error("invalid normal distribution (mean {mean}, std_dev {std_dev})")]
    InvalidDistribution {
        /// Requested mean.
        mean: f32,
        /// Requested standard deviation.
        std_dev: f32,
    },

    /// The index has a different number of coordinates than the tensor has dimensions.
    #[error("index {index} has rank {got}, tensor {shape} has rank {expected}")]
    IndexRank {
        /// The index, `i0xi1x...`.
        index: String,
        /// Shape of the indexed tensor.
        shape: String,
        /// Tensor rank.
        expected: usize,
        /// Number of coordinates given.
        got: usize,
    },

    /// A coordinate is past the end of its dimension.
    #[error("index {index} out of bounds for tensor {shape}: @{axis}: {coord} >= {size}")]
    IndexOutOfBounds {
        /// The index, `i0xi1x...`.
        index: String,
        /// Shape of the indexed tensor.
        shape: String,
        /// First axis whose coordinate is too large.
        axis: usize,
        /// Coordinate given on that axis.
        coord: usize,
        /// Size of that axis.
        size: usize,
    },

    /// An average gradient was requested with nothing accumulated.
    #[error("no pending weight gradients; call backward before updating")]
    NoPendingGradients,
}

impl Error {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeOverflow { .. }
            | Self::NotAMatrix { .. }
            | Self::InnerDimMismatch { .. }
            | Self::ShapeMismatch { .. }
            | Self::EmptyDimension { .. }
            | Self::InvalidDistribution { .. } => ErrorKind::Shape,
            Self::IndexRank { .. } | Self::IndexOutOfBounds { .. } => ErrorKind::Index,
            Self::NoPendingGradients => ErrorKind::State,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
