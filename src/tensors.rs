//! Core tensor data structures.
//!
//! # Strided Tensors
//!
//! A tensor is a flat `f32` buffer plus a shape. Element offsets are derived
//! from row-major strides which are precomputed whenever a shape is set, so
//! indexing any rank is a single dot product of the index with the strides.
//!
//! Two types share that representation:
//!
//! - [`TensorBuf`] owns its buffer exclusively and may be mutated in place.
//! - [`Tensor`] is a shared, immutable handle. Cloning it is cheap and every
//!   holder sees the same values forever.
//!
//! Crossing from shared to owned is always explicit: [`Tensor::to_mutable`]
//! deep-copies, [`Tensor::into_mutable`] copies only if another holder still
//! exists. A layer updating its weights can therefore never change a tensor
//! that somebody else is reading.
//!
//! ## Example
//!
//! ```rust
//! use neural_ff::tensors::TensorBuf;
//!
//! let mut t = TensorBuf::with_data([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.strides(), &[3, 1]);
//! assert_eq!(t.at(&[1, 0]).unwrap(), 4.0);
//!
//! t.set_at(&[1, 0], 9.0).unwrap();
//! let shared = t.freeze();
//! assert_eq!(shared.at(&[1, 0]).unwrap(), 9.0);
//! assert_eq!(shared.shape_str(), "2x3");
//! ```

use std::ops::Deref;
use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Error, Result};

/// Formats a shape as `d0xd1x...xdn`, e.g. `4x32x32x3`.
#[must_use]
pub fn shape_str(shape: &[usize]) -> String {
    shape
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("x")
}

/// Computes row-major strides and the total element count of `shape`.
///
/// `strides[i]` is the product of every dimension after `i`; the last stride
/// is always 1. Fails if any partial product overflows.
fn layout(shape: &[usize]) -> Result<(Vec<usize>, usize)> {
    let overflow = || Error::ShapeOverflow {
        shape: shape_str(shape),
    };

    let mut strides = vec![1usize; shape.len()];
    let mut size = 1usize;
    for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
        *stride = size;
        size = size.checked_mul(dim).ok_or_else(overflow)?;
    }
    Ok((strides, size))
}

/// An exclusively-owned, mutable N-dimensional tensor of `f32`.
///
/// Invariants, held by every constructor:
///
/// - `data.len() == shape.iter().product()`
/// - `strides.len() == shape.len()`
/// - `strides[i] == shape[i + 1..].iter().product()`
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBuf {
    shape: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<f32>,
}

impl TensorBuf {
    /// Creates a zero-filled tensor.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn new(shape: impl Into<Vec<usize>>) -> Result<Self> {
        Self::with_data(shape, Vec::new())
    }

    /// Creates a tensor holding `data`.
    ///
    /// The buffer is resized to exactly the element count of `shape`: extra
    /// values are dropped and missing ones are zero. Callers are expected to
    /// pass correctly sized data; the resize only keeps the invariant intact.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn with_data(shape: impl Into<Vec<usize>>, mut data: Vec<f32>) -> Result<Self> {
        let shape = shape.into();
        let (strides, size) = layout(&shape)?;
        data.resize(size, 0.0);
        Ok(Self {
            shape,
            strides,
            data,
        })
    }

    /// Creates a tensor with every element set to `value`.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn constant(shape: impl Into<Vec<usize>>, value: f32) -> Result<Self> {
        let mut t = Self::new(shape)?;
        t.set_all(value);
        Ok(t)
    }

    /// Creates a zero-filled tensor. Same as [`TensorBuf::new`].
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Result<Self> {
        Self::new(shape)
    }

    /// Creates a tensor filled with ones.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn ones(shape: impl Into<Vec<usize>>) -> Result<Self> {
        Self::constant(shape, 1.0)
    }

    /// Creates a tensor sampled from a normal distribution.
    ///
    /// # Surprising semantics
    ///
    /// The two parameters are the **mean and standard deviation** of the
    /// distribution, not a `[min, max]` range. Older callers passed
    /// `(min, max)` pairs such as `(-0.01, 0.01)`; those keep producing the
    /// same statistics (mean `-0.01`, standard deviation `0.01`), which weight
    /// initialisation relies on.
    ///
    /// Values are drawn in row-major order from `rng`, so a seeded generator
    /// gives reproducible tensors.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    /// - [`Error::InvalidDistribution`] if `std_dev` is negative or not finite.
    pub fn random<R: Rng + ?Sized>(
        shape: impl Into<Vec<usize>>,
        mean: f32,
        std_dev: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let invalid = || Error::InvalidDistribution { mean, std_dev };
        // `Normal::new` accepts a negative std_dev and mirrors the samples
        if !(std_dev >= 0.0 && std_dev.is_finite()) {
            log::error!("{}", invalid());
            return Err(invalid());
        }
        let normal = Normal::new(mean, std_dev).map_err(|_| invalid())?;
        let mut t = Self::new(shape)?;
        for value in &mut t.data {
            *value = normal.sample(rng);
        }
        Ok(t)
    }

    /// Builds a tensor from a literal; used by [`tensor!`](crate::tensor).
    ///
    /// # Panics
    ///
    /// Panics if the literal's shape overflows, which a literal cannot do.
    #[doc(hidden)]
    #[must_use]
    pub fn from_literal(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "tensor literal {} has {} elements",
            shape_str(&shape),
            data.len()
        );
        match Self::with_data(shape, data) {
            Ok(t) => t,
            Err(e) => panic!("invalid tensor literal: {e}"),
        }
    }

    /// Converts into a shared immutable [`Tensor`] without copying.
    #[must_use]
    pub fn freeze(self) -> Tensor {
        Tensor(Arc::new(self))
    }

    /// Dimension sizes.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major strides, one per dimension.
    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The shape formatted as `d0xd1x...`.
    #[must_use]
    pub fn shape_str(&self) -> String {
        shape_str(&self.shape)
    }

    /// The flat row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The flat row-major buffer, writable.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Sets every element to `value`.
    pub fn set_all(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Flat buffer offset of `index`: `sum(index[i] * strides[i])`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexRank`] if `index.len() != self.rank()`.
    /// - [`Error::IndexOutOfBounds`] if any `index[i] >= shape[i]`.
    pub fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.shape.len() {
            return Err(Error::IndexRank {
                index: shape_str(index),
                shape: self.shape_str(),
                expected: self.shape.len(),
                got: index.len(),
            });
        }

        for (axis, (&coord, &size)) in index.iter().zip(&self.shape).enumerate() {
            if coord >= size {
                return Err(Error::IndexOutOfBounds {
                    index: shape_str(index),
                    shape: self.shape_str(),
                    axis,
                    coord,
                    size,
                });
            }
        }

        Ok(index
            .iter()
            .zip(&self.strides)
            .map(|(coord, stride)| coord * stride)
            .sum())
    }

    /// Reads the element at `index`.
    ///
    /// # Errors
    ///
    /// See [`TensorBuf::offset`].
    pub fn at(&self, index: &[usize]) -> Result<f32> {
        Ok(self.data[self.offset(index)?])
    }

    /// Writes `value` at `index`.
    ///
    /// # Errors
    ///
    /// See [`TensorBuf::offset`].
    pub fn set_at(&mut self, index: &[usize], value: f32) -> Result<()> {
        let offset = self.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }
}

/// A shared, immutable tensor handle.
///
/// Dereferences to [`TensorBuf`] for every read-only operation. There is no
/// way to obtain `&mut TensorBuf` from it; use [`Tensor::to_mutable`] or
/// [`Tensor::into_mutable`] to get an owned copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor(Arc<TensorBuf>);

impl Tensor {
    /// Returns an exclusively-owned deep copy.
    #[must_use]
    pub fn to_mutable(&self) -> TensorBuf {
        TensorBuf::clone(&self.0)
    }

    /// Takes the buffer out of the handle, copying only if it is still shared.
    #[must_use]
    pub fn into_mutable(self) -> TensorBuf {
        Arc::unwrap_or_clone(self.0)
    }

    /// Whether both handles point at the same buffer.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Tensor {
    type Target = TensorBuf;

    fn deref(&self) -> &TensorBuf {
        &self.0
    }
}

impl AsRef<TensorBuf> for Tensor {
    fn as_ref(&self) -> &TensorBuf {
        &self.0
    }
}

impl AsRef<TensorBuf> for TensorBuf {
    fn as_ref(&self) -> &TensorBuf {
        self
    }
}

impl From<TensorBuf> for Tensor {
    fn from(buf: TensorBuf) -> Self {
        buf.freeze()
    }
}

impl PartialEq<TensorBuf> for Tensor {
    fn eq(&self, other: &TensorBuf) -> bool {
        *self.0 == *other
    }
}

impl PartialEq<Tensor> for TensorBuf {
    fn eq(&self, other: &Tensor) -> bool {
        *self == *other.0
    }
}

/// Defines a [`TensorBuf`] from nested literal arrays.
///
/// Supports arbitrary rank as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use neural_ff::tensor;
/// let t = tensor!([[1.0, -2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.data(), &[1.0, -2.0, 3.0, 4.0]);
/// ```
///
/// # Panics
///
/// Panics on ragged literals.
#[macro_export]
macro_rules! tensor {
    ([ $( $x:literal ),+ $(,)? ]) => {{
        let data: ::std::vec::Vec<f32> = ::std::vec![$( $x as f32 ),+];
        $crate::tensors::TensorBuf::from_literal(::std::vec![data.len()], data)
    }};

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let children = ::std::vec![ $( $crate::tensor!($inner) ),+ ];
        let first_shape = children[0].shape().to_vec();
        assert!(
            children.iter().all(|c| c.shape() == first_shape.as_slice()),
            "ragged tensor literal (rows have mismatched shapes)"
        );
        let mut shape = ::std::vec![children.len()];
        shape.extend_from_slice(&first_shape);
        let mut data = ::std::vec::Vec::with_capacity(children.len() * children[0].size());
        for c in &children {
            data.extend_from_slice(c.data());
        }
        $crate::tensors::TensorBuf::from_literal(shape, data)
    }};

    ($lit:literal) => {
        $crate::tensors::TensorBuf::from_literal(::std::vec::Vec::new(), ::std::vec![$lit as f32])
    };
}
