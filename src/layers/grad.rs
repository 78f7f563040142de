use crate::error::{Error, Result};
use crate::ops::dispatch;
use crate::tensors::{TensorBuf, shape_str};

/// Pending weight gradients of one layer, kept as a running sum.
///
/// Pushing `g1, g2, ..., gn` and then calling [`average`](Self::average)
/// yields `(((0 + g1) + g2) + ... + gn) / n`, the same value (in the same
/// summation order) as storing all `n` tensors and averaging them, without
/// holding `n` weight-sized buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct GradAccumulator {
    sum: TensorBuf,
    count: usize,
}

impl GradAccumulator {
    /// An empty accumulator for gradients of `shape`.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeOverflow`] if the element count does not fit in `usize`.
    pub fn new(shape: &[usize]) -> Result<Self> {
        Ok(Self {
            sum: TensorBuf::zeros(shape)?,
            count: 0,
        })
    }

    /// Adds one gradient.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if `grad` is not shaped like the accumulator.
    pub fn push(&mut self, grad: &TensorBuf) -> Result<()> {
        if grad.shape() != self.sum.shape() {
            return Err(Error::ShapeMismatch {
                op: "accumulate gradient",
                expected: self.sum.shape_str(),
                got: grad.shape_str(),
            });
        }
        dispatch::add_assign(self.sum.data_mut(), grad.data());
        self.count += 1;
        Ok(())
    }

    /// Elementwise mean of every pushed gradient.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingGradients`] if nothing was pushed since the last clear.
    pub fn average(&self) -> Result<TensorBuf> {
        if self.count == 0 {
            return Err(Error::NoPendingGradients);
        }
        let mut avg = self.sum.clone();
        #[allow(clippy::cast_precision_loss)]
        dispatch::div_assign(avg.data_mut(), self.count as f32);
        Ok(avg)
    }

    /// Forgets every pushed gradient.
    pub fn clear(&mut self) {
        self.sum.set_all(0.0);
        self.count = 0;
    }

    /// Number of gradients pushed since the last clear.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing was pushed since the last clear.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Shape every pushed gradient must have.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.sum.shape()
    }
}

impl std::fmt::Display for GradAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} pending x {}", self.count, shape_str(self.shape()))
    }
}
