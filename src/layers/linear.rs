use std::borrow::Cow;

use crate::error::Result;
use crate::layers::{GradAccumulator, Layer};
use crate::math;
use crate::ops::dispatch;
use crate::tensors::{Tensor, TensorBuf};

/// A fully-connected layer: `y = [x | 1] × W`.
///
/// The bias is folded into the weights. With `has_bias` the weight matrix
/// gets one extra row (initialised to `1.0` and trained like any other row),
/// and every input gets a trailing column of `1.0` before the product.
///
/// # Parameter shapes
///
/// - weights: `[in_features + 1, out_features]` with bias,
///   `[in_features, out_features]` without
/// - input: `[batch, in_features]`
/// - output: `[batch, out_features]`
///
/// # Lifecycle
///
/// Each [`backward`](Layer::backward) appends one weight gradient;
/// [`update_weights`](Self::update_weights) applies their average and clears
/// them. The weights change nowhere else.
///
/// # Example
///
/// ```rust
/// use neural_ff::layers::{Layer, LinearLayer};
/// use neural_ff::tensor;
///
/// let mut layer = LinearLayer::new(&tensor!([[0.5], [0.25]]), true).unwrap();
/// let input = tensor!([[1.0, 1.0]]);
///
/// let out = layer.forward(&input).unwrap();
/// assert_eq!(out.data(), &[1.75]);
///
/// layer.backward(&input, &tensor!([[1.0]])).unwrap();
/// assert_eq!(layer.pending_gradients(), 1);
/// layer.update_weights(0.1).unwrap();
/// assert_eq!(layer.pending_gradients(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct LinearLayer {
    weights: TensorBuf,
    has_bias: bool,
    grads: GradAccumulator,
}

impl LinearLayer {
    /// Creates a layer from an `[in_features, out_features]` weight matrix.
    ///
    /// The weights are copied; the caller's tensor is never touched. With
    /// `has_bias` a row of `1.0` is appended to the copy.
    ///
    /// # Errors
    ///
    /// [`Error::NotAMatrix`](crate::Error::NotAMatrix) if `weights` is not rank 2.
    pub fn new(weights: &TensorBuf, has_bias: bool) -> Result<Self> {
        let weights = if has_bias {
            math::add_row(weights, 1.0)?.into_mutable()
        } else {
            math::require_matrix("LinearLayer::new", weights)?;
            weights.clone()
        };
        let grads = GradAccumulator::new(weights.shape())?;
        log::debug!(
            "linear layer {} (bias: {has_bias})",
            weights.shape_str()
        );
        Ok(Self {
            weights,
            has_bias,
            grads,
        })
    }

    /// Current weights, bias row included.
    #[must_use]
    pub const fn weights(&self) -> &TensorBuf {
        &self.weights
    }

    /// Whether a bias row is folded into the weights.
    #[must_use]
    pub const fn has_bias(&self) -> bool {
        self.has_bias
    }

    /// Width of the input this layer accepts.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.weights.shape()[0] - usize::from(self.has_bias)
    }

    /// Width of the output this layer produces.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Number of weight gradients recorded since the last update.
    #[must_use]
    pub const fn pending_gradients(&self) -> usize {
        self.grads.len()
    }

    /// Average of the weight gradients recorded since the last update.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingGradients`](crate::Error::NoPendingGradients) if none were recorded.
    pub fn calc_avg_weight_grad(&self) -> Result<Tensor> {
        Ok(self.grads.average()?.freeze())
    }

    /// Gradient descent step: `W -= learning_rate * avg_grad`, then clears
    /// the recorded gradients.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingGradients`](crate::Error::NoPendingGradients) if
    /// [`backward`](Layer::backward) was not called since the last update.
    /// The weights are left unchanged in that case.
    pub fn update_weights(&mut self, learning_rate: f32) -> Result<()> {
        let avg = self.grads.average()?;
        log::debug!("update {} from {}", self.weights.shape_str(), self.grads);
        dispatch::sub_scaled(self.weights.data_mut(), avg.data(), learning_rate);
        self.grads.clear();
        Ok(())
    }

    /// Appends the bias column when the layer has one.
    fn augment<'a>(&self, input: &'a TensorBuf) -> Result<Cow<'a, TensorBuf>> {
        if self.has_bias {
            Ok(Cow::Owned(math::add_col(input, 1.0)?.into_mutable()))
        } else {
            Ok(Cow::Borrowed(input))
        }
    }
}

impl Layer for LinearLayer {
    fn forward(&self, input: &TensorBuf) -> Result<Tensor> {
        let input = self.augment(input)?;
        math::multiply(&input, &self.weights)
    }

    fn backward(&mut self, original_input: &TensorBuf, grad_output: &TensorBuf) -> Result<Tensor> {
        // mirror the augmentation done in forward
        let input = self.augment(original_input)?;

        let input_t = math::transpose(&input)?;
        let grad_weights = math::multiply(&input_t, grad_output)?;
        self.grads.push(&grad_weights)?;

        let weights_t = math::transpose(&self.weights)?;
        let grad_input = math::multiply(grad_output, &weights_t)?;
        log::debug!(
            "linear backward: dW {} dX {}",
            grad_weights.shape_str(),
            grad_input.shape_str()
        );

        if self.has_bias {
            // the constant column has no upstream recipient
            math::remove_col(&grad_input)
        } else {
            Ok(grad_input)
        }
    }
}
