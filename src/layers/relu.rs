use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::math::require_matrix;
use crate::ops::dispatch;
use crate::tensors::{Tensor, TensorBuf};

/// Rectified linear activation, `max(0, x)` elementwise.
///
/// Stateless: forward and backward read only their arguments.
///
/// # Gradient at zero
///
/// The gradient is blocked only where the original input was strictly
/// negative. At exactly zero it passes through unchanged.
///
/// # Example
///
/// ```rust
/// use neural_ff::layers::{Layer, ReluLayer};
/// use neural_ff::tensor;
///
/// let mut relu = ReluLayer::new();
/// let input = tensor!([[-1.0, 0.0, 2.0]]);
/// assert_eq!(relu.forward(&input).unwrap().data(), &[0.0, 0.0, 2.0]);
///
/// let grad = relu.backward(&input, &tensor!([[5.0, 6.0, 7.0]])).unwrap();
/// assert_eq!(grad.data(), &[0.0, 6.0, 7.0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReluLayer;

impl ReluLayer {
    /// Creates the activation.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Layer for ReluLayer {
    fn forward(&self, input: &TensorBuf) -> Result<Tensor> {
        require_matrix("ReluLayer::forward", input)?;
        let mut out = TensorBuf::zeros(input.shape())?;
        dispatch::relu(input.data(), out.data_mut());
        Ok(out.freeze())
    }

    fn backward(&mut self, original_input: &TensorBuf, grad_output: &TensorBuf) -> Result<Tensor> {
        require_matrix("ReluLayer::backward", grad_output)?;
        if original_input.shape() != grad_output.shape() {
            let err = Error::ShapeMismatch {
                op: "ReluLayer::backward",
                expected: original_input.shape_str(),
                got: grad_output.shape_str(),
            };
            log::error!("{err}");
            return Err(err);
        }
        let mut grad = TensorBuf::zeros(grad_output.shape())?;
        dispatch::relu_backward(original_input.data(), grad_output.data(), grad.data_mut());
        Ok(grad.freeze())
    }
}
