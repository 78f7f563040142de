//! Forward/backward layers.
//!
//! A layer maps an input matrix to an output matrix ([`Layer::forward`]) and,
//! later, maps the gradient of the loss with respect to that output back to
//! the gradient with respect to the input ([`Layer::backward`]).
//!
//! # Calling contract
//!
//! `forward` and `backward` are called as a matched pair. The caller keeps
//! the tensor it passed to `forward` and hands the *same* tensor to
//! `backward`; layers cache nothing between the two calls. A learnable layer
//! records its parameter gradient during `backward` and applies it only when
//! asked to (see [`LinearLayer::update_weights`]).
//!
//! The pipeline composes a fixed set of layer kinds, so [`AnyLayer`] closes
//! them into one enum instead of boxing trait objects.

mod grad;
mod linear;
mod relu;

pub use self::grad::GradAccumulator;
pub use self::linear::LinearLayer;
pub use self::relu::ReluLayer;

use crate::error::Result;
use crate::tensors::{Tensor, TensorBuf};

/// Capability shared by every layer.
pub trait Layer {
    /// Computes the layer output for `input`.
    ///
    /// Pure in `input` and the current parameters.
    ///
    /// # Errors
    ///
    /// Shape errors when `input` does not fit the layer.
    fn forward(&self, input: &TensorBuf) -> Result<Tensor>;

    /// Returns the gradient with respect to the layer input.
    ///
    /// `original_input` must be the tensor given to the matching
    /// [`forward`](Layer::forward) call, and `grad_output` the gradient of the
    /// loss with respect to that call's output. Learnable layers also record
    /// their parameter gradient here.
    ///
    /// # Errors
    ///
    /// Shape errors when the tensors do not fit the layer or each other.
    fn backward(&mut self, original_input: &TensorBuf, grad_output: &TensorBuf) -> Result<Tensor>;
}

/// The closed set of layer kinds a network is built from.
#[derive(Debug, Clone)]
pub enum AnyLayer {
    /// Affine layer with trainable weights.
    Linear(LinearLayer),
    /// Rectified linear activation.
    Relu(ReluLayer),
}

impl AnyLayer {
    /// The learnable layer inside, if any.
    pub fn as_linear_mut(&mut self) -> Option<&mut LinearLayer> {
        match self {
            Self::Linear(layer) => Some(layer),
            Self::Relu(_) => None,
        }
    }

    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Relu(_) => "relu",
        }
    }
}

impl Layer for AnyLayer {
    fn forward(&self, input: &TensorBuf) -> Result<Tensor> {
        match self {
            Self::Linear(layer) => layer.forward(input),
            Self::Relu(layer) => layer.forward(input),
        }
    }

    fn backward(&mut self, original_input: &TensorBuf, grad_output: &TensorBuf) -> Result<Tensor> {
        match self {
            Self::Linear(layer) => layer.backward(original_input, grad_output),
            Self::Relu(layer) => layer.backward(original_input, grad_output),
        }
    }
}

impl From<LinearLayer> for AnyLayer {
    fn from(layer: LinearLayer) -> Self {
        Self::Linear(layer)
    }
}

impl From<ReluLayer> for AnyLayer {
    fn from(layer: ReluLayer) -> Self {
        Self::Relu(layer)
    }
}
