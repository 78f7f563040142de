//! Scalar loss functions.
//!
//! A loss maps a scalar prediction and its target to a scalar error
//! (`forward`) and to the derivative of that error with respect to the
//! prediction (`backward`). The derivative seeds the network's backward pass.

/// Squared error: `(prediction - target)^2`.
///
/// # Example
///
/// ```rust
/// use neural_ff::loss::SquaredError;
///
/// let loss = SquaredError;
/// assert_eq!(loss.forward(3.0, 1.0), 4.0);
/// assert_eq!(loss.backward(3.0, 1.0), 4.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredError;

impl SquaredError {
    /// Error of one prediction.
    #[must_use]
    pub fn forward(self, prediction: f32, target: f32) -> f32 {
        let diff = prediction - target;
        diff * diff
    }

    /// `d error / d prediction`.
    #[must_use]
    pub fn backward(self, prediction: f32, target: f32) -> f32 {
        2.0 * (prediction - target)
    }
}
