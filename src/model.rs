//! A sequential network of layers.
//!
//! [`Network`] runs the forward pass through its layers in order, keeping
//! every layer's input in a [`Pass`], then pushes a gradient back through the
//! same layers in reverse order using those saved inputs. That is the
//! forward/backward pairing every [`Layer`] expects from its caller.
//!
//! # Example
//!
//! ```rust
//! use neural_ff::model::{Network, TrainConfig};
//! use neural_ff::loss::SquaredError;
//! use neural_ff::rng::seeded_rng;
//! use neural_ff::tensor;
//!
//! let cfg = TrainConfig { hidden: 4, seed: Some(7), ..TrainConfig::default() };
//! let mut rng = seeded_rng(cfg.seed);
//! let mut net = Network::two_layer(2, 1, &cfg, &mut rng).unwrap();
//!
//! let input = tensor!([[0.5, -0.5]]).freeze();
//! let err = net.train_step(&input, 1.0, SquaredError, 0.01).unwrap();
//! assert!(err.is_finite());
//! ```

use rand::Rng;

use crate::error::{Error, Result};
use crate::layers::{AnyLayer, Layer, LinearLayer, ReluLayer};
use crate::loss::SquaredError;
use crate::tensors::{Tensor, TensorBuf};

/// Hyper-parameters of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Width of the hidden layer.
    pub hidden: usize,
    /// Gradient descent step size.
    pub learning_rate: f32,
    /// Passes over the dataset.
    pub epochs: usize,
    /// Mean of the normal distribution weights are drawn from.
    pub init_mean: f32,
    /// Standard deviation of the normal distribution weights are drawn from.
    pub init_std_dev: f32,
    /// Whether linear layers fold in a bias row.
    pub bias: bool,
    /// Number of examples averaged into each progress report.
    pub report_every: usize,
    /// Seed for weight initialisation; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            hidden: 300,
            learning_rate: 0.5,
            epochs: 10,
            init_mean: -0.01,
            init_std_dev: 0.01,
            bias: true,
            report_every: 100,
            seed: None,
        }
    }
}

/// Inputs saved by a forward pass, one per layer, plus the final output.
#[derive(Debug, Clone)]
pub struct Pass {
    inputs: Vec<Tensor>,
    output: Tensor,
}

impl Pass {
    /// Output of the last layer.
    #[must_use]
    pub const fn output(&self) -> &Tensor {
        &self.output
    }

    /// The input each layer received, in layer order.
    #[must_use]
    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }
}

/// An ordered pipeline of layers.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<AnyLayer>,
}

impl Network {
    /// Creates a network running `layers` in order.
    #[must_use]
    pub const fn new(layers: Vec<AnyLayer>) -> Self {
        Self { layers }
    }

    /// `Linear(inputs → hidden) → ReLU → Linear(hidden → outputs)`, with
    /// weights drawn from `Normal(cfg.init_mean, cfg.init_std_dev)`.
    ///
    /// # Errors
    ///
    /// Shape or distribution errors from weight construction.
    pub fn two_layer<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        cfg: &TrainConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let first = TensorBuf::random([inputs, cfg.hidden], cfg.init_mean, cfg.init_std_dev, rng)?;
        let second =
            TensorBuf::random([cfg.hidden, outputs], cfg.init_mean, cfg.init_std_dev, rng)?;

        Ok(Self::new(vec![
            LinearLayer::new(&first, cfg.bias)?.into(),
            ReluLayer::new().into(),
            LinearLayer::new(&second, cfg.bias)?.into(),
        ]))
    }

    /// The layers, in forward order.
    #[must_use]
    pub fn layers(&self) -> &[AnyLayer] {
        &self.layers
    }

    /// Runs every layer in order, saving each layer's input.
    ///
    /// # Errors
    ///
    /// The first error any layer returns.
    pub fn forward(&self, input: &Tensor) -> Result<Pass> {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut x = input.clone();
        for layer in &self.layers {
            let y = layer.forward(&x)?;
            inputs.push(x);
            x = y;
        }
        Ok(Pass { inputs, output: x })
    }

    /// Pushes `grad_output` back through every layer in reverse order.
    ///
    /// `pass` must come from [`forward`](Self::forward) on this network.
    /// Returns the gradient with respect to the network input.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if `pass` saved a different number of
    ///   inputs than this network has layers.
    /// - The first error any layer returns.
    pub fn backward(&mut self, pass: &Pass, grad_output: &Tensor) -> Result<Tensor> {
        if pass.inputs.len() != self.layers.len() {
            let err = Error::ShapeMismatch {
                op: "Network::backward",
                expected: format!("{} saved inputs", self.layers.len()),
                got: format!("{} saved inputs", pass.inputs.len()),
            };
            log::error!("{err}");
            return Err(err);
        }

        let mut grad = grad_output.clone();
        for (layer, input) in self.layers.iter_mut().zip(&pass.inputs).rev() {
            grad = layer.backward(input, &grad)?;
        }
        Ok(grad)
    }

    /// Applies the pending gradients of every learnable layer.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingGradients`] if a
    /// learnable layer has nothing to apply.
    pub fn update(&mut self, learning_rate: f32) -> Result<()> {
        for layer in &mut self.layers {
            if let Some(linear) = layer.as_linear_mut() {
                linear.update_weights(learning_rate)?;
            }
        }
        Ok(())
    }

    /// One example of stochastic gradient descent on a scalar output.
    ///
    /// Runs forward, scores output element `[0, 0]` against `target`, feeds
    /// the loss derivative back (zero for every other output element), and
    /// updates the weights. Returns the example's error.
    ///
    /// # Errors
    ///
    /// Any layer error, or an index error if the output is empty.
    pub fn train_step(
        &mut self,
        input: &Tensor,
        target: f32,
        loss: SquaredError,
        learning_rate: f32,
    ) -> Result<f32> {
        let pass = self.forward(input)?;
        let prediction = pass.output.at(&[0, 0])?;
        let error = loss.forward(prediction, target);

        let mut grad = TensorBuf::zeros(pass.output.shape())?;
        grad.set_at(&[0, 0], loss.backward(prediction, target))?;
        self.backward(&pass, &grad.freeze())?;
        self.update(learning_rate)?;

        log::trace!("prediction {prediction} for target {target}, error {error}");
        Ok(error)
    }
}
