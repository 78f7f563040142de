//! neural_ff: a minimal strided tensor engine for feed-forward networks.
//!
//! Provides the numeric core of a small neural network trainer: N-dimensional
//! `f32` tensors with row-major strides, the dense matrix algebra a
//! fully-connected layer needs, and layers that implement a forward pass and
//! a manual backward pass with explicit gradient accumulation.
//!
//! # Features
//!
//! - Strided tensors with a shared immutable handle ([`tensors::Tensor`]) and
//!   an exclusively-owned mutable buffer ([`tensors::TensorBuf`]).
//! - Matrix multiply, transpose and bias-folding row/column edits.
//! - `LinearLayer` and `ReluLayer` behind one [`layers::Layer`] trait.
//! - Data-parallel kernels on `rayon`, with a single-threaded backend that
//!   produces bit-identical results.
//! - An MNIST IDX reader and a squared-error loss for end-to-end training.
//!
//! # Modules
//!
//! - [`tensors`]: tensor data structures and indexing.
//! - [`math`]: matrix algebra.
//! - [`layers`]: forward/backward layers.
//! - [`model`]: sequential networks and training configuration.
//! - [`loss`], [`data`], [`rng`]: collaborators used by training loops.
//! - [`backend`], [`ops`]: kernel selection and kernels.
//!
//! # Example
//!
//! ```rust
//! use neural_ff::layers::{Layer, LinearLayer, ReluLayer};
//! use neural_ff::tensor;
//!
//! let mut linear = LinearLayer::new(&tensor!([[1.0], [-1.0]]), true).unwrap();
//! let relu = ReluLayer::new();
//!
//! let input = tensor!([[2.0, 1.0]]);
//! let hidden = linear.forward(&input).unwrap();
//! let output = relu.forward(&hidden).unwrap();
//! assert_eq!(output.data(), &[2.0]);
//!
//! linear.backward(&input, &tensor!([[1.0]])).unwrap();
//! linear.update_weights(0.1).unwrap();
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::module_name_repetitions
)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod approx;
pub mod backend;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod model;
pub mod ops;
pub mod rng;
pub mod tensors;

pub use error::{Error, ErrorKind, Result};
pub use tensors::{Tensor, TensorBuf};
