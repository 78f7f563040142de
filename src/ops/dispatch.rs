//! Operation Dispatch Layer
//!
//! This module selects the kernel implementation for the active
//! [`Backend`] at call time.
//!
//! # Design Highlights
//! - **Pluggable**: each backend is a plain module of free functions
//! - **Minimal overhead**: one atomic load and a match per kernel call
//! - **Deterministic**: backends share the same arithmetic, so switching
//!   never changes results
//!
//! # Example
//! ```rust
//! use neural_ff::ops::dispatch;
//!
//! let a: [f32; 4] = [4.0, 3.0, 2.0, 1.0];
//! let b: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
//! let mut c = [0.0f32; 4];
//! dispatch::gemm(&a, &b, &mut c, 2, 2);
//! assert_eq!(c, [13.0, 20.0, 5.0, 8.0]);
//! ```

use crate::backend::{Backend, get_backend};

use super::{cpu, serial};

macro_rules! dispatch {
    ($name:ident ( $( $arg:expr ),* )) => {{
        let backend = get_backend();
        log::trace!("{} on {:?}", stringify!($name), backend);
        match backend {
            Backend::Cpu => cpu::$name($( $arg ),*),
            Backend::Serial => serial::$name($( $arg ),*),
        }
    }};
}

/// Dispatches `C = A × B` (`A: m×k`, `B: k×n`); `out` must start zeroed.
pub fn gemm(a: &[f32], b: &[f32], out: &mut [f32], k: usize, n: usize) {
    dispatch!(gemm(a, b, out, k, n))
}

/// Dispatches a `rows × cols` transpose of `src` into `out`.
pub fn transpose(src: &[f32], rows: usize, cols: usize, out: &mut [f32]) {
    dispatch!(transpose(src, rows, cols, out))
}

/// Dispatches `acc += x`.
pub fn add_assign(acc: &mut [f32], x: &[f32]) {
    dispatch!(add_assign(acc, x))
}

/// Dispatches `values /= divisor`.
pub fn div_assign(values: &mut [f32], divisor: f32) {
    dispatch!(div_assign(values, divisor))
}

/// Dispatches `w -= rate * g`.
pub fn sub_scaled(w: &mut [f32], g: &[f32], rate: f32) {
    dispatch!(sub_scaled(w, g, rate))
}

/// Dispatches elementwise `ReLU`.
pub fn relu(src: &[f32], out: &mut [f32]) {
    dispatch!(relu(src, out))
}

/// Dispatches the `ReLU` gradient mask.
pub fn relu_backward(orig: &[f32], grad: &[f32], out: &mut [f32]) {
    dispatch!(relu_backward(orig, grad, out))
}
