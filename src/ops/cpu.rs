//! Parallel CPU backend kernels
//!
//! # CPU Backend
//!
//! Data-parallel implementations of the numeric kernels used by tensor math
//! and layer updates. These are the default when the active backend is
//! [`Backend::Cpu`](crate::backend::Backend::Cpu).
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon)
//! - Matrix kernels split the output by rows; elementwise kernels split by
//!   element. Each worker owns a disjoint slice of the output buffer.
//! - Per-row and per-element arithmetic comes from [`serial`](super::serial),
//!   so partitioning never changes a result.
//!
//! ## Implemented Ops
//!
//! - `gemm`: dense matrix multiplication, one task per output row; products
//!   with only a few rows are also split into column blocks
//! - `transpose`: one task per output row
//! - `add_assign`, `div_assign`, `sub_scaled`: gradient accumulation and
//!   weight updates
//! - `relu`, `relu_backward`: activation forward and masking

use rayon::prelude::*;

use super::serial::{gemm_block, gemm_row, relu_grad, relu_value};

/// Below this many output rows, GEMM also splits each row by columns.
const MIN_ROWS_FOR_ROW_SPLIT: usize = 16;

/// Output columns per task when a row is split.
const COL_BLOCK: usize = 64;

/// Performs `C = A × B` on row-major buffers (`A: m×k`, `B: k×n`).
///
/// `out` must be zeroed and hold `m * n` elements.
pub fn gemm(a: &[f32], b: &[f32], out: &mut [f32], k: usize, n: usize) {
    if k == 0 || n == 0 {
        return;
    }
    if out.len() / n >= MIN_ROWS_FOR_ROW_SPLIT {
        out.par_chunks_mut(n)
            .zip(a.par_chunks(k))
            .for_each(|(out_row, a_row)| gemm_row(a_row, b, out_row));
        return;
    }

    // a single-example batch is one row: partition its columns instead
    out.par_chunks_mut(n)
        .zip(a.par_chunks(k))
        .for_each(|(out_row, a_row)| {
            out_row
                .par_chunks_mut(COL_BLOCK)
                .enumerate()
                .for_each(|(block, out_block)| {
                    gemm_block(a_row, b, n, block * COL_BLOCK, out_block);
                });
        });
}

/// Writes the transpose of the `rows × cols` matrix `src` into `out`.
pub fn transpose(src: &[f32], rows: usize, cols: usize, out: &mut [f32]) {
    if rows == 0 || cols == 0 {
        return;
    }
    out.par_chunks_mut(rows)
        .enumerate()
        .for_each(|(j, out_row)| {
            for (i, o) in out_row.iter_mut().enumerate() {
                *o = src[i * cols + j];
            }
        });
}

/// `acc += x`, elementwise.
pub fn add_assign(acc: &mut [f32], x: &[f32]) {
    acc.par_iter_mut()
        .zip(x.par_iter())
        .for_each(|(a, &v)| *a += v);
}

/// `values /= divisor`, elementwise.
pub fn div_assign(values: &mut [f32], divisor: f32) {
    values.par_iter_mut().for_each(|v| *v /= divisor);
}

/// `w -= rate * g`, elementwise.
pub fn sub_scaled(w: &mut [f32], g: &[f32], rate: f32) {
    w.par_iter_mut()
        .zip(g.par_iter())
        .for_each(|(w, &g)| *w -= rate * g);
}

/// Elementwise `ReLU` of `src` into `out`.
pub fn relu(src: &[f32], out: &mut [f32]) {
    out.par_iter_mut()
        .zip(src.par_iter())
        .for_each(|(y, &x)| *y = relu_value(x));
}

/// Elementwise `ReLU` backward of `grad` masked by `orig` into `out`.
pub fn relu_backward(orig: &[f32], grad: &[f32], out: &mut [f32]) {
    out.par_iter_mut()
        .zip(orig.par_iter())
        .zip(grad.par_iter())
        .for_each(|((g, &x), &dy)| *g = relu_grad(x, dy));
}
