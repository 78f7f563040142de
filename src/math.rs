//! Matrix algebra over tensors.
//!
//! # Tensor Math
//!
//! Stateless operations used by the layers: a dense matrix product, a
//! transpose, and four structural edits that fold a bias term into a matrix
//! by appending (or dropping) a constant row or column.
//!
//! Every function is pure: inputs are borrowed read-only and the result is a
//! new shared [`Tensor`]. Pass either a [`TensorBuf`] or a [`Tensor`]; the
//! latter dereferences to the former.
//!
//! ## Rank restriction
//!
//! All six operations accept matrices (rank 2) only and reject anything else
//! with [`Error::NotAMatrix`]. There is no broadcasting.
//!
//! ## Example
//!
//! ```rust
//! use neural_ff::{math, tensor};
//!
//! let lhs = tensor!([[4.0, 3.0], [2.0, 1.0]]);
//! let rhs = tensor!([[1.0, 2.0], [3.0, 4.0]]);
//! let product = math::multiply(&lhs, &rhs).unwrap();
//! assert_eq!(product.data(), &[13.0, 20.0, 5.0, 8.0]);
//!
//! let biased = math::add_col(&lhs, 1.0).unwrap();
//! assert_eq!(biased.shape(), &[2, 3]);
//! assert_eq!(math::remove_col(&biased).unwrap(), lhs);
//! ```

use crate::error::{Error, Result};
use crate::ops::dispatch;
use crate::tensors::{Tensor, TensorBuf};

/// Returns `(rows, cols)` of `t`, or [`Error::NotAMatrix`] naming `op`.
pub(crate) fn require_matrix(op: &'static str, t: &TensorBuf) -> Result<(usize, usize)> {
    match *t.shape() {
        [rows, cols] => Ok((rows, cols)),
        _ => {
            let err = Error::NotAMatrix {
                op,
                rank: t.rank(),
                shape: t.shape_str(),
            };
            log::error!("{err}");
            Err(err)
        }
    }
}

/// Matrix product `lhs × rhs`.
///
/// `lhs` is `m×k`, `rhs` is `k×n`, the result is `m×n` with
/// `C[i, j] = Σ_l lhs[i, l] * rhs[l, j]`.
///
/// Runs on the active backend's GEMM kernel; the result does not depend on
/// the backend or on how rows are split across threads.
///
/// # Errors
///
/// - [`Error::NotAMatrix`] if either operand is not rank 2.
/// - [`Error::InnerDimMismatch`] if `lhs.shape[1] != rhs.shape[0]`.
/// - [`Error::ShapeOverflow`] if `m * n` overflows.
pub fn multiply(lhs: &TensorBuf, rhs: &TensorBuf) -> Result<Tensor> {
    let (m, k) = require_matrix("multiply", lhs)?;
    let (k2, n) = require_matrix("multiply", rhs)?;
    if k != k2 {
        let err = Error::InnerDimMismatch {
            op: "multiply",
            lhs: lhs.shape_str(),
            rhs: rhs.shape_str(),
        };
        log::error!("{err}");
        return Err(err);
    }

    let mut out = TensorBuf::zeros([m, n])?;
    dispatch::gemm(lhs.data(), rhs.data(), out.data_mut(), k, n);
    Ok(out.freeze())
}

/// Transpose of a matrix: `result[j, i] = input[i, j]`.
///
/// # Errors
///
/// [`Error::NotAMatrix`] if `matrix` is not rank 2.
pub fn transpose(matrix: &TensorBuf) -> Result<Tensor> {
    let (rows, cols) = require_matrix("transpose", matrix)?;
    let mut out = TensorBuf::zeros([cols, rows])?;
    dispatch::transpose(matrix.data(), rows, cols, out.data_mut());
    Ok(out.freeze())
}

/// Appends a column of `value` to every row: `r×c` becomes `r×(c+1)`.
///
/// Used to append the constant bias input before multiplying by weights that
/// carry a bias row.
///
/// # Errors
///
/// [`Error::NotAMatrix`] if `matrix` is not rank 2.
pub fn add_col(matrix: &TensorBuf, value: f32) -> Result<Tensor> {
    let (rows, cols) = require_matrix("add_col", matrix)?;
    let mut data = Vec::with_capacity(rows * (cols + 1));
    if cols == 0 {
        data.resize(rows, value);
    } else {
        for row in matrix.data().chunks_exact(cols) {
            data.extend_from_slice(row);
            data.push(value);
        }
    }
    Ok(TensorBuf::with_data([rows, cols + 1], data)?.freeze())
}

/// Drops the last column of every row: `r×c` becomes `r×(c-1)`.
///
/// # Errors
///
/// - [`Error::NotAMatrix`] if `matrix` is not rank 2.
/// - [`Error::EmptyDimension`] if the matrix has no columns.
pub fn remove_col(matrix: &TensorBuf) -> Result<Tensor> {
    let (rows, cols) = require_matrix("remove_col", matrix)?;
    if cols == 0 {
        return Err(empty("remove_col", matrix));
    }
    let mut data = Vec::with_capacity(rows * (cols - 1));
    for row in matrix.data().chunks_exact(cols) {
        data.extend_from_slice(&row[..cols - 1]);
    }
    Ok(TensorBuf::with_data([rows, cols - 1], data)?.freeze())
}

/// Appends a row of `value`: `r×c` becomes `(r+1)×c`.
///
/// Used to give a weight matrix its trainable bias row.
///
/// # Errors
///
/// [`Error::NotAMatrix`] if `matrix` is not rank 2.
pub fn add_row(matrix: &TensorBuf, value: f32) -> Result<Tensor> {
    let (rows, cols) = require_matrix("add_row", matrix)?;
    let mut data = Vec::with_capacity((rows + 1) * cols);
    data.extend_from_slice(matrix.data());
    data.resize((rows + 1) * cols, value);
    Ok(TensorBuf::with_data([rows + 1, cols], data)?.freeze())
}

/// Drops the last row: `r×c` becomes `(r-1)×c`.
///
/// # Errors
///
/// - [`Error::NotAMatrix`] if `matrix` is not rank 2.
/// - [`Error::EmptyDimension`] if the matrix has no rows.
pub fn remove_row(matrix: &TensorBuf) -> Result<Tensor> {
    let (rows, cols) = require_matrix("remove_row", matrix)?;
    if rows == 0 {
        return Err(empty("remove_row", matrix));
    }
    let data = matrix.data()[..(rows - 1) * cols].to_vec();
    Ok(TensorBuf::with_data([rows - 1, cols], data)?.freeze())
}

fn empty(op: &'static str, matrix: &TensorBuf) -> Error {
    let err = Error::EmptyDimension {
        op,
        shape: matrix.shape_str(),
    };
    log::error!("{err}");
    err
}
