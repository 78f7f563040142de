//! Single-threaded kernels.
//!
//! Everything here runs on the calling thread. The row and element
//! functions (`gemm_row`, `relu_value`, `relu_grad`) are also what the
//! parallel [`cpu`](super::cpu) kernels run inside each worker, which is why
//! both backends agree bit-for-bit.

#[cfg(all(
    feature = "simd",
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
))]
use core::arch::x86_64::{_mm256_fmadd_ps, _mm256_loadu_ps, _mm256_set1_ps, _mm256_storeu_ps};

/// Accumulates one output row of `C = A × B`.
///
/// `a_row` is row `i` of `A` (length `k`), `b` is all of `B` (`k × n`,
/// row-major) and `out_row` is row `i` of `C` (length `n`), which must start
/// zeroed. The loop runs `l` outermost so every pass streams one contiguous
/// row of `B`.
#[inline]
pub fn gemm_row(a_row: &[f32], b: &[f32], out_row: &mut [f32]) {
    gemm_block(a_row, b, out_row.len(), 0, out_row);
}

/// Accumulates columns `col..col + out_block.len()` of one output row.
///
/// `n` is the full width of `B`. Each output element receives the same
/// sequence of `axpy` updates as in [`gemm_row`], so splitting a row into
/// blocks never changes its values.
#[inline]
pub fn gemm_block(a_row: &[f32], b: &[f32], n: usize, col: usize, out_block: &mut [f32]) {
    if n == 0 || out_block.is_empty() {
        return;
    }
    let end = col + out_block.len();
    for (&a_il, b_row) in a_row.iter().zip(b.chunks_exact(n)) {
        axpy(a_il, &b_row[col..end], out_block);
    }
}

/// `out += alpha * x`
#[inline]
#[cfg(not(all(
    feature = "simd",
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
)))]
fn axpy(alpha: f32, x: &[f32], out: &mut [f32]) {
    for (o, &v) in out.iter_mut().zip(x) {
        *o += alpha * v;
    }
}

/// `out += alpha * x`, eight lanes at a time with fused multiply-add.
#[inline]
#[cfg(all(
    feature = "simd",
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
))]
#[allow(unsafe_code)]
fn axpy(alpha: f32, x: &[f32], out: &mut [f32]) {
    const LANES: usize = 8;
    let len = out.len().min(x.len());
    let mut j = 0;

    // SAFETY: `j + LANES <= len` bounds every unaligned load and store, and
    // the avx2/fma target features are statically enabled for this build.
    unsafe {
        let a = _mm256_set1_ps(alpha);
        while j + LANES <= len {
            let acc = _mm256_loadu_ps(out.as_ptr().add(j));
            let v = _mm256_loadu_ps(x.as_ptr().add(j));
            _mm256_storeu_ps(out.as_mut_ptr().add(j), _mm256_fmadd_ps(a, v, acc));
            j += LANES;
        }
    }

    for (o, &v) in out[j..len].iter_mut().zip(&x[j..len]) {
        *o = alpha.mul_add(v, *o);
    }
}

/// `C = A × B` for `A: m×k`, `B: k×n`; `out` (`m×n`) must start zeroed.
pub fn gemm(a: &[f32], b: &[f32], out: &mut [f32], k: usize, n: usize) {
    if k == 0 || n == 0 {
        return;
    }
    for (a_row, out_row) in a.chunks_exact(k).zip(out.chunks_exact_mut(n)) {
        gemm_row(a_row, b, out_row);
    }
}

/// Writes the transpose of the `rows × cols` matrix `src` into `out`.
pub fn transpose(src: &[f32], rows: usize, cols: usize, out: &mut [f32]) {
    if rows == 0 || cols == 0 {
        return;
    }
    for (j, out_row) in out.chunks_exact_mut(rows).enumerate() {
        for (i, o) in out_row.iter_mut().enumerate() {
            *o = src[i * cols + j];
        }
    }
}

/// `acc += x`, elementwise.
pub fn add_assign(acc: &mut [f32], x: &[f32]) {
    for (a, &v) in acc.iter_mut().zip(x) {
        *a += v;
    }
}

/// `values /= divisor`, elementwise.
pub fn div_assign(values: &mut [f32], divisor: f32) {
    for v in values {
        *v /= divisor;
    }
}

/// `w -= rate * g`, elementwise.
pub fn sub_scaled(w: &mut [f32], g: &[f32], rate: f32) {
    for (w, &g) in w.iter_mut().zip(g) {
        *w -= rate * g;
    }
}

/// `max(0, x)`; NaN maps to zero.
#[inline]
#[must_use]
pub fn relu_value(x: f32) -> f32 {
    x.max(0.0)
}

/// Gradient through `ReLU`: blocked only where the original input was
/// negative. Zero passes the gradient through.
#[inline]
#[must_use]
pub fn relu_grad(x: f32, dy: f32) -> f32 {
    if x < 0.0 { 0.0 } else { dy }
}

/// Elementwise `ReLU` of `src` into `out`.
pub fn relu(src: &[f32], out: &mut [f32]) {
    for (y, &x) in out.iter_mut().zip(src) {
        *y = relu_value(x);
    }
}

/// Elementwise `ReLU` backward of `grad` masked by `orig` into `out`.
pub fn relu_backward(orig: &[f32], grad: &[f32], out: &mut [f32]) {
    for ((g, &x), &dy) in out.iter_mut().zip(orig).zip(grad) {
        *g = relu_grad(x, dy);
    }
}
