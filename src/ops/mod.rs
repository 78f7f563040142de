//! # Kernel Dispatch Layer
//!
//! Raw numeric kernels over flat `f32` buffers, and the dispatch that picks
//! an implementation for the active [`Backend`](crate::backend::Backend).
//!
//! ## Submodules
//!
//! - [`serial`]: single-threaded kernels; also owns the per-row and
//!   per-element arithmetic that every backend shares
//! - [`cpu`]: `rayon` data-parallel kernels built on the serial row kernels
//! - [`dispatch`]: backend switching and the unified kernel interface
//!
//! ## Contract
//!
//! Kernels never allocate and never validate shapes. Callers (the
//! [`math`](crate::math) and [`layers`](crate::layers) modules) check shapes
//! first and hand in output buffers of the right length. Parallel kernels
//! partition the output buffer, so no two workers ever write the same
//! element.
//!
//! ## Feature Flags
//!
//! - `simd`: enables an AVX2/FMA path in the GEMM row kernel on x86_64
//!   builds compiled with `target-feature=+avx2,+fma`

pub mod cpu;
pub mod dispatch;
pub mod serial;
