//! Utilities to approximate equality of floating point values.
//!
//! Matrix products summed in a different order differ in the last bits, so
//! algebraic identities such as `(AB)ᵀ = BᵀAᵀ` only hold within a tolerance.
//! [`RelativeEq`] rates how close two values are and [`approx_eq_within`]
//! accepts anything at or better than a chosen [`ApproxEquality`].

use crate::tensors::TensorBuf;

/// The max epsilon accepted on `f32`s.
pub const F32_MAX_ERROR: f32 = 1e-3;

/// The expected minimum epsilon accepted on `f32`s.
pub const F32_AVG_ERROR: f32 = 1e-5;

/// The best expected epsilon accepted on `f32`s.
pub const F32_MIN_ERROR: f32 = 1e-6;

/// The approximated equality enumerated, best first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Very strong epsilon.
    Precise = 0,

    /// Good epsilon.
    Partial = 1,

    /// Acceptable epsilon
    Relative = 2,

    /// No relative equality.
    Scarce = 3,
}

/// Checks the relative distance based off epsilon.
pub trait RelativeEq<Rhs: ?Sized> {
    /// Enumerates the equality of `self`
    fn approx_eq(&self, rhs: &Rhs) -> ApproxEquality;
}

impl RelativeEq<Self> for f32 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        // identical values, including matching infinities
        if self == rhs {
            return ApproxEquality::Precise;
        }

        let dif = (self - rhs).abs();

        if dif < F32_MIN_ERROR {
            ApproxEquality::Precise
        } else if dif < F32_AVG_ERROR {
            ApproxEquality::Partial
        } else if dif < F32_MAX_ERROR {
            ApproxEquality::Relative
        } else {
            ApproxEquality::Scarce
        }
    }
}

impl<T: RelativeEq<U>, U> RelativeEq<[U]> for [T] {
    fn approx_eq(&self, rhs: &[U]) -> ApproxEquality {
        if self.len() != rhs.len() {
            return ApproxEquality::Scarce;
        }

        let mut eq = ApproxEquality::Precise;
        for (t_val, u_val) in self.iter().zip(rhs) {
            eq = eq.max(t_val.approx_eq(u_val));
            if eq == ApproxEquality::Scarce {
                break; // can't improve from here; not equal
            }
        }
        eq
    }
}

impl RelativeEq<Self> for TensorBuf {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.shape() != rhs.shape() {
            return ApproxEquality::Scarce;
        }
        self.data().approx_eq(rhs.data())
    }
}

/// Approximates equality based off the relative difference.
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    approx_eq_within(a, b, ApproxEquality::Precise)
}

/// Whether `a` and `b` are at least as close as `level`.
///
/// # Example
///
/// ```rust
/// use neural_ff::approx::{approx_eq_within, ApproxEquality};
///
/// assert!(approx_eq_within(&1.0f32, &1.0004, ApproxEquality::Relative));
/// assert!(!approx_eq_within(&1.0f32, &1.0004, ApproxEquality::Partial));
/// ```
pub fn approx_eq_within<A: RelativeEq<B> + ?Sized, B: ?Sized>(
    a: &A,
    b: &B,
    level: ApproxEquality,
) -> bool {
    a.approx_eq(b) <= level
}
