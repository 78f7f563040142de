//! Backend selection module.
//!
//! This module defines the available execution backends for the tensor
//! kernels and provides functions to set and get the current backend.
//!
//! # Supported Backends
//!
//! - `Cpu`: data-parallel CPU kernels on the `rayon` thread pool (default).
//! - `Serial`: the same kernels run on the calling thread only.
//!
//! Both backends split work along rows and run the identical per-row
//! arithmetic, so every result is bit-for-bit the same whichever one is
//! selected. `Serial` suits callers that manage their own threads.
//!
//! The backend is stored globally using an `AtomicU8`, enabling fast
//! switching at runtime.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// Enumeration of supported execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Multi-threaded CPU kernels (default).
    #[default]
    Cpu = 0,
    /// Single-threaded CPU kernels.
    Serial,
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Serial),
            _ => Err(()),
        }
    }
}

/// Internal global state for the active backend.
///
/// The backend changes rarely and never affects results, so a plain
/// acquire/release pair is all the ordering needed.
static GLOBAL_DEFAULT_BACKEND: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Sets the active backend used by tensor kernels.
///
/// # Example
///
/// ```
/// use neural_ff::backend::{set_backend, Backend};
/// set_backend(Backend::Serial);
/// # set_backend(Backend::Cpu);
/// ```
pub fn set_backend(b: Backend) {
    log::debug!("switching execution backend to {b:?}");
    GLOBAL_DEFAULT_BACKEND.store(b as u8, Ordering::Release);
}

/// Returns the currently active backend.
///
/// If the stored value is invalid, defaults to [`Backend::Cpu`].
///
/// # Example
///
/// ```
/// use neural_ff::backend::get_backend;
/// let backend = get_backend();
/// ```
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_DEFAULT_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}
