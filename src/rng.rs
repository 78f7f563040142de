//! Random generator handles.
//!
//! Nothing in the crate keeps global random state. Functions that need
//! randomness (such as [`TensorBuf::random`](crate::tensors::TensorBuf::random))
//! take a generator from the caller, and this module builds one.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Builds a generator from `seed`, or from the system clock when `None`.
///
/// The same seed always yields the same sequence, so training runs and tests
/// can be reproduced. A clock seed differs between runs; it is logged at
/// debug level so a run can still be replayed.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(clock_seed);
    log::debug!("random generator seed {seed}");
    StdRng::seed_from_u64(seed)
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
