//! Shared helpers for the test modules.

use alloc::vec::Vec;

use p3_field::{Field, PrimeCharacteristicRing};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::SmartVector;

/// A reproducible random dense vector.
pub(crate) fn rand_vec<F: Field>(len: usize, seed: u64) -> Vec<F> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| F::from_u64(rng.random::<u64>())).collect()
}

/// Small literal values lifted into the field.
pub(crate) fn from_u64s<F: Field>(values: &[u64]) -> Vec<F> {
    values.iter().map(|v| F::from_u64(*v)).collect()
}

/// One vector of each representation (including a wrapping window), all of
/// length `len`, seeded for reproducibility.
pub(crate) fn sample_vectors<F: Field>(len: usize, seed: u64) -> Vec<SmartVector<F>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rand_elems = |n: usize| -> Vec<F> {
        (0..n).map(|_| F::from_u64(rng.random::<u64>())).collect()
    };

    let window_len = len / 2 + 1;
    let mut out = Vec::new();
    out.push(SmartVector::constant(rand_elems(1)[0], len));
    out.push(SmartVector::regular(rand_elems(len)));
    out.push(SmartVector::rotated(rand_elems(len), len / 3 + 1));
    // A plain window and one that wraps around the end.
    out.push(SmartVector::windowed(
        rand_elems(window_len),
        rand_elems(1)[0],
        1,
        len,
    ));
    out.push(SmartVector::windowed(
        rand_elems(window_len),
        rand_elems(1)[0],
        len - 2,
        len,
    ));
    out
}
