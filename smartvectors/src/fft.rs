//! Radix-2 transforms between coefficient and evaluation form
//!
//! [`fft`] maps a coefficient vector to its evaluations over the two-adic
//! subgroup of matching size (optionally over a [`Coset`] of a larger
//! subgroup), and [`fft_inverse`] maps back. Both come in two decimation
//! flavors with opposite ordering conventions:
//!
//! * [`Decimation::Dif`] (Gentleman-Sande) consumes natural order and
//!   produces bit-reversed order.
//! * [`Decimation::Dit`] (Cooley-Tukey) consumes bit-reversed order and
//!   produces natural order.
//!
//! Passing `bit_reverse = true` adds the explicit permutation that makes the
//! bit-reversed side natural, so `fft(v, Dif, true, ..)` is natural-in,
//! natural-out. The cheap way to run a full round trip is to skip the
//! permutation entirely: `fft` with `Dif` feeds `fft_inverse` with `Dit`
//! directly, bit-reversed in the middle.
//!
//! Constant vectors and one-point zero-padded windows transform in closed
//! form without touching a dense buffer; everything else materializes and
//! runs the butterfly network, stage-parallel when the `parallel` feature is
//! enabled.

use alloc::vec;
use alloc::vec::Vec;

use p3_field::{Field, PrimeCharacteristicRing, TwoAdicField};
use p3_maybe_rayon::prelude::*;
use p3_util::{log2_strict_usize, reverse_slice_index_bits};
use tracing::instrument;

use crate::pool::BufferPool;
use crate::vector::SmartVector;

/// The butterfly schedule and, with it, the ordering convention of a
/// transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decimation {
    /// Decimation in time: bit-reversed input, natural output.
    Dit,
    /// Decimation in frequency: natural input, bit-reversed output.
    Dif,
}

/// Selects a coset `g * H` of the two-adic subgroup to evaluate over, where
/// `H` is the subgroup `ratio` times larger than the vector and `g` combines
/// the field's multiplicative generator with the `index`-th root in `H`.
///
/// Distinct indices give disjoint cosets, which is how a low-degree
/// extension splits into `ratio` interleaved transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coset {
    ratio: usize,
    index: usize,
}

impl Coset {
    pub fn new(ratio: usize, index: usize) -> Self {
        assert!(ratio.is_power_of_two(), "coset ratio must be a power of two");
        assert!(index < ratio, "coset index out of range: {index} >= {ratio}");
        Self { ratio, index }
    }

    /// The multiplicative shift of this coset for vectors of length
    /// `2^log_n`.
    pub fn shift<F: TwoAdicField>(&self, log_n: usize) -> F {
        let log_ratio = log2_strict_usize(self.ratio);
        assert!(
            log_n + log_ratio <= F::TWO_ADICITY,
            "coset subgroup exceeds the field's two-adicity"
        );
        F::GENERATOR * F::two_adic_generator(log_n + log_ratio).exp_u64(self.index as u64)
    }
}

/// Evaluates the polynomial with coefficient vector `v` over the two-adic
/// subgroup of size `v.len()`, or over a coset of it.
///
/// Input and output orderings follow `decimation` and `bit_reverse` as
/// described in the module documentation. A zero vector is returned as-is; a
/// non-zero constant (without a coset) and a one-point window at position 0
/// transform in closed form.
#[instrument(skip_all, level = "debug", fields(n = v.len()))]
pub fn fft<F: TwoAdicField>(
    v: &SmartVector<F>,
    decimation: Decimation,
    bit_reverse: bool,
    coset: Option<Coset>,
    pool: Option<&BufferPool<F>>,
) -> SmartVector<F> {
    let n = v.len();
    if n == 1 {
        return v.clone();
    }

    match v {
        // The zero polynomial evaluates to zero everywhere.
        SmartVector::Constant { value, .. } if value.is_zero() => return v.clone(),
        // A constant coefficient vector is value * (1 + X + .. + X^{n-1}),
        // which vanishes on the subgroup except at 1. Position 0 is a fixed
        // point of the bit-reversal permutation, so the result is
        // ordering-independent.
        SmartVector::Constant { value, len } if coset.is_none() => {
            return SmartVector::windowed(
                vec![*value * F::from_u64(*len as u64)],
                F::ZERO,
                0,
                *len,
            );
        }
        // A single coefficient at degree 0 is a constant polynomial, on any
        // coset.
        SmartVector::Windowed {
            window,
            padding,
            offset: 0,
            len,
        } if window.len() == 1 && padding.is_zero() => {
            return SmartVector::constant(window[0], *len);
        }
        _ => {}
    }

    let log_n = check_transform_length::<F>(n);
    let mut buf = materialize(v, pool);

    // Evaluating over shift * H is the plain transform of the coefficients
    // scaled by powers of the shift.
    if let Some(coset) = coset {
        let input_natural = decimation == Decimation::Dif || bit_reverse;
        scale_by_powers(&mut buf, coset.shift::<F>(log_n), input_natural);
    }

    let twiddles = twiddle_table(F::two_adic_generator(log_n), n);
    match decimation {
        Decimation::Dif => {
            butterflies_dif(&mut buf, &twiddles);
            if bit_reverse {
                reverse_slice_index_bits(&mut buf);
            }
        }
        Decimation::Dit => {
            if bit_reverse {
                reverse_slice_index_bits(&mut buf);
            }
            butterflies_dit(&mut buf, &twiddles);
        }
    }

    SmartVector::regular(buf)
}

/// Interpolates the evaluation vector `v` over the two-adic subgroup of size
/// `v.len()` (or a coset of it) back into coefficients.
///
/// Exact inverse of [`fft`] with the decimations swapped: `Dif` evaluations
/// feed a `Dit` inverse and vice versa, with matching `bit_reverse` and
/// `coset` arguments.
#[instrument(skip_all, level = "debug", fields(n = v.len()))]
pub fn fft_inverse<F: TwoAdicField>(
    v: &SmartVector<F>,
    decimation: Decimation,
    bit_reverse: bool,
    coset: Option<Coset>,
    pool: Option<&BufferPool<F>>,
) -> SmartVector<F> {
    let n = v.len();
    if n == 1 {
        return v.clone();
    }

    match v {
        SmartVector::Constant { value, .. } if value.is_zero() => return v.clone(),
        // A constant function interpolates to a degree-0 polynomial.
        SmartVector::Constant { value, len } if coset.is_none() => {
            return SmartVector::windowed(vec![*value], F::ZERO, 0, *len);
        }
        // Evaluations (v, 0, .., 0) interpolate to v/n * (1 + X + ..), whose
        // coefficient vector is constant.
        SmartVector::Windowed {
            window,
            padding,
            offset: 0,
            len,
        } if window.len() == 1 && padding.is_zero() && coset.is_none() => {
            let n_inv = F::from_u64(*len as u64).inverse();
            return SmartVector::constant(window[0] * n_inv, *len);
        }
        _ => {}
    }

    let log_n = check_transform_length::<F>(n);
    let mut buf = materialize(v, pool);

    let twiddles = twiddle_table(F::two_adic_generator(log_n).inverse(), n);
    match decimation {
        Decimation::Dif => {
            butterflies_dif(&mut buf, &twiddles);
            if bit_reverse {
                reverse_slice_index_bits(&mut buf);
            }
        }
        Decimation::Dit => {
            if bit_reverse {
                reverse_slice_index_bits(&mut buf);
            }
            butterflies_dit(&mut buf, &twiddles);
        }
    }

    let n_inv = F::from_u64(n as u64).inverse();
    buf.iter_mut().for_each(|x| *x *= n_inv);

    // Undo the coset scaling of the coefficients.
    if let Some(coset) = coset {
        let output_natural = decimation == Decimation::Dit || bit_reverse;
        scale_by_powers(&mut buf, coset.shift::<F>(log_n).inverse(), output_natural);
    }

    SmartVector::regular(buf)
}

fn check_transform_length<F: TwoAdicField>(n: usize) -> usize {
    assert!(n.is_power_of_two(), "transform length must be a power of two, got {n}");
    let log_n = log2_strict_usize(n);
    assert!(
        log_n <= F::TWO_ADICITY,
        "transform length 2^{log_n} exceeds the field's two-adicity"
    );
    log_n
}

fn materialize<F: Field>(v: &SmartVector<F>, pool: Option<&BufferPool<F>>) -> Vec<F> {
    match pool {
        Some(pool) => {
            assert_eq!(
                pool.buf_len(),
                v.len(),
                "pool buffer length does not match the vector length"
            );
            let mut buf = pool.checkout().into_vec();
            v.write_into(&mut buf);
            buf
        }
        None => v.to_vec(),
    }
}

/// Multiplies `buf[i]` by `base^i`, where `i` is the logical position:
/// the physical index when the buffer is in natural order, its bit-reversal
/// otherwise.
fn scale_by_powers<F: Field>(buf: &mut [F], base: F, natural_order: bool) {
    let mut powers: Vec<F> = base.powers().take(buf.len()).collect();
    if !natural_order {
        reverse_slice_index_bits(&mut powers);
    }
    buf.iter_mut()
        .zip(powers)
        .for_each(|(x, p)| *x *= p);
}

/// The first `n / 2` powers of `root`, shared by every butterfly stage. The
/// stage over blocks of length `len` uses every `(n / len)`-th entry.
fn twiddle_table<F: Field>(root: F, n: usize) -> Vec<F> {
    root.powers().take(n / 2).collect()
}

/// Gentleman-Sande butterflies: natural input, bit-reversed output.
fn butterflies_dif<F: Field>(buf: &mut [F], twiddles: &[F]) {
    let n = buf.len();
    let mut len = n;
    while len >= 2 {
        let half = len / 2;
        let stride = n / len;
        buf.par_chunks_exact_mut(len).for_each(|chunk| {
            let (lo, hi) = chunk.split_at_mut(half);
            for j in 0..half {
                let a = lo[j];
                let b = hi[j];
                lo[j] = a + b;
                hi[j] = (a - b) * twiddles[j * stride];
            }
        });
        len = half;
    }
}

/// Cooley-Tukey butterflies: bit-reversed input, natural output.
fn butterflies_dit<F: Field>(buf: &mut [F], twiddles: &[F]) {
    let n = buf.len();
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let stride = n / len;
        buf.par_chunks_exact_mut(len).for_each(|chunk| {
            let (lo, hi) = chunk.split_at_mut(half);
            for j in 0..half {
                let b = hi[j] * twiddles[j * stride];
                hi[j] = lo[j] - b;
                lo[j] = lo[j] + b;
            }
        });
        len *= 2;
    }
}
