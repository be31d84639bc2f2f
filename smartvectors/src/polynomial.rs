//! Polynomial views over smart vectors
//!
//! A vector of length `n` is read either as the coefficient list of a
//! univariate polynomial ([`eval_coeff`], [`ruffini_quo_rem`],
//! [`eval_coeff_bivariate`]) or as its evaluations over the two-adic
//! subgroup of order `n` ([`evaluate_lagrange`],
//! [`evaluate_lagrange_batch`]). The Lagrange evaluators take the query
//! point in an extension field, which is where out-of-domain challenges
//! live; the base-field case goes through the trivial extension.

use alloc::vec::Vec;

use p3_field::{
    batch_multiplicative_inverse, ExtensionField, Field, PrimeCharacteristicRing, TwoAdicField,
};
use p3_maybe_rayon::prelude::*;
use p3_util::log2_strict_usize;
use tracing::instrument;

use crate::vector::SmartVector;

/// Evaluates the polynomial with coefficient vector `v` at `x`, by Horner's
/// rule. `v.get(i)` is the coefficient of `X^i`.
pub fn eval_coeff<F: Field>(v: &SmartVector<F>, x: F) -> F {
    let mut acc = F::ZERO;
    for i in (0..v.len()).rev() {
        acc = acc * x + v.get(i);
    }
    acc
}

/// Synthetic division of the coefficient vector `p` by the linear factor
/// `X - q`: returns the quotient's coefficients and the remainder, which
/// equals `p(q)`.
///
/// The quotient of a length-1 vector is the zero polynomial, returned as a
/// length-1 constant.
pub fn ruffini_quo_rem<F: Field>(p: &SmartVector<F>, q: F) -> (SmartVector<F>, F) {
    let n = p.len();
    if n == 1 {
        return (SmartVector::constant(F::ZERO, 1), p.get(0));
    }

    let mut quo = alloc::vec![F::ZERO; n - 1];
    quo[n - 2] = p.get(n - 1);
    for i in (1..n - 1).rev() {
        quo[i - 1] = p.get(i) + q * quo[i];
    }
    let rem = p.get(0) + q * quo[0];
    (SmartVector::regular(quo), rem)
}

/// Reads `v` as a bivariate coefficient table with `num_coeffs_x`
/// coefficients of `X` per power of `Y`, and evaluates it at `(x, y)`:
/// `Σ_j y^j · Σ_i v[j * num_coeffs_x + i] · x^i`.
pub fn eval_coeff_bivariate<F: Field>(
    v: &SmartVector<F>,
    x: F,
    num_coeffs_x: usize,
    y: F,
) -> F {
    assert!(num_coeffs_x > 0, "num_coeffs_x must be positive");
    assert_eq!(
        v.len() % num_coeffs_x,
        0,
        "vector length must be a multiple of num_coeffs_x"
    );

    let num_chunks = v.len() / num_coeffs_x;
    let mut acc = F::ZERO;
    for j in (0..num_chunks).rev() {
        let mut inner = F::ZERO;
        for i in (0..num_coeffs_x).rev() {
            inner = inner * x + v.get(j * num_coeffs_x + i);
        }
        acc = acc * y + inner;
    }
    acc
}

/// Evaluates at `x` the polynomial whose evaluations over the two-adic
/// subgroup of order `v.len()` are `v`, without interpolating.
///
/// Uses the barycentric identity `P(x) = (x^n - 1)/n · Σ v_i / (x·ω^{-i} - 1)`
/// with one batch inversion for the denominators. When `x` lies on the
/// domain the stored evaluation is returned directly.
pub fn evaluate_lagrange<F: TwoAdicField, EF: ExtensionField<F>>(
    v: &SmartVector<F>,
    x: EF,
) -> EF {
    // A constant evaluation vector interpolates to a constant polynomial.
    if let SmartVector::Constant { value, .. } = v {
        return EF::from(*value);
    }

    let n = v.len();
    match lagrange_denominators::<F, EF>(n, x) {
        Denominators::OnDomain(i) => EF::from(v.get(i)),
        Denominators::Inverted(inv) => {
            let factor = lagrange_factor::<F, EF>(n, x);
            let sum: EF = (0..n).map(|i| inv[i] * v.get(i)).sum();
            factor * sum
        }
    }
}

/// Evaluates several same-length evaluation vectors at the same point `x`,
/// sharing the denominator batch inversion across the whole batch.
#[instrument(skip_all, level = "debug", fields(num_vecs = vecs.len()))]
pub fn evaluate_lagrange_batch<F: TwoAdicField, EF: ExtensionField<F>>(
    vecs: &[&SmartVector<F>],
    x: EF,
) -> Vec<EF> {
    assert!(!vecs.is_empty(), "no vector to evaluate");
    let n = vecs[0].len();
    for v in vecs {
        assert_eq!(v.len(), n, "evaluation batch length mismatch");
    }

    // Constants bypass the barycentric sum entirely.
    if vecs
        .iter()
        .all(|v| matches!(v, SmartVector::Constant { .. }))
    {
        return vecs.iter().map(|v| EF::from(v.get(0))).collect();
    }

    match lagrange_denominators::<F, EF>(n, x) {
        Denominators::OnDomain(i) => vecs.iter().map(|v| EF::from(v.get(i))).collect(),
        Denominators::Inverted(inv) => {
            let factor = lagrange_factor::<F, EF>(n, x);
            vecs.par_iter()
                .map(|v| match v {
                    SmartVector::Constant { value, .. } => EF::from(*value),
                    _ => factor * (0..n).map(|i| inv[i] * v.get(i)).sum::<EF>(),
                })
                .collect()
        }
    }
}

enum Denominators<EF> {
    /// `x` is the `i`-th domain point; the evaluation is already stored.
    OnDomain(usize),
    /// The inverted denominators `1 / (x·ω^{-i} - 1)` for every position.
    Inverted(Vec<EF>),
}

fn lagrange_denominators<F: TwoAdicField, EF: ExtensionField<F>>(
    n: usize,
    x: EF,
) -> Denominators<EF> {
    assert!(n.is_power_of_two(), "domain size must be a power of two, got {n}");
    let log_n = log2_strict_usize(n);
    let omega_inv = F::two_adic_generator(log_n).inverse();

    let mut denoms = Vec::with_capacity(n);
    let mut wi = F::ONE;
    for i in 0..n {
        let d = x * wi - EF::ONE;
        if d.is_zero() {
            return Denominators::OnDomain(i);
        }
        denoms.push(d);
        wi *= omega_inv;
    }
    Denominators::Inverted(batch_multiplicative_inverse(&denoms))
}

/// The common factor `(x^n - 1) / n` of the barycentric identity.
fn lagrange_factor<F: TwoAdicField, EF: ExtensionField<F>>(n: usize, x: EF) -> EF {
    let log_n = log2_strict_usize(n);
    (x.exp_power_of_2(log_n) - EF::ONE) * F::from_u64(n as u64).inverse()
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use p3_baby_bear::BabyBear;
    use p3_field::extension::BinomialExtensionField;
    use p3_field::PrimeCharacteristicRing;

    use super::*;
    use crate::fft::{fft_inverse, Decimation};
    use crate::testutil::{from_u64s, rand_vec, sample_vectors};

    type F = BabyBear;
    type EF = BinomialExtensionField<BabyBear, 4>;

    #[test]
    fn horner_matches_the_power_sum() {
        let v = SmartVector::regular(from_u64s::<F>(&[3, 0, 2, 5]));
        let x = F::from_u64(7);
        let expected = (0..4)
            .map(|i| v.get(i) * x.exp_u64(i as u64))
            .sum::<F>();
        assert_eq!(eval_coeff(&v, x), expected);
    }

    #[test]
    fn horner_sees_through_representations() {
        let x = F::from_u64(1234);
        for v in sample_vectors::<F>(16, 30) {
            let dense = SmartVector::regular(v.to_vec());
            assert_eq!(eval_coeff(&v, x), eval_coeff(&dense, x));
        }
    }

    #[test]
    fn ruffini_division_reconstructs_the_polynomial() {
        let p = SmartVector::regular(rand_vec::<F>(8, 31));
        let q = F::from_u64(11);
        let (quo, rem) = ruffini_quo_rem(&p, q);
        assert_eq!(quo.len(), 7);
        // quo * (X - q) + rem == p, checked at a few points.
        for t in [F::ZERO, F::ONE, F::from_u64(5), q] {
            assert_eq!(eval_coeff(&quo, t) * (t - q) + rem, eval_coeff(&p, t));
        }
        // The remainder of dividing by X - q is p(q).
        assert_eq!(rem, eval_coeff(&p, q));
    }

    #[test]
    fn ruffini_of_a_single_coefficient() {
        let p = SmartVector::constant(F::from_u64(42), 1);
        let (quo, rem) = ruffini_quo_rem(&p, F::from_u64(3));
        assert_eq!(quo, SmartVector::constant(F::ZERO, 1));
        assert_eq!(rem, F::from_u64(42));
    }

    #[test]
    fn lagrange_agrees_with_interpolation() {
        let evals = SmartVector::regular(rand_vec::<F>(16, 32));
        // Natural-order coefficients of the interpolant.
        let coeffs = fft_inverse(&evals, Decimation::Dif, true, None, None);
        let x = F::from_u64(987654321);
        assert_eq!(evaluate_lagrange(&evals, x), eval_coeff(&coeffs, x));
    }

    #[test]
    fn lagrange_at_extension_points() {
        let evals = SmartVector::regular(rand_vec::<F>(16, 33));
        let coeffs = fft_inverse(&evals, Decimation::Dif, true, None, None);
        let x = EF::from(F::from_u64(3)) + EF::from_u64(5).exp_u64(40);
        let mut expected = EF::ZERO;
        for i in (0..coeffs.len()).rev() {
            expected = expected * x + EF::from(coeffs.get(i));
        }
        assert_eq!(evaluate_lagrange(&evals, x), expected);
    }

    #[test]
    fn lagrange_on_a_domain_point_returns_the_stored_value() {
        let evals = SmartVector::regular(rand_vec::<F>(16, 34));
        let omega = F::two_adic_generator(4);
        let x = omega.exp_u64(3);
        assert_eq!(evaluate_lagrange(&evals, x), evals.get(3));
    }

    #[test]
    fn lagrange_of_a_constant_vector() {
        let c = SmartVector::constant(F::from_u64(9), 16);
        let x = EF::from_u64(123456789);
        assert_eq!(evaluate_lagrange(&c, x), EF::from_u64(9));
    }

    #[test]
    fn batch_evaluation_matches_single_evaluations() {
        let vecs = sample_vectors::<F>(16, 35);
        let refs: Vec<&SmartVector<F>> = vecs.iter().collect();
        let x = EF::from_u64(55555).exp_u64(3);
        let batch = evaluate_lagrange_batch(&refs, x);
        for (v, got) in refs.iter().zip(&batch) {
            assert_eq!(*got, evaluate_lagrange(v, x));
        }
    }

    #[test]
    fn batch_evaluation_on_a_domain_point() {
        let vecs = sample_vectors::<F>(16, 36);
        let refs: Vec<&SmartVector<F>> = vecs.iter().collect();
        let x = F::two_adic_generator(4).exp_u64(7);
        let batch = evaluate_lagrange_batch(&refs, x);
        for (v, got) in refs.iter().zip(&batch) {
            assert_eq!(*got, v.get(7));
        }
    }

    #[test]
    fn batch_of_constants_only() {
        let a = SmartVector::constant(F::from_u64(1), 8);
        let b = SmartVector::constant(F::from_u64(2), 8);
        let got = evaluate_lagrange_batch(&[&a, &b], EF::from_u64(77));
        assert_eq!(got, alloc::vec![EF::from_u64(1), EF::from_u64(2)]);
    }

    #[test]
    fn bivariate_evaluation_matches_the_double_sum() {
        let v = SmartVector::regular(rand_vec::<F>(12, 37));
        let (x, y) = (F::from_u64(3), F::from_u64(10));
        let expected = (0..3)
            .map(|j| {
                (0..4)
                    .map(|i| v.get(j * 4 + i) * x.exp_u64(i as u64))
                    .sum::<F>()
                    * y.exp_u64(j as u64)
            })
            .sum::<F>();
        assert_eq!(eval_coeff_bivariate(&v, x, 4, y), expected);
    }

    #[test]
    #[should_panic(expected = "multiple of num_coeffs_x")]
    fn bivariate_shape_mismatch_is_fatal() {
        let v = SmartVector::regular(rand_vec::<F>(10, 38));
        let _ = eval_coeff_bivariate(&v, F::ONE, 4, F::ONE);
    }
}
