//! Operator primitives for the n-ary algebraic operations
//!
//! The combination engine in [`crate::arithmetic`] is written once against
//! the [`VecOperator`] trait and monomorphized for the two operators the
//! prover needs: the weighted sum `res += x * coeff` and the weighted product
//! `res *= x ^ coeff`. Each operator is a zero-sized type exposing the small
//! set of primitive mutation rules every variant combination is built from.
//!
//! Small coefficients are by far the common case in constraint expressions,
//! so both operators special-case them (repeated additions, squarings)
//! before falling back to a generic scalar multiplication or exponentiation.

use itertools::izip;
use p3_field::{Field, PrimeCharacteristicRing};

/// Lifts a signed integer coefficient into the field.
#[inline]
pub(crate) fn field_from_i64<F: Field>(coeff: i64) -> F {
    if coeff >= 0 {
        F::from_u64(coeff as u64)
    } else {
        -F::from_u64(coeff.unsigned_abs())
    }
}

/// The primitive mutation rules of an n-ary operator.
///
/// `coeff` is the per-operand weight: an arbitrary signed integer for the
/// weighted sum, a non-negative exponent for the weighted product. The
/// `*_term` rules initialize an accumulator from its first operand; the
/// `*_into_*` rules fold further operands in. For both operators `coeff = 1`
/// is the plain `+=` / `*=` rule, which is what the engine uses to merge
/// partial results together.
pub trait VecOperator<F: Field> {
    /// `res = op(res, x^coeff)`, scalars on both sides.
    fn scalar_into_scalar(res: &mut F, x: &F, coeff: i64);

    /// `res[i] = op(res[i], x[i]^coeff)` position-wise. Both slices must
    /// have the same length.
    fn vec_into_vec(res: &mut [F], x: &[F], coeff: i64);

    /// `res[i] = op(res[i], x^coeff)`: a scalar broadcast over a slice.
    fn scalar_into_vec(res: &mut [F], x: &F, coeff: i64);

    /// The initial accumulator term `x^coeff` for a scalar operand.
    fn scalar_term(x: &F, coeff: i64) -> F;

    /// Initializes `res[i] = x[i]^coeff`, overwriting previous contents.
    fn vec_term(res: &mut [F], x: &[F], coeff: i64);

    /// Whether an accumulated term forces the whole n-ary result regardless
    /// of the remaining operands (the zero constant of a product).
    fn is_absorbing(term: &F) -> bool {
        let _ = term;
        false
    }
}

/// Weighted sum: `res += x * coeff` with a signed integer coefficient.
#[derive(Clone, Copy, Debug)]
pub struct LinCombOp;

impl<F: Field> VecOperator<F> for LinCombOp {
    fn scalar_into_scalar(res: &mut F, x: &F, coeff: i64) {
        match coeff {
            0 => {}
            1 => *res += *x,
            -1 => *res -= *x,
            2 => *res += x.double(),
            -2 => *res -= x.double(),
            3 => *res += x.double() + *x,
            _ => *res += *x * field_from_i64::<F>(coeff),
        }
    }

    fn vec_into_vec(res: &mut [F], x: &[F], coeff: i64) {
        assert_eq!(res.len(), x.len(), "operand length mismatch");
        match coeff {
            0 => {}
            1 => izip!(res, x).for_each(|(r, x)| *r += *x),
            -1 => izip!(res, x).for_each(|(r, x)| *r -= *x),
            2 => izip!(res, x).for_each(|(r, x)| *r += x.double()),
            -2 => izip!(res, x).for_each(|(r, x)| *r -= x.double()),
            3 => izip!(res, x).for_each(|(r, x)| *r += x.double() + *x),
            _ => {
                let c = field_from_i64::<F>(coeff);
                izip!(res, x).for_each(|(r, x)| *r += *x * c);
            }
        }
    }

    fn scalar_into_vec(res: &mut [F], x: &F, coeff: i64) {
        let term = <Self as VecOperator<F>>::scalar_term(x, coeff);
        res.iter_mut().for_each(|r| *r += term);
    }

    fn scalar_term(x: &F, coeff: i64) -> F {
        match coeff {
            0 => F::ZERO,
            1 => *x,
            -1 => -*x,
            2 => x.double(),
            -2 => -x.double(),
            3 => x.double() + *x,
            _ => *x * field_from_i64::<F>(coeff),
        }
    }

    fn vec_term(res: &mut [F], x: &[F], coeff: i64) {
        assert_eq!(res.len(), x.len(), "operand length mismatch");
        match coeff {
            0 => res.fill(F::ZERO),
            1 => res.copy_from_slice(x),
            -1 => izip!(res, x).for_each(|(r, x)| *r = -*x),
            2 => izip!(res, x).for_each(|(r, x)| *r = x.double()),
            -2 => izip!(res, x).for_each(|(r, x)| *r = -x.double()),
            3 => izip!(res, x).for_each(|(r, x)| *r = x.double() + *x),
            _ => {
                let c = field_from_i64::<F>(coeff);
                izip!(res, x).for_each(|(r, x)| *r = *x * c);
            }
        }
    }
}

/// Weighted product: `res *= x ^ coeff` with a non-negative exponent.
///
/// Exponent 0 yields the multiplicative identity even for a zero base: the
/// operator follows the `0^0 = 1` convention. A literal zero *constant*
/// operand with a non-zero exponent never reaches the primitives; the engine
/// short-circuits it through [`VecOperator::is_absorbing`].
#[derive(Clone, Copy, Debug)]
pub struct ProductOp;

#[inline]
fn check_exponent(coeff: i64) -> u64 {
    assert!(coeff >= 0, "product exponents must be non-negative, got {coeff}");
    coeff as u64
}

impl<F: Field> VecOperator<F> for ProductOp {
    fn scalar_into_scalar(res: &mut F, x: &F, coeff: i64) {
        match check_exponent(coeff) {
            0 => {}
            1 => *res *= *x,
            2 => *res *= x.square(),
            3 => *res *= x.cube(),
            e => *res *= x.exp_u64(e),
        }
    }

    fn vec_into_vec(res: &mut [F], x: &[F], coeff: i64) {
        assert_eq!(res.len(), x.len(), "operand length mismatch");
        match check_exponent(coeff) {
            0 => {}
            1 => izip!(res, x).for_each(|(r, x)| *r *= *x),
            2 => izip!(res, x).for_each(|(r, x)| *r *= x.square()),
            3 => izip!(res, x).for_each(|(r, x)| *r *= x.cube()),
            e => izip!(res, x).for_each(|(r, x)| *r *= x.exp_u64(e)),
        }
    }

    fn scalar_into_vec(res: &mut [F], x: &F, coeff: i64) {
        let term = <Self as VecOperator<F>>::scalar_term(x, coeff);
        res.iter_mut().for_each(|r| *r *= term);
    }

    fn scalar_term(x: &F, coeff: i64) -> F {
        match check_exponent(coeff) {
            0 => F::ONE,
            1 => *x,
            2 => x.square(),
            3 => x.cube(),
            e => x.exp_u64(e),
        }
    }

    fn vec_term(res: &mut [F], x: &[F], coeff: i64) {
        assert_eq!(res.len(), x.len(), "operand length mismatch");
        match check_exponent(coeff) {
            0 => res.fill(F::ONE),
            1 => res.copy_from_slice(x),
            2 => izip!(res, x).for_each(|(r, x)| *r = x.square()),
            3 => izip!(res, x).for_each(|(r, x)| *r = x.cube()),
            e => izip!(res, x).for_each(|(r, x)| *r = x.exp_u64(e)),
        }
    }

    fn is_absorbing(term: &F) -> bool {
        term.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    use super::*;

    type F = BabyBear;

    #[test]
    fn lin_comb_scalar_rules_match_generic_multiply() {
        let x = F::from_u64(12345);
        for coeff in [-5i64, -2, -1, 0, 1, 2, 3, 7] {
            let mut res = F::from_u64(99);
            <LinCombOp as VecOperator<F>>::scalar_into_scalar(&mut res, &x, coeff);
            assert_eq!(res, F::from_u64(99) + x * field_from_i64::<F>(coeff), "coeff {coeff}");

            let term = <LinCombOp as VecOperator<F>>::scalar_term(&x, coeff);
            assert_eq!(term, x * field_from_i64::<F>(coeff), "coeff {coeff}");
        }
    }

    #[test]
    fn product_scalar_rules_match_generic_exponentiation() {
        let x = F::from_u64(12345);
        for coeff in [0i64, 1, 2, 3, 4, 11] {
            let mut res = F::from_u64(99);
            <ProductOp as VecOperator<F>>::scalar_into_scalar(&mut res, &x, coeff);
            assert_eq!(res, F::from_u64(99) * x.exp_u64(coeff as u64), "exp {coeff}");
        }
    }

    #[test]
    fn product_of_zero_base_and_zero_exponent_is_one() {
        assert_eq!(<ProductOp as VecOperator<F>>::scalar_term(&F::ZERO, 0), F::ONE);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn product_rejects_negative_exponents() {
        let _ = <ProductOp as VecOperator<F>>::scalar_term(&F::ONE, -1);
    }

    #[test]
    fn vec_rules_agree_with_scalar_rules() {
        let xs = [F::from_u64(3), F::from_u64(0), F::from_u64(77)];
        for coeff in [-2i64, 0, 1, 3, 6] {
            let mut acc = vec![F::from_u64(5); 3];
            LinCombOp::vec_into_vec(&mut acc, &xs, coeff);
            for (r, x) in acc.iter().zip(&xs) {
                let mut expected = F::from_u64(5);
                <LinCombOp as VecOperator<F>>::scalar_into_scalar(&mut expected, x, coeff);
                assert_eq!(*r, expected);
            }
        }
        for coeff in [0i64, 1, 2, 5] {
            let mut acc = vec![F::from_u64(5); 3];
            ProductOp::vec_into_vec(&mut acc, &xs, coeff);
            let mut init = vec![F::ZERO; 3];
            ProductOp::vec_term(&mut init, &xs, coeff);
            for ((r, x), t) in acc.iter().zip(&xs).zip(&init) {
                let mut expected = F::from_u64(5);
                <ProductOp as VecOperator<F>>::scalar_into_scalar(&mut expected, x, coeff);
                assert_eq!(*r, expected);
                assert_eq!(*t, <ProductOp as VecOperator<F>>::scalar_term(x, coeff));
            }
        }
    }
}
