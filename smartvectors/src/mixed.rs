//! Combinations over mixed base- and extension-field operands
//!
//! Constraint folding combines base-field witness columns with
//! extension-field accumulators. Running the whole combination in the
//! extension would pay the extension arithmetic cost on every base operand,
//! so [`process_operator_mixed`] partitions the operand list by field, folds
//! each partition with the base engine at its native cost, and merges the
//! two partial results in the extension with the identity rule.

use alloc::vec::Vec;

use p3_field::{ExtensionField, Field};

use crate::arithmetic::process_operator;
use crate::ops::{LinCombOp, ProductOp, VecOperator};
use crate::pool::BufferPool;
use crate::vector::SmartVector;

/// A vector whose elements live either in the base field or in the
/// extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MixedVector<F, EF> {
    Base(SmartVector<F>),
    Ext(SmartVector<EF>),
}

impl<F: Field, EF: ExtensionField<F>> MixedVector<F, EF> {
    pub fn len(&self) -> usize {
        match self {
            MixedVector::Base(v) => v.len(),
            MixedVector::Ext(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The element at position `i`, lifted into the extension.
    pub fn get(&self, i: usize) -> EF {
        match self {
            MixedVector::Base(v) => EF::from(v.get(i)),
            MixedVector::Ext(v) => v.get(i),
        }
    }
}

/// Lifts a base-field vector into the extension, preserving its
/// representation: constants stay constants, windows stay windows.
pub fn lift_to_ext<F: Field, EF: ExtensionField<F>>(v: &SmartVector<F>) -> SmartVector<EF> {
    match v {
        SmartVector::Constant { value, len } => SmartVector::constant(EF::from(*value), *len),
        SmartVector::Regular(values) => {
            SmartVector::regular(values.iter().map(|x| EF::from(*x)).collect())
        }
        SmartVector::Rotated { base, offset } => {
            SmartVector::rotated(base.iter().map(|x| EF::from(*x)).collect(), *offset)
        }
        SmartVector::Windowed {
            window,
            padding,
            offset,
            len,
        } => SmartVector::windowed(
            window.iter().map(|x| EF::from(*x)).collect(),
            EF::from(*padding),
            *offset,
            *len,
        ),
    }
}

/// The weighted sum of mixed-field operands; see [`crate::lin_comb`].
pub fn lin_comb_mixed<F: Field, EF: ExtensionField<F>>(
    coeffs: &[i64],
    vecs: &[&MixedVector<F, EF>],
) -> SmartVector<EF> {
    process_operator_mixed::<F, EF, LinCombOp>(coeffs, vecs, None)
}

/// The weighted product of mixed-field operands; see [`crate::product`].
pub fn product_mixed<F: Field, EF: ExtensionField<F>>(
    exponents: &[i64],
    vecs: &[&MixedVector<F, EF>],
) -> SmartVector<EF> {
    process_operator_mixed::<F, EF, ProductOp>(exponents, vecs, None)
}

/// Runs the n-ary operator over mixed-field operands, producing an
/// extension-field result.
///
/// The base partition folds first: when its result absorbs the whole
/// operation (the zero constant of a product), the extension operands are
/// skipped entirely, mirroring the single-field short circuit. Otherwise
/// both partial results merge in the extension at coefficient 1, which is
/// the identity rule of either operator.
pub fn process_operator_mixed<F, EF, Op>(
    coeffs: &[i64],
    vecs: &[&MixedVector<F, EF>],
    pool: Option<&BufferPool<EF>>,
) -> SmartVector<EF>
where
    F: Field,
    EF: ExtensionField<F>,
    Op: VecOperator<F> + VecOperator<EF>,
{
    assert!(!vecs.is_empty(), "no operand to process");
    assert_eq!(coeffs.len(), vecs.len(), "one coefficient per operand required");

    let mut base_coeffs = Vec::new();
    let mut base_vecs: Vec<&SmartVector<F>> = Vec::new();
    let mut ext_coeffs = Vec::new();
    let mut ext_vecs: Vec<&SmartVector<EF>> = Vec::new();
    for (coeff, v) in coeffs.iter().zip(vecs) {
        match v {
            MixedVector::Base(v) => {
                base_coeffs.push(*coeff);
                base_vecs.push(v);
            }
            MixedVector::Ext(v) => {
                ext_coeffs.push(*coeff);
                ext_vecs.push(v);
            }
        }
    }

    if base_vecs.is_empty() {
        return process_operator::<EF, Op>(&ext_coeffs, &ext_vecs, pool);
    }
    let base_part = process_operator::<F, Op>(&base_coeffs, &base_vecs, None);
    if ext_vecs.is_empty() {
        return lift_to_ext(&base_part);
    }

    if let SmartVector::Constant { value, len } = &base_part {
        if <Op as VecOperator<F>>::is_absorbing(value) {
            return SmartVector::constant(EF::from(*value), *len);
        }
    }

    let ext_part = process_operator::<EF, Op>(&ext_coeffs, &ext_vecs, pool);
    let lifted = lift_to_ext(&base_part);
    process_operator::<EF, Op>(&[1, 1], &[&lifted, &ext_part], pool)
}
