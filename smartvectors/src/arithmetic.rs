//! The combination engine for n-ary weighted sums and products
//!
//! [`process_operator`] is the single entry point behind [`lin_comb`],
//! [`product`] and the convenience wrappers. Instead of materializing every
//! operand, it classifies the list by representation and folds each class
//! with the cheapest rule that is still exact:
//!
//! 1. Constant operands fold into one scalar term.
//! 2. Windowed operands fold over the smallest circular interval covering
//!    all their windows, so a sum of padded columns stays a padded column.
//! 3. Dense and rotated operands fold into a full-length accumulator, into
//!    which the constant and windowed partial results are then merged.
//!
//! The result is the smallest representation that matches the operand list:
//! constants stay constants, windows stay windows as long as their cover is
//! not the whole circle, and only genuinely dense inputs pay for a dense
//! output.

use alloc::vec;
use alloc::vec::Vec;

use itertools::izip;
use p3_field::Field;
use tracing::{debug, error};

use crate::interval::{smallest_cover_interval, CircularInterval};
use crate::ops::{LinCombOp, ProductOp, VecOperator};
use crate::pool::{BufferPool, PooledBuffer};
use crate::vector::SmartVector;

/// The weighted sum `Σ vecs[i] * coeffs[i]` with signed integer
/// coefficients.
pub fn lin_comb<F: Field>(coeffs: &[i64], vecs: &[&SmartVector<F>]) -> SmartVector<F> {
    process_operator::<F, LinCombOp>(coeffs, vecs, None)
}

/// As [`lin_comb`], drawing the dense accumulator from `pool` when the
/// computation goes dense.
pub fn lin_comb_with_pool<F: Field>(
    coeffs: &[i64],
    vecs: &[&SmartVector<F>],
    pool: &BufferPool<F>,
) -> SmartVector<F> {
    process_operator::<F, LinCombOp>(coeffs, vecs, Some(pool))
}

/// The weighted product `Π vecs[i] ^ exponents[i]` with non-negative
/// integer exponents.
pub fn product<F: Field>(exponents: &[i64], vecs: &[&SmartVector<F>]) -> SmartVector<F> {
    process_operator::<F, ProductOp>(exponents, vecs, None)
}

/// As [`product`], drawing the dense accumulator from `pool` when the
/// computation goes dense.
pub fn product_with_pool<F: Field>(
    exponents: &[i64],
    vecs: &[&SmartVector<F>],
    pool: &BufferPool<F>,
) -> SmartVector<F> {
    process_operator::<F, ProductOp>(exponents, vecs, Some(pool))
}

/// Position-wise sum of two vectors.
pub fn add<F: Field>(a: &SmartVector<F>, b: &SmartVector<F>) -> SmartVector<F> {
    lin_comb(&[1, 1], &[a, b])
}

/// Position-wise difference `a - b`.
pub fn sub<F: Field>(a: &SmartVector<F>, b: &SmartVector<F>) -> SmartVector<F> {
    lin_comb(&[1, -1], &[a, b])
}

/// Position-wise product of two vectors.
pub fn mul<F: Field>(a: &SmartVector<F>, b: &SmartVector<F>) -> SmartVector<F> {
    product(&[1, 1], &[a, b])
}

/// Multiplies every position of `v` by the scalar `x`.
pub fn scalar_mul<F: Field>(x: F, v: &SmartVector<F>) -> SmartVector<F> {
    mul(&SmartVector::constant(x, v.len()), v)
}

/// Runs the n-ary operator `Op` over `(coeffs[i], vecs[i])` pairs.
///
/// All operands must share the same length. The one deliberate exception:
/// when a product's constant operands fold to zero, the result is zero and
/// the remaining operands are skipped entirely, shapes unchecked. See the
/// module documentation for the classification strategy.
pub fn process_operator<F: Field, Op: VecOperator<F>>(
    coeffs: &[i64],
    vecs: &[&SmartVector<F>],
    pool: Option<&BufferPool<F>>,
) -> SmartVector<F> {
    assert!(!vecs.is_empty(), "no operand to process");
    assert_eq!(coeffs.len(), vecs.len(), "one coefficient per operand required");
    let length = vecs[0].len();

    // First pass: fold the constant operands into a single scalar term.
    let mut const_term: Option<F> = None;
    let mut matched_const = 0usize;
    for (coeff, v) in izip!(coeffs, vecs) {
        if let SmartVector::Constant { value, len } = v {
            assert_eq!(*len, length, "operand length mismatch");
            match const_term.as_mut() {
                None => const_term = Some(Op::scalar_term(value, *coeff)),
                Some(term) => Op::scalar_into_scalar(term, value, *coeff),
            }
            matched_const += 1;
        }
    }

    if let Some(term) = const_term {
        if matched_const == vecs.len() {
            return SmartVector::constant(term, length);
        }
        // A zero constant annihilates a product: the remaining operands
        // cannot change the result, so they are not even validated. This
        // also avoids materializing the positions a partial window leaves
        // unconstrained.
        if Op::is_absorbing(&term) {
            return SmartVector::constant(term, length);
        }
    }

    // Second pass: fold the windowed operands (and the constant term) over
    // the smallest cover of their windows.
    let (window_term, matched_window) =
        match process_windowed_only::<F, Op>(coeffs, vecs, const_term, length) {
            WindowedOutcome::NoneMatched => (None, 0),
            WindowedOutcome::Folded { vec, matched } => (Some(vec), matched),
            WindowedOutcome::FullCircle { matched } => {
                // The windows jointly cover the whole circle: there is no
                // windowed representation of the partial result. Convert
                // them to dense operands and recompute.
                debug!(
                    num_windows = matched,
                    length, "windows cover the full circle, recomputing densely"
                );
                let dense: Vec<SmartVector<F>> = vecs
                    .iter()
                    .map(|v| match v {
                        SmartVector::Windowed { .. } => SmartVector::regular(v.to_vec()),
                        _ => (*v).clone(),
                    })
                    .collect();
                let dense_refs: Vec<&SmartVector<F>> = dense.iter().collect();
                return process_operator::<F, Op>(coeffs, &dense_refs, pool);
            }
        };

    if matched_const + matched_window == vecs.len() {
        return window_term.expect("at least one window matched");
    }

    // Third pass: fold the dense and rotated operands.
    let mut acc: Vec<F> = match pool {
        Some(pool) => {
            assert_eq!(
                pool.buf_len(),
                length,
                "pool buffer length does not match the operand length"
            );
            pool.checkout().into_vec()
        }
        None => vec![F::ZERO; length],
    };
    let mut matched_regular = 0usize;
    let mut initialized = false;
    for (coeff, v) in izip!(coeffs, vecs) {
        let pooled_tmp: PooledBuffer<'_, F>;
        let owned_tmp: Vec<F>;
        let values: &[F] = match v {
            SmartVector::Regular(values) => values.as_slice(),
            // Applies the lazy shift into scratch storage. The pooled guard
            // drops at the end of the iteration, so later rotated operands
            // reuse the same buffer.
            SmartVector::Rotated { .. } => match pool {
                Some(pool) => {
                    let mut buf = pool.checkout();
                    v.write_into(&mut buf);
                    pooled_tmp = buf;
                    &pooled_tmp
                }
                None => {
                    owned_tmp = v.to_vec();
                    &owned_tmp
                }
            },
            _ => continue,
        };
        assert_eq!(values.len(), length, "operand length mismatch");
        if initialized {
            Op::vec_into_vec(&mut acc, values, *coeff);
        } else {
            Op::vec_term(&mut acc, values, *coeff);
            initialized = true;
        }
        matched_regular += 1;
    }

    let total_matched = matched_const + matched_window + matched_regular;
    if total_matched != vecs.len() {
        // A logic bug in this engine, not a caller error.
        error!(
            total_matched,
            num_operands = vecs.len(),
            "operand accounting mismatch in process_operator"
        );
        panic!(
            "internal error: operand accounting mismatch ({total_matched} matched out of {})",
            vecs.len()
        );
    }

    // Merge the partial results of the earlier passes. The constant term is
    // already part of the windowed term when both exist.
    if let Some(w) = &window_term {
        merge_window_into_dense::<F, Op>(&mut acc, w);
    } else if let Some(term) = const_term {
        Op::scalar_into_vec(&mut acc, &term, 1);
    }

    SmartVector::regular(acc)
}

enum WindowedOutcome<F> {
    /// No windowed operand in the list.
    NoneMatched,
    /// The windows jointly cover the whole circle; the caller must fall
    /// back to a dense computation.
    FullCircle { matched: usize },
    Folded {
        vec: SmartVector<F>,
        matched: usize,
    },
}

/// Folds the windowed operands (and the pre-accumulated constant term, if
/// any) into a single windowed partial result.
fn process_windowed_only<F: Field, Op: VecOperator<F>>(
    coeffs: &[i64],
    vecs: &[&SmartVector<F>],
    const_term: Option<F>,
    length: usize,
) -> WindowedOutcome<F> {
    let mut windows: Vec<(i64, &[F], F, CircularInterval)> = Vec::new();
    for (coeff, v) in izip!(coeffs, vecs) {
        if let SmartVector::Windowed {
            window,
            padding,
            len,
            ..
        } = v
        {
            assert_eq!(*len, length, "operand length mismatch");
            let interval = v.window_interval().expect("windowed vector");
            windows.push((*coeff, window.as_slice(), *padding, interval));
        }
    }
    if windows.is_empty() {
        return WindowedOutcome::NoneMatched;
    }

    let intervals: Vec<CircularInterval> = windows.iter().map(|w| w.3).collect();
    let cover = smallest_cover_interval(&intervals);
    if cover.is_full_circle() {
        return WindowedOutcome::FullCircle {
            matched: windows.len(),
        };
    }

    // Positions inside the cover but outside an operand's window hold that
    // operand's padding value, so initializing with the first operand means
    // filling with its padding term and overwriting its window range.
    let (coeff0, win0, pad0, iv0) = windows[0];
    let mut buf = vec![Op::scalar_term(&pad0, coeff0); cover.len()];
    let rel0 = (iv0.start() + length - cover.start()) % length;
    Op::vec_term(&mut buf[rel0..rel0 + win0.len()], win0, coeff0);
    let mut pad_acc = Op::scalar_term(&pad0, coeff0);

    for (coeff, win, pad, iv) in &windows[1..] {
        // The cover contains every window, so the relative range never runs
        // past the end of the buffer.
        let rel = (iv.start() + length - cover.start()) % length;
        Op::vec_into_vec(&mut buf[rel..rel + win.len()], win, *coeff);
        Op::scalar_into_vec(&mut buf[..rel], pad, *coeff);
        Op::scalar_into_vec(&mut buf[rel + win.len()..], pad, *coeff);
        Op::scalar_into_scalar(&mut pad_acc, pad, *coeff);
    }

    if let Some(term) = const_term {
        Op::scalar_into_vec(&mut buf, &term, 1);
        Op::scalar_into_scalar(&mut pad_acc, &term, 1);
    }

    WindowedOutcome::Folded {
        vec: SmartVector::windowed(buf, pad_acc, cover.start(), length),
        matched: windows.len(),
    }
}

/// Overlays a windowed partial result onto a dense accumulator with the
/// identity rule (`coeff = 1`). The wrap-around case splits the window into
/// two disjoint copies.
fn merge_window_into_dense<F: Field, Op: VecOperator<F>>(acc: &mut [F], w: &SmartVector<F>) {
    let SmartVector::Windowed {
        window,
        padding,
        offset,
        len,
    } = w
    else {
        panic!("internal error: windowed partial result has the wrong representation");
    };
    assert_eq!(acc.len(), *len, "operand length mismatch");

    let (offset, w_len) = (*offset, window.len());
    if offset + w_len <= *len {
        Op::vec_into_vec(&mut acc[offset..offset + w_len], window, 1);
        Op::scalar_into_vec(&mut acc[..offset], padding, 1);
        Op::scalar_into_vec(&mut acc[offset + w_len..], padding, 1);
    } else {
        let head = len - offset;
        Op::vec_into_vec(&mut acc[offset..], &window[..head], 1);
        Op::vec_into_vec(&mut acc[..w_len - head], &window[head..], 1);
        Op::scalar_into_vec(&mut acc[w_len - head..offset], padding, 1);
    }
}
