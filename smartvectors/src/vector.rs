//! The smart-vector representations
//!
//! A [`SmartVector`] is a fixed-length sequence of field elements stored in
//! whichever of four representations is cheapest for its shape. All variants
//! agree position-for-position with their dense materialization; the
//! arithmetic in [`crate::arithmetic`] and the transforms in [`crate::fft`]
//! exploit the representation without changing the semantics.
//!
//! Smart-vectors are conceptually immutable: every operation returns a new
//! vector, and `Clone` is a deep copy since each variant owns its storage.
//! The variant fields are public for the benefit of the engine layers; do not
//! mutate a vector after construction.

use alloc::vec;
use alloc::vec::Vec;

use p3_field::Field;

use crate::interval::CircularInterval;

/// A fixed-length vector of field elements with a structure-aware
/// representation.
///
/// Zero-length vectors are invalid in every representation and are rejected
/// at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SmartVector<F> {
    /// The same `value` at all `len` positions.
    Constant { value: F, len: usize },
    /// A plain dense vector, one element per position.
    Regular(Vec<F>),
    /// `base` cyclically shifted: position `i` reads
    /// `base[(i + offset) % len]`. The shift is never materialized; the
    /// offset is reduced lazily on access, not at construction.
    Rotated { base: Vec<F>, offset: usize },
    /// A padded circular window: `padding` everywhere except on the circular
    /// interval `[offset, offset + window.len())` (mod `len`), which holds
    /// `window`. The window is strictly smaller than the vector; the offset
    /// is normalized into `[0, len)` at construction.
    Windowed {
        window: Vec<F>,
        padding: F,
        offset: usize,
        len: usize,
    },
}

impl<F: Field> SmartVector<F> {
    /// A vector holding `value` at every position.
    pub fn constant(value: F, len: usize) -> Self {
        assert!(len > 0, "smart-vectors of length 0 are forbidden");
        Self::Constant { value, len }
    }

    /// A dense vector.
    pub fn regular(values: Vec<F>) -> Self {
        assert!(!values.is_empty(), "smart-vectors of length 0 are forbidden");
        Self::Regular(values)
    }

    /// A lazily rotated dense vector; see [`SmartVector::Rotated`].
    pub fn rotated(base: Vec<F>, offset: usize) -> Self {
        assert!(!base.is_empty(), "smart-vectors of length 0 are forbidden");
        Self::Rotated { base, offset }
    }

    /// A padded circular window; see [`SmartVector::Windowed`].
    pub fn windowed(window: Vec<F>, padding: F, offset: usize, len: usize) -> Self {
        assert!(!window.is_empty(), "the window of a windowed vector cannot be empty");
        assert!(
            window.len() < len,
            "the window (len={}) must be strictly smaller than the vector (len={}), use a regular vector instead",
            window.len(),
            len
        );
        Self::Windowed {
            window,
            padding,
            offset: offset % len,
            len,
        }
    }

    /// `values` padded with `padding` on the left up to `target_len`.
    ///
    /// Degenerate shapes collapse: an empty `values` gives a constant and a
    /// full-length `values` gives a regular vector.
    pub fn left_padded(values: Vec<F>, padding: F, target_len: usize) -> Self {
        assert!(
            values.len() <= target_len,
            "unpadded vector (length={}) must be smaller than the target length ({})",
            values.len(),
            target_len
        );
        if values.len() == target_len {
            return Self::regular(values);
        }
        if values.is_empty() {
            return Self::constant(padding, target_len);
        }
        let offset = target_len - values.len();
        Self::windowed(values, padding, offset, target_len)
    }

    /// `values` padded with `padding` on the right up to `target_len`.
    pub fn right_padded(values: Vec<F>, padding: F, target_len: usize) -> Self {
        assert!(
            values.len() <= target_len,
            "unpadded vector (length={}) must be smaller than the target length ({})",
            values.len(),
            target_len
        );
        if values.len() == target_len {
            return Self::regular(values);
        }
        if values.is_empty() {
            return Self::constant(padding, target_len);
        }
        Self::windowed(values, padding, 0, target_len)
    }

    /// `values` padded with zeroes on the left up to `target_len`.
    pub fn left_zero_padded(values: Vec<F>, target_len: usize) -> Self {
        Self::left_padded(values, F::ZERO, target_len)
    }

    /// `values` padded with zeroes on the right up to `target_len`.
    pub fn right_zero_padded(values: Vec<F>, target_len: usize) -> Self {
        Self::right_padded(values, F::ZERO, target_len)
    }

    /// The number of positions. Always strictly positive.
    pub fn len(&self) -> usize {
        match self {
            Self::Constant { len, .. } => *len,
            Self::Regular(values) => values.len(),
            Self::Rotated { base, .. } => base.len(),
            Self::Windowed { len, .. } => *len,
        }
    }

    /// Smart-vectors are never empty; this exists to satisfy the
    /// `len`/`is_empty` lint convention.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The element at position `i`.
    pub fn get(&self, i: usize) -> F {
        let n = self.len();
        assert!(i < n, "position {i} out of bounds for length {n}");
        match self {
            Self::Constant { value, .. } => *value,
            Self::Regular(values) => values[i],
            Self::Rotated { base, offset } => base[(i + offset % n) % n],
            Self::Windowed {
                window,
                padding,
                offset,
                len,
            } => {
                let rel = (i + len - offset) % len;
                if rel < window.len() {
                    window[rel]
                } else {
                    *padding
                }
            }
        }
    }

    /// The sub-vector covering positions `start..stop`, mirroring
    /// `slice[start..stop]`. The range must be non-empty and in bounds.
    pub fn sub_vector(&self, start: usize, stop: usize) -> Self {
        let n = self.len();
        assert!(start < stop, "invalid sub-vector range [{start}, {stop})");
        assert!(stop <= n, "sub-vector range [{start}, {stop}) out of bounds for length {n}");
        match self {
            Self::Constant { value, .. } => Self::constant(*value, stop - start),
            Self::Regular(values) => Self::regular(values[start..stop].to_vec()),
            Self::Rotated { .. } => {
                Self::regular((start..stop).map(|i| self.get(i)).collect())
            }
            Self::Windowed {
                window,
                padding,
                offset,
                len,
            } => {
                // All of the requested range in the padding area: the result
                // stays compact. Anything else is materialized.
                let iv = CircularInterval::with_start_len(*offset, window.len(), *len);
                if (start..stop).all(|p| !iv.includes(p)) {
                    return Self::constant(*padding, stop - start);
                }
                Self::regular((start..stop).map(|i| self.get(i)).collect())
            }
        }
    }

    /// Cyclically rotates the vector: position `i` of the result reads
    /// position `(i + offset) % len` of `self`. The rotation is not
    /// materialized.
    pub fn rotate_right(&self, offset: usize) -> Self {
        let n = self.len();
        match self {
            Self::Constant { .. } => self.clone(),
            Self::Regular(values) => Self::Rotated {
                base: values.clone(),
                offset,
            },
            Self::Rotated {
                base,
                offset: prev,
            } => Self::Rotated {
                base: base.clone(),
                offset: (prev + offset) % n,
            },
            Self::Windowed {
                window,
                padding,
                offset: w_offset,
                len,
            } => Self::Windowed {
                window: window.clone(),
                padding: *padding,
                offset: (w_offset + len - offset % len) % len,
                len: *len,
            },
        }
    }

    /// Materializes the vector into `buf`, which must have exactly `len`
    /// elements.
    pub fn write_into(&self, buf: &mut [F]) {
        let n = self.len();
        assert_eq!(buf.len(), n, "target buffer length mismatch");
        match self {
            Self::Constant { value, .. } => buf.fill(*value),
            Self::Regular(values) => buf.copy_from_slice(values),
            Self::Rotated { base, offset } => {
                let offset = offset % n;
                buf[..n - offset].copy_from_slice(&base[offset..]);
                buf[n - offset..].copy_from_slice(&base[..offset]);
            }
            Self::Windowed {
                window,
                padding,
                offset,
                len,
            } => {
                buf.fill(*padding);
                let w = window.len();
                if offset + w <= *len {
                    buf[*offset..offset + w].copy_from_slice(window);
                } else {
                    // The window wraps past the end of the vector.
                    let head = len - offset;
                    buf[*offset..].copy_from_slice(&window[..head]);
                    buf[..w - head].copy_from_slice(&window[head..]);
                }
            }
        }
    }

    /// Materializes the vector into a freshly allocated `Vec`.
    pub fn to_vec(&self) -> Vec<F> {
        match self {
            Self::Regular(values) => values.clone(),
            _ => {
                let mut buf = vec![F::ZERO; self.len()];
                self.write_into(&mut buf);
                buf
            }
        }
    }

    /// The size of the concrete backing storage, a proxy for the memory the
    /// vector occupies.
    pub fn density(&self) -> usize {
        match self {
            Self::Constant { .. } => 0,
            Self::Regular(values) => values.len(),
            Self::Rotated { base, .. } => base.len(),
            Self::Windowed { window, .. } => window.len(),
        }
    }

    /// The padding value for representations that have one.
    pub fn padding_val(&self) -> Option<F> {
        match self {
            Self::Constant { value, .. } => Some(*value),
            Self::Windowed { padding, .. } => Some(*padding),
            _ => None,
        }
    }

    /// The circular interval occupied by the explicit values of a windowed
    /// vector, with a normalized offset.
    pub(crate) fn window_interval(&self) -> Option<CircularInterval> {
        match self {
            Self::Windowed {
                window,
                offset,
                len,
                ..
            } => Some(CircularInterval::with_start_len(*offset, window.len(), *len)),
            _ => None,
        }
    }

    /// Attempts to rewrite a regular vector into a cheaper representation:
    /// a constant if all values are equal, or a right-padded window if the
    /// tail repeats the last value often enough to be worth it. Returns the
    /// rewritten vector and the number of field elements saved.
    pub fn try_reduce_size_right(&self) -> (Self, usize) {
        let values = match self {
            Self::Regular(values) if values.len() > 1 => values,
            _ => return (self.clone(), 0),
        };
        let n = values.len();

        if let Some(value) = uniform_value(values) {
            return (Self::constant(value, n), n);
        }

        let last = values[n - 1];
        let tail_start = values
            .iter()
            .rposition(|v| *v != last)
            .map(|p| p + 1)
            .unwrap_or(0);

        // Saving fewer than 1000 elements is not worth losing the dense
        // layout.
        if n - tail_start < MIN_REDUCTION_SAVING {
            return (self.clone(), 0);
        }
        let saved = n - tail_start;
        (
            Self::right_padded(values[..tail_start].to_vec(), last, n),
            saved,
        )
    }

    /// Mirror of [`SmartVector::try_reduce_size_right`] for a repeated head:
    /// a constant if all values are equal, or a left-padded window if the
    /// head repeats the first value often enough to be worth it.
    pub fn try_reduce_size_left(&self) -> (Self, usize) {
        let values = match self {
            Self::Regular(values) if values.len() > 1 => values,
            _ => return (self.clone(), 0),
        };
        let n = values.len();

        if let Some(value) = uniform_value(values) {
            return (Self::constant(value, n), n);
        }

        let first = values[0];
        // Not uniform, so some later element differs from the first.
        let head_len = values
            .iter()
            .position(|v| *v != first)
            .unwrap_or(0);

        if head_len < MIN_REDUCTION_SAVING {
            return (self.clone(), 0);
        }
        (
            Self::left_padded(values[head_len..].to_vec(), first, n),
            head_len,
        )
    }
}

/// Rewriting a dense vector as a padded window saves fewer allocations than
/// it costs below this many elements.
const MIN_REDUCTION_SAVING: usize = 1000;

/// The shared value of a uniform slice, probing a few spread-out positions
/// before paying for the full scan. The slice must have at least two
/// elements.
fn uniform_value<F: Field>(values: &[F]) -> Option<F> {
    let n = values.len();
    let uniform = values[0] == values[1]
        && values[0] == values[n - 1]
        && values[0] == values[n / 2]
        && values.iter().all(|v| *v == values[0]);
    uniform.then_some(values[0])
}

impl<F: Field> From<Vec<F>> for SmartVector<F> {
    fn from(values: Vec<F>) -> Self {
        Self::regular(values)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    use super::*;
    use crate::testutil::{from_u64s, rand_vec, sample_vectors};

    type F = BabyBear;

    #[test]
    fn get_matches_dense_semantics() {
        for v in sample_vectors::<F>(16, 0) {
            let dense = v.to_vec();
            assert_eq!(dense.len(), 16);
            for (i, x) in dense.iter().enumerate() {
                assert_eq!(v.get(i), *x, "position {i} of {v:?}");
            }
        }
    }

    #[test]
    fn write_into_matches_get() {
        for v in sample_vectors(16, 1) {
            let mut buf = vec![F::ZERO; 16];
            v.write_into(&mut buf);
            let by_get: Vec<F> = (0..16).map(|i| v.get(i)).collect();
            assert_eq!(buf, by_get, "vector {v:?}");
        }
    }

    #[test]
    fn sub_vector_consistency() {
        for v in sample_vectors::<F>(16, 2) {
            for start in 0..16 {
                for stop in start + 1..=16 {
                    let sub = v.sub_vector(start, stop);
                    assert_eq!(sub.len(), stop - start);
                    for i in 0..stop - start {
                        assert_eq!(sub.get(i), v.get(start + i));
                    }
                }
            }
        }
    }

    #[test]
    fn sub_vector_of_padding_area_stays_constant() {
        let v = SmartVector::windowed(from_u64s(&[1, 2, 3]), F::from_u64(9), 2, 16);
        assert_eq!(v.sub_vector(6, 12), SmartVector::constant(F::from_u64(9), 6));
        // Touching the window materializes.
        assert!(matches!(v.sub_vector(1, 4), SmartVector::Regular(_)));
    }

    #[test]
    fn rotation_group_law() {
        for v in sample_vectors::<F>(16, 3) {
            for o1 in [0usize, 1, 5, 15, 16, 31] {
                for o2 in [0usize, 3, 11, 16] {
                    let twice = v.rotate_right(o1).rotate_right(o2);
                    let once = v.rotate_right((o1 + o2) % 16);
                    assert_eq!(twice.to_vec(), once.to_vec(), "o1={o1} o2={o2} v={v:?}");
                }
            }
        }
    }

    #[test]
    fn rotation_reads_shifted_positions() {
        let v = SmartVector::regular(from_u64s::<F>(&[0, 1, 2, 3, 4, 5, 6, 7]));
        let r = v.rotate_right(3);
        for i in 0..8 {
            assert_eq!(r.get(i), v.get((i + 3) % 8));
        }
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let original = SmartVector::regular(rand_vec::<F>(8, 4));
        let copied = original.clone();
        assert_eq!(original.to_vec(), copied.to_vec());
        if let SmartVector::Regular(mut values) = copied {
            values[0] += F::ONE;
            assert_ne!(values[0], original.get(0));
        } else {
            panic!("clone changed the representation");
        }
    }

    #[test]
    fn padded_constructors() {
        let w = from_u64s(&[1, 2, 3]);
        let pad = F::from_u64(7);

        let left = SmartVector::left_padded(w.clone(), pad, 8);
        assert_eq!(left.to_vec(), from_u64s(&[7, 7, 7, 7, 7, 1, 2, 3]));

        let right = SmartVector::right_padded(w.clone(), pad, 8);
        assert_eq!(right.to_vec(), from_u64s(&[1, 2, 3, 7, 7, 7, 7, 7]));

        let zero = SmartVector::right_zero_padded(w.clone(), 8);
        assert_eq!(zero.to_vec(), from_u64s(&[1, 2, 3, 0, 0, 0, 0, 0]));

        // Full-length input degenerates to a regular vector, empty input to
        // a constant.
        assert!(matches!(
            SmartVector::left_padded(from_u64s(&[1, 2]), pad, 2),
            SmartVector::Regular(_)
        ));
        assert_eq!(
            SmartVector::left_padded(Vec::new(), pad, 4),
            SmartVector::constant(pad, 4)
        );
    }

    #[test]
    fn wrapping_window_materialization() {
        // Window of length 5 starting at 6 on a circle of 8: wraps over the
        // end into positions 6, 7, 0, 1, 2.
        let v = SmartVector::windowed(from_u64s(&[1, 2, 3, 4, 5]), F::ZERO, 6, 8);
        assert_eq!(v.to_vec(), from_u64s(&[3, 4, 5, 0, 0, 0, 1, 2]));
    }

    #[test]
    #[should_panic(expected = "length 0")]
    fn zero_length_constant_is_rejected() {
        let _ = SmartVector::constant(F::ONE, 0);
    }

    #[test]
    #[should_panic(expected = "length 0")]
    fn zero_length_regular_is_rejected() {
        let _ = SmartVector::<F>::regular(Vec::new());
    }

    #[test]
    #[should_panic(expected = "strictly smaller")]
    fn full_length_window_is_rejected() {
        let _ = SmartVector::windowed(rand_vec::<F>(8, 5), F::ZERO, 0, 8);
    }

    #[test]
    #[should_panic(expected = "cannot be empty")]
    fn empty_window_is_rejected() {
        let _ = SmartVector::windowed(Vec::new(), F::ZERO, 0, 8);
    }

    #[test]
    fn window_offset_is_normalized() {
        let v = SmartVector::windowed(from_u64s(&[1, 2]), F::ZERO, 19, 8);
        assert_eq!(v.window_interval().unwrap().start(), 3);
    }

    #[test]
    fn try_reduce_size_right_detects_constant() {
        let v = SmartVector::regular(vec![F::from_u64(4); 64]);
        let (reduced, saved) = v.try_reduce_size_right();
        assert_eq!(reduced, SmartVector::constant(F::from_u64(4), 64));
        assert_eq!(saved, 64);
    }

    #[test]
    fn try_reduce_size_right_detects_long_tail() {
        let mut values = rand_vec::<F>(64, 6);
        values.extend(vec![F::from_u64(3); 2000]);
        let v = SmartVector::regular(values.clone());
        let (reduced, saved) = v.try_reduce_size_right();
        assert_eq!(saved, 2000);
        assert_eq!(reduced.to_vec(), values);
        assert!(matches!(reduced, SmartVector::Windowed { .. }));
    }

    #[test]
    fn try_reduce_size_right_keeps_short_tails_dense() {
        let mut values = rand_vec::<F>(8, 7);
        values.extend(vec![F::from_u64(3); 10]);
        let v = SmartVector::regular(values);
        let (reduced, saved) = v.try_reduce_size_right();
        assert_eq!(saved, 0);
        assert_eq!(reduced, v);
    }

    #[test]
    fn try_reduce_size_left_detects_constant() {
        let v = SmartVector::regular(vec![F::from_u64(4); 64]);
        let (reduced, saved) = v.try_reduce_size_left();
        assert_eq!(reduced, SmartVector::constant(F::from_u64(4), 64));
        assert_eq!(saved, 64);
    }

    #[test]
    fn try_reduce_size_left_detects_long_head() {
        let mut values = vec![F::from_u64(3); 2000];
        values.extend(rand_vec::<F>(64, 8));
        let v = SmartVector::regular(values.clone());
        let (reduced, saved) = v.try_reduce_size_left();
        assert_eq!(saved, 2000);
        assert_eq!(reduced.to_vec(), values);
        assert!(matches!(reduced, SmartVector::Windowed { .. }));
        // A repeated head becomes left padding, so the window sits at the
        // tail.
        assert_eq!(reduced.window_interval().unwrap().start(), 2000);
        assert_eq!(reduced.padding_val(), Some(F::from_u64(3)));
    }

    #[test]
    fn try_reduce_size_left_keeps_short_heads_dense() {
        let mut values = vec![F::from_u64(3); 10];
        values.extend(rand_vec::<F>(8, 9));
        let v = SmartVector::regular(values);
        let (reduced, saved) = v.try_reduce_size_left();
        assert_eq!(saved, 0);
        assert_eq!(reduced, v);
    }
}
