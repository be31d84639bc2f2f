//! Circular interval arithmetic
//!
//! The windowed vector representation and the operator-merging pass both
//! reason about ranges of positions modulo the vector length. This module
//! implements that geometry: half-open intervals `[start, start+len)` on a
//! circle of `circle_len` positions, with wrap-around past the end treated as
//! a first-class case.

use alloc::vec::Vec;

/// A non-empty half-open interval on a circle of `circle_len` positions.
///
/// The interval starts at `start` (inclusive) and covers `len` positions,
/// wrapping past `circle_len - 1` back to 0 if needed. An interval of length
/// 0 is meaningless here and the constructors reject it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircularInterval {
    circle_len: usize,
    start: usize,
    len: usize,
}

impl CircularInterval {
    /// Interval of `len` positions starting at `start`.
    pub fn with_start_len(start: usize, len: usize, circle_len: usize) -> Self {
        assert!(circle_len > 0, "circle length must be positive");
        assert!(
            len > 0 && len <= circle_len,
            "interval length must be in 1..={circle_len}, got {len}"
        );
        assert!(start < circle_len, "start {start} out of circle {circle_len}");
        Self {
            circle_len,
            start,
            len,
        }
    }

    /// Interval from `start` (inclusive) to `stop` (exclusive), going
    /// clockwise. `start == stop` denotes the full circle.
    pub fn with_start_stop(start: usize, stop: usize, circle_len: usize) -> Self {
        let len = if stop > start {
            stop - start
        } else {
            stop + circle_len - start
        };
        Self::with_start_len(start, len, circle_len)
    }

    /// The interval covering the whole circle.
    pub fn full_circle(circle_len: usize) -> Self {
        Self::with_start_len(0, circle_len, circle_len)
    }

    pub fn circle_len(&self) -> usize {
        self.circle_len
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end position, reduced modulo the circle length.
    pub fn stop(&self) -> usize {
        (self.start + self.len) % self.circle_len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the interval runs past the end of the circle. The full circle
    /// does not count as wrapping.
    pub fn wraps_around(&self) -> bool {
        self.stop() < self.start
    }

    pub fn is_full_circle(&self) -> bool {
        self.len == self.circle_len
    }

    /// Whether `point` lies inside the interval.
    pub fn includes(&self, point: usize) -> bool {
        assert!(point < self.circle_len, "point outside of the circle");
        // Position of the point walking clockwise from start.
        let rel = (point + self.circle_len - self.start) % self.circle_len;
        rel < self.len
    }

    /// Whether every position of `other` is also in `self`.
    pub fn fully_contains(&self, other: &Self) -> bool {
        assert_eq!(self.circle_len, other.circle_len, "circle size mismatch");
        if self.is_full_circle() {
            return true;
        }
        if other.len > self.len {
            return false;
        }
        let rel = (other.start + self.circle_len - self.start) % self.circle_len;
        rel + other.len <= self.len
    }

    /// Merges two intervals that overlap or touch into their union, returning
    /// `None` when they are disjoint with a gap on both sides. Adjacency
    /// counts as touching, so the union of `[2,5)` and `[5,9)` is `[2,9)`.
    /// When the two intervals jointly cover everything, the result is the
    /// full circle.
    pub fn try_overlap_with(&self, other: &Self) -> Option<Self> {
        assert_eq!(self.circle_len, other.circle_len, "circle size mismatch");
        let circle = self.circle_len;

        if self.is_full_circle() || other.is_full_circle() {
            return Some(Self::full_circle(circle));
        }
        if self.fully_contains(other) {
            return Some(*self);
        }
        if other.fully_contains(self) {
            return Some(*other);
        }

        // `other` begins inside `self` or immediately after it.
        let touch_fwd = self.includes(other.start) || self.stop() == other.start;
        // Symmetrically, `self` begins inside `other` or immediately after.
        let touch_bwd = other.includes(self.start) || other.stop() == self.start;

        match (touch_fwd, touch_bwd) {
            (false, false) => None,
            // Both ends chain into each other and neither interval contains
            // the other: together they go all the way around.
            (true, true) => Some(Self::full_circle(circle)),
            (true, false) => {
                let rel = (other.start + circle - self.start) % circle;
                let len = (rel + other.len).min(circle);
                Some(Self::with_start_len(self.start, len, circle))
            }
            (false, true) => {
                let rel = (self.start + circle - other.start) % circle;
                let len = (rel + self.len).min(circle);
                Some(Self::with_start_len(other.start, len, circle))
            }
        }
    }
}

/// Computes the shortest circular interval covering every input interval.
///
/// The intervals are sorted by start position and greedily merged into
/// disjoint groups with [`CircularInterval::try_overlap_with`]. Sorting by
/// start does not know about the origin, so a trailing group that wraps
/// around is then merged back into the first one. If several disjoint groups
/// remain, the shortest cover is the complement of the largest gap between
/// consecutive groups.
pub fn smallest_cover_interval(intervals: &[CircularInterval]) -> CircularInterval {
    assert!(!intervals.is_empty(), "no interval to cover");
    let circle = intervals[0].circle_len();
    assert!(
        intervals.iter().all(|i| i.circle_len() == circle),
        "circle size mismatch"
    );

    if intervals.iter().any(|i| i.is_full_circle()) {
        return CircularInterval::full_circle(circle);
    }

    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|i| i.start());

    // Greedy pass over the sorted intervals.
    let mut groups: Vec<CircularInterval> = Vec::new();
    let mut cur = sorted[0];
    for ival in &sorted[1..] {
        match cur.try_overlap_with(ival) {
            Some(merged) => cur = merged,
            None => {
                groups.push(cur);
                cur = *ival;
            }
        }
    }
    groups.push(cur);

    // The last group may wrap around the origin and meet the first one.
    if groups.len() > 1 {
        let last = groups[groups.len() - 1];
        if let Some(merged) = last.try_overlap_with(&groups[0]) {
            groups[0] = merged;
            groups.pop();
        }
    }

    if groups.len() == 1 {
        return groups[0];
    }
    if groups[0].is_full_circle() {
        return groups[0];
    }

    // Several disjoint groups: drop the largest gap, keep everything else.
    let mut largest_gap = 0;
    let mut pos_after_gap = 0;
    for (i, group) in groups.iter().enumerate() {
        let next = &groups[(i + 1) % groups.len()];
        let gap = (next.start() + circle - group.stop()) % circle;
        if gap > largest_gap {
            largest_gap = gap;
            pos_after_gap = (i + 1) % groups.len();
        }
    }
    let start = groups[pos_after_gap].start();
    CircularInterval::with_start_len(start, circle - largest_gap, circle)
}
