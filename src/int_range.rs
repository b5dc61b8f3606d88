use std::cmp::{max, min};
use std::fmt;

/// Span of breakend positions on one chromosome, in the half-closed [start,end) convention
///
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    /// Range covering the single position `pos`
    pub fn from_int(pos: i64) -> Self {
        Self::from_pair(pos, pos + 1)
    }

    pub fn from_pair(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    pub fn encloses(&self, other: &IntRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Extend this range to also cover `other`
    pub fn merge(&mut self, other: &IntRange) {
        self.start = min(self.start, other.start);
        self.end = max(self.end, other.end);
    }
}

impl fmt::Debug for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}

/// Shared part of two ranges, None if they are disjoint or only adjacent
///
pub fn get_overlap_range(r1: &IntRange, r2: &IntRange) -> Option<IntRange> {
    let overlap = IntRange::from_pair(max(r1.start, r2.start), min(r1.end, r2.end));
    (overlap.size() > 0).then_some(overlap)
}
