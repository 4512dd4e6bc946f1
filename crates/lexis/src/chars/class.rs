use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use super::CharRange;

/// A set of code units stored as a strictly increasing sequence of
/// non-overlapping, non-touching [`CharRange`]s.
///
/// The invariant for consecutive ranges `a`, `b` is `a.end() + 1 < b.start()`:
/// touching ranges are always fused. All constructors and operations preserve
/// this, so equality on the range list is set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CharClass {
    ranges: SmallVec<[CharRange; 4]>,
}

impl CharClass {
    /// The empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every code unit in `[0, 0xFFFF]`.
    #[must_use]
    pub fn any() -> Self {
        Self::of_range(CharRange::FULL)
    }

    /// ASCII decimal digits `0-9`.
    #[must_use]
    pub fn digit() -> Self {
        Self::of_range(CharRange::new(b'0'.into(), b'9'.into()))
    }

    /// ASCII letters `A-Z` and `a-z`.
    #[must_use]
    pub fn letter() -> Self {
        Self {
            ranges: SmallVec::from_slice(&[
                CharRange::new(b'A'.into(), b'Z'.into()),
                CharRange::new(b'a'.into(), b'z'.into()),
            ]),
        }
    }

    /// Whitespace: `\t \n \v \f \r` and space.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            ranges: SmallVec::from_slice(&[
                CharRange::new(0x09, 0x0D),
                CharRange::single(b' '.into()),
            ]),
        }
    }

    /// Word constituents: letters, digits, and underscore.
    #[must_use]
    pub fn word() -> Self {
        Self {
            ranges: SmallVec::from_slice(&[
                CharRange::new(b'0'.into(), b'9'.into()),
                CharRange::new(b'A'.into(), b'Z'.into()),
                CharRange::single(b'_'.into()),
                CharRange::new(b'a'.into(), b'z'.into()),
            ]),
        }
    }

    /// A class containing a single code unit.
    #[must_use]
    pub fn single(unit: u16) -> Self {
        Self::of_range(CharRange::single(unit))
    }

    /// A class containing one inclusive range. Empty input ranges yield the
    /// empty class.
    #[must_use]
    pub fn of_range(range: CharRange) -> Self {
        let mut ranges = SmallVec::new();
        if !range.is_empty() {
            ranges.push(range);
        }
        Self { ranges }
    }

    /// Build a class from arbitrary code units: sort, deduplicate, and fuse
    /// adjacent units into ranges.
    #[must_use]
    pub fn from_units(units: &[u16]) -> Self {
        let mut sorted: Vec<u16> = units.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut ranges = SmallVec::new();
        let mut iter = sorted.into_iter();
        let Some(first) = iter.next() else {
            return Self { ranges };
        };
        let mut start = first;
        let mut end = first;
        for unit in iter {
            if unit == end + 1 {
                end = unit;
            } else {
                ranges.push(CharRange::new(start, end));
                start = unit;
                end = unit;
            }
        }
        ranges.push(CharRange::new(start, end));
        Self { ranges }
    }

    /// Build a class from arbitrary (possibly overlapping, unsorted) ranges.
    #[must_use]
    pub fn from_ranges<I: IntoIterator<Item = CharRange>>(iter: I) -> Self {
        let mut input: Vec<CharRange> = iter.into_iter().filter(|r| !r.is_empty()).collect();
        input.sort_unstable();

        let mut ranges = SmallVec::new();
        let mut iter = input.into_iter();
        let Some(mut current) = iter.next() else {
            return Self { ranges };
        };
        for range in iter {
            if u32::from(range.start()) <= u32::from(current.end()) + 1 {
                if range.end() > current.end() {
                    current = CharRange::new(current.start(), range.end());
                }
            } else {
                ranges.push(current);
                current = range;
            }
        }
        ranges.push(current);
        Self { ranges }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The sorted, non-touching ranges of this class.
    #[must_use]
    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    /// Index of the range containing `unit`, if any.
    #[must_use]
    pub fn range_index_of(&self, unit: u16) -> Option<usize> {
        let idx = self.ranges.partition_point(|r| r.end() < unit);
        (idx < self.ranges.len() && self.ranges[idx].contains(unit)).then_some(idx)
    }

    #[must_use]
    pub fn contains(&self, unit: u16) -> bool {
        self.range_index_of(unit).is_some()
    }

    /// Set union by a linear two-pointer sweep. Runs in `O(|a| + |b|)` and
    /// fuses touching output ranges to keep the class invariant.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut ranges = SmallVec::new();
        let (mut a, mut b) = (self.ranges.iter().peekable(), other.ranges.iter().peekable());
        let mut next = || -> Option<CharRange> {
            match (a.peek(), b.peek()) {
                (Some(&&x), Some(&&y)) => {
                    if x <= y {
                        a.next();
                        Some(x)
                    } else {
                        b.next();
                        Some(y)
                    }
                }
                (Some(&&x), None) => {
                    a.next();
                    Some(x)
                }
                (None, Some(&&y)) => {
                    b.next();
                    Some(y)
                }
                (None, None) => None,
            }
        };

        let mut current = next().expect("both operands are non-empty");
        while let Some(range) = next() {
            if u32::from(range.start()) <= u32::from(current.end()) + 1 {
                if range.end() > current.end() {
                    current = CharRange::new(current.start(), range.end());
                }
            } else {
                ranges.push(current);
                current = range;
            }
        }
        ranges.push(current);
        Self { ranges }
    }

    /// Complement against the full code-unit range.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut ranges = SmallVec::new();
        let mut next_start: u32 = 0;
        for range in &self.ranges {
            if u32::from(range.start()) > next_start {
                #[allow(clippy::cast_possible_truncation)] // bounded by 0xFFFF
                ranges.push(CharRange::new(next_start as u16, range.start() - 1));
            }
            next_start = u32::from(range.end()) + 1;
        }
        if next_start <= u32::from(u16::MAX) {
            #[allow(clippy::cast_possible_truncation)]
            ranges.push(CharRange::new(next_start as u16, u16::MAX));
        }
        Self { ranges }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{range}")?;
        }
        write!(f, "]")
    }
}
