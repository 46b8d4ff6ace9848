//! Half-open text ranges measured in UTF-16 code units.
//!
//! Every tree query and edit operation in this crate is expressed in terms
//! of these ranges intersecting node boundaries. The UTF-16 unit matches the
//! hosting text surface (see the styled-text boundary contract); helpers for
//! mapping UTF-16 offsets onto Rust's UTF-8 strings live here too.

use std::fmt;

/// A half-open range `[location, location + length)` in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    /// Start offset.
    pub location: usize,
    /// Length in UTF-16 code units.
    pub length: usize,
}

impl TextRange {
    /// Create a new range.
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// A zero-length range (a caret position).
    pub fn caret(location: usize) -> Self {
        Self {
            location,
            length: 0,
        }
    }

    /// The end offset (exclusive).
    pub fn end(&self) -> usize {
        self.location + self.length
    }

    /// Check if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `location` falls inside the range (start inclusive, end
    /// exclusive). An empty range contains no locations.
    pub fn contains_location(&self, location: usize) -> bool {
        location >= self.location && location < self.end()
    }

    /// Whether `other` lies entirely inside this range. Every range
    /// contains its own empty sub-ranges, including the one at `end()`.
    pub fn contains(&self, other: TextRange) -> bool {
        other.location >= self.location && other.end() <= self.end()
    }

    /// The overlap between two ranges, or `None` when they are disjoint.
    ///
    /// Touching ranges produce a zero-length intersection at the shared
    /// boundary; callers that only care about real overlap should test
    /// `is_empty` on the result.
    pub fn intersection(&self, other: TextRange) -> Option<TextRange> {
        let start = self.location.max(other.location);
        let end = self.end().min(other.end());
        if start > end {
            return None;
        }
        Some(TextRange::new(start, end - start))
    }

    /// The smallest range covering both inputs.
    pub fn union(&self, other: TextRange) -> TextRange {
        let start = self.location.min(other.location);
        let end = self.end().max(other.end());
        TextRange::new(start, end - start)
    }

    /// This range translated right by `offset`.
    pub fn shifted_right(&self, offset: usize) -> TextRange {
        TextRange::new(self.location + offset, self.length)
    }

    /// This range translated left by `offset`, e.g. into the coordinates of
    /// a child that starts at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range starts before `offset`; that indicates a caller
    /// mixed up coordinate spaces.
    pub fn shifted_left(&self, offset: usize) -> TextRange {
        assert!(
            self.location >= offset,
            "range {self} cannot be shifted left by {offset}"
        );
        TextRange::new(self.location - offset, self.length)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.location, self.end())
    }
}

/// Length of a string in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Map a UTF-16 offset to the corresponding byte offset in `s`.
///
/// Returns `None` when the offset is past the end of the string or falls
/// between the two units of a surrogate pair.
pub fn byte_offset(s: &str, utf16_offset: usize) -> Option<usize> {
    if utf16_offset == 0 {
        return Some(0);
    }
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        if units == utf16_offset {
            return Some(byte_idx);
        }
        units += ch.len_utf16();
    }
    (units == utf16_offset).then_some(s.len())
}

/// Slice `s` by a UTF-16 range.
///
/// Returns `None` when the range is out of bounds or splits a surrogate
/// pair.
pub fn slice_utf16(s: &str, range: TextRange) -> Option<&str> {
    let start = byte_offset(s, range.location)?;
    let end = byte_offset(s, range.end())?;
    Some(&s[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_overlapping() {
        let a = TextRange::new(0, 5);
        let b = TextRange::new(3, 4);
        assert_eq!(a.intersection(b), Some(TextRange::new(3, 2)));
    }

    #[test]
    fn intersection_touching_is_empty() {
        let a = TextRange::new(0, 3);
        let b = TextRange::new(3, 2);
        let i = a.intersection(b).unwrap();
        assert!(i.is_empty());
        assert_eq!(i.location, 3);
    }

    #[test]
    fn intersection_disjoint() {
        let a = TextRange::new(0, 2);
        let b = TextRange::new(5, 1);
        assert_eq!(a.intersection(b), None);
    }

    #[test]
    fn containment() {
        let outer = TextRange::new(2, 6);
        assert!(outer.contains(TextRange::new(2, 6)));
        assert!(outer.contains(TextRange::new(4, 0)));
        assert!(outer.contains(TextRange::caret(8)));
        assert!(!outer.contains(TextRange::new(1, 3)));
        assert!(!outer.contains(TextRange::new(7, 2)));
    }

    #[test]
    fn union_covers_gap() {
        let a = TextRange::new(0, 2);
        let b = TextRange::new(5, 1);
        assert_eq!(a.union(b), TextRange::new(0, 6));
    }

    #[test]
    fn utf16_lengths() {
        assert_eq!(utf16_len("abc"), 3);
        // U+1F600 is a surrogate pair in UTF-16.
        assert_eq!(utf16_len("a\u{1F600}b"), 4);
        assert_eq!(utf16_len("\u{2029}"), 1);
    }

    #[test]
    fn utf16_slicing() {
        let s = "a\u{1F600}b";
        assert_eq!(slice_utf16(s, TextRange::new(0, 1)), Some("a"));
        assert_eq!(slice_utf16(s, TextRange::new(1, 2)), Some("\u{1F600}"));
        assert_eq!(slice_utf16(s, TextRange::new(3, 1)), Some("b"));
        // Splitting the surrogate pair is rejected.
        assert_eq!(slice_utf16(s, TextRange::new(1, 1)), None);
        assert_eq!(slice_utf16(s, TextRange::new(0, 9)), None);
    }
}
