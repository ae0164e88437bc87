//! Source locations.
//!
//! Every evaluable node carries a `Location`: file, start line/column and
//! end line/column. Breakpoints, tracepoints, hook callbacks and error
//! messages are all keyed on it.

use std::fmt;

use crate::Name;

/// Source position of a node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct Location {
    pub file: Name,
    pub start_line: u32,
    pub start_pos: u32,
    pub end_line: u32,
    pub end_pos: u32,
}

impl Location {
    /// Location for synthesized nodes with no source text.
    pub const DUMMY: Location = Location {
        file: Name::EMPTY,
        start_line: 0,
        start_pos: 0,
        end_line: 0,
        end_pos: 0,
    };

    #[inline]
    pub const fn new(file: Name, start_line: u32, start_pos: u32, end_line: u32, end_pos: u32) -> Self {
        Location {
            file,
            start_line,
            start_pos,
            end_line,
            end_pos,
        }
    }

    /// Location of a single point `line:pos` in `file`.
    #[inline]
    pub const fn at(file: Name, line: u32, pos: u32) -> Self {
        Location::new(file, line, pos, line, pos)
    }

    pub fn is_dummy(&self) -> bool {
        *self == Self::DUMMY
    }

    /// Whether `line` of `file` falls within this location's line range.
    pub fn covers_line(&self, file: Name, line: u32) -> bool {
        self.file == file && self.start_line <= line && line <= self.end_line
    }

    /// Whether `other` lies entirely within this location.
    pub fn contains(&self, other: &Location) -> bool {
        self.file == other.file
            && (self.start_line, self.start_pos) <= (other.start_line, other.start_pos)
            && (other.end_line, other.end_pos) <= (self.end_line, self.end_pos)
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Location) -> Location {
        Location {
            file: self.file,
            start_line: self.start_line,
            start_pos: self.start_pos,
            end_line: other.end_line,
            end_pos: other.end_pos,
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.file, self.start_line, self.start_pos, self.end_line, self.end_pos
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in '{}' at line {}:{}",
            self.file, self.start_line, self.start_pos
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = Location::new(Name::intern("model.vdmsl"), 12, 5, 12, 20);
        assert_eq!(loc.to_string(), "in 'model.vdmsl' at line 12:5");
    }

    #[test]
    fn test_covers_line() {
        let file = Name::intern("a.vdmsl");
        let loc = Location::new(file, 3, 1, 7, 4);
        assert!(loc.covers_line(file, 3));
        assert!(loc.covers_line(file, 7));
        assert!(!loc.covers_line(file, 8));
        assert!(!loc.covers_line(Name::intern("b.vdmsl"), 5));
    }

    #[test]
    fn test_contains() {
        let file = Name::intern("a.vdmsl");
        let outer = Location::new(file, 3, 1, 7, 4);
        let inner = Location::new(file, 4, 2, 4, 9);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }

    #[test]
    fn test_dummy() {
        assert!(Location::DUMMY.is_dummy());
        assert!(!Location::at(Name::intern("x"), 1, 1).is_dummy());
    }
}
