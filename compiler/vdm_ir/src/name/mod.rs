//! Interned string identifier.
//!
//! Names are interned in one process-wide [`StringInterner`] so that a
//! `Name` can be displayed anywhere (diagnostics, debugger payloads, hook
//! callbacks) without threading an interner reference through every layer.
//! Interning is append-only; two equal strings always yield the same `Name`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use crate::StringInterner;

static INTERNER: LazyLock<StringInterner> = LazyLock::new(StringInterner::new);

/// Interned string identifier: an index into the process-wide table.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        Name(index)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Intern `s` in the process-wide interner.
    #[inline]
    pub fn intern(s: &str) -> Name {
        INTERNER.intern(s)
    }

    /// The interned text.
    #[inline]
    pub fn as_str(self) -> &'static str {
        INTERNER.lookup(self)
    }
}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Names order by their text so that sorted name sets read naturally in
/// diagnostics and debugger variable listings.
impl Ord for Name {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 == other.0 {
            return std::cmp::Ordering::Equal;
        }
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::intern(s)
    }
}

#[cfg(test)]
mod tests;
