//! Binding environments produced by pattern matching.

use std::fmt;

use smallvec::SmallVec;
use vdm_diagnostic::ErrorCode;
use vdm_ir::{Location, Name};

use crate::errors::PatternMismatch;
use crate::value::Value;

/// A complete name-to-value mapping from one successful match.
///
/// Names are unique. Binding a name that is already bound succeeds only if
/// the values are equal, which is how a pattern such as `[x, x]` constrains
/// both positions to the same value.
#[derive(Clone, Default)]
pub struct Bindings {
    entries: SmallVec<[(Name, Value); 4]>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: Name, value: Value) -> Self {
        let mut b = Self::new();
        b.entries.push((name, value));
        b
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: Name) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Name, Value)> {
        self.entries.iter()
    }

    /// Add a binding, failing if `name` is already bound to another value.
    pub fn bind(&mut self, name: Name, value: Value, location: Location) -> Result<(), PatternMismatch> {
        match self.get(name) {
            Some(existing) if *existing != value => Err(PatternMismatch::new(
                ErrorCode::ValuesDoNotMatch,
                format!("Values do not match: {name} = {existing} and {value}"),
                location,
            )),
            Some(_) => Ok(()),
            None => {
                self.entries.push((name, value));
                Ok(())
            }
        }
    }

    /// Union of two environments, failing on a conflicting name.
    pub fn merge(&self, other: &Bindings, location: Location) -> Result<Bindings, PatternMismatch> {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.bind(*name, value.clone(), location)?;
        }
        Ok(merged)
    }
}

/// Environments are equal when they bind the same names to equal values,
/// regardless of binding order.
impl PartialEq for Bindings {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.get(*name) == Some(value))
    }
}

impl Eq for Bindings {}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(n, v)| (n.as_str(), v)))
            .finish()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}:{value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn rebinding_same_value_is_allowed() {
        let x = Name::intern("x");
        let mut b = Bindings::single(x, Value::int(1));
        assert!(b.bind(x, Value::real(1.0), Location::DUMMY).is_ok());
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn rebinding_different_value_fails() {
        let x = Name::intern("x");
        let mut b = Bindings::single(x, Value::int(1));
        let err = b.bind(x, Value::int(2), Location::DUMMY).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValuesDoNotMatch);
    }

    #[test]
    fn equality_ignores_order() {
        let (x, y) = (Name::intern("x"), Name::intern("y"));
        let a = Bindings::single(x, Value::int(1))
            .merge(&Bindings::single(y, Value::int(2)), Location::DUMMY)
            .unwrap();
        let b = Bindings::single(y, Value::int(2))
            .merge(&Bindings::single(x, Value::int(1)), Location::DUMMY)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{x:1, y:2}");
    }
}
