//! Identifier table behind [`Name`].
//!
//! Specifications intern a few thousand identifiers at most, almost all of
//! them while the tree is built. Evaluation only reads the table (to print
//! names), so one read-write lock is enough.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct Table {
    ids: FxHashMap<&'static str, u32>,
    text: Vec<&'static str>,
}

/// Append-only table of identifier text.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// An interner holding only the empty string, as [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut table = Table::default();
        table.ids.insert("", 0);
        table.text.push("");
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// The name of `s`, adding it on first use.
    ///
    /// # Panics
    /// Panics once `u32::MAX` distinct identifiers have been interned.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&id) = self.table.read().ids.get(s) {
            return Name::from_index(id);
        }
        let mut table = self.table.write();
        // Another thread may have added it between the two locks.
        if let Some(&id) = table.ids.get(s) {
            return Name::from_index(id);
        }
        let Ok(id) = u32::try_from(table.text.len()) else {
            panic!("identifier table is full");
        };
        // Identifiers live as long as the process; leaking gives `&'static`.
        let text: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.text.push(text);
        table.ids.insert(text, id);
        Name::from_index(id)
    }

    /// The text of `name`; names from no interner read as empty.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .text
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Distinct identifiers, counting the empty one.
    pub fn len(&self) -> usize {
        self.table.read().text.len()
    }

    /// Never true: the empty identifier is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
