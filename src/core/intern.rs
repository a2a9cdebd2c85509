//! Symbol interning for type-operator and typeclass names.
//!
//! Maps names to compact u32 `Symbol`s so that operator-name comparison
//! during unification is an integer compare. Uses bidirectional hash maps
//! for O(1) lookups in both directions.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU32, Ordering};

/// An interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

static INTERNER: Lazy<SymbolInterner> = Lazy::new(SymbolInterner::new);

struct SymbolInterner {
    name_to_id: DashMap<String, u32>,
    id_to_name: DashMap<u32, String>,
    next_id: AtomicU32,
}

impl SymbolInterner {
    fn new() -> Self {
        let interner = Self {
            name_to_id: DashMap::with_capacity(256),
            id_to_name: DashMap::with_capacity(256),
            next_id: AtomicU32::new(0),
        };

        // Pre-intern the fixed structural tags
        interner.intern(ARROW);
        interner.intern(TUPLE);
        interner.intern(LIST);

        interner
    }

    fn intern(&self, name: &str) -> Symbol {
        if let Some(id) = self.name_to_id.get(name) {
            return Symbol(*id);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.name_to_id.insert(name.to_string(), id);
        self.id_to_name.insert(id, name.to_string());
        Symbol(id)
    }

    fn resolve(&self, sym: Symbol) -> String {
        self.id_to_name
            .get(&sym.0)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| format!("<sym:{}>", sym.0))
    }
}

/// Intern a name, returning its `Symbol`.
pub fn intern(name: &str) -> Symbol {
    INTERNER.intern(name)
}

/// Resolve a `Symbol` back to the name it was interned from.
pub fn resolve(sym: Symbol) -> String {
    INTERNER.resolve(sym)
}

impl Symbol {
    pub fn as_str(&self) -> String {
        resolve(*self)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", resolve(*self))
    }
}

pub const ARROW: &str = "->";
pub const TUPLE: &str = "(,)";
pub const LIST: &str = "[]";

/// The function-arrow tag.
pub fn arrow() -> Symbol {
    intern(ARROW)
}

/// The tuple tag.
pub fn tuple() -> Symbol {
    intern(TUPLE)
}

/// The list tag.
pub fn list() -> Symbol {
    intern(LIST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let a = intern("int");
        let b = intern("int");
        assert_eq!(a, b, "same name should get same symbol");
        assert_eq!(resolve(a), "int");
    }

    #[test]
    fn test_distinct_names() {
        assert_ne!(intern("int"), intern("float"));
        assert_ne!(arrow(), list());
    }

    #[test]
    fn test_structural_tags() {
        assert_eq!(arrow().as_str(), "->");
        assert_eq!(tuple().as_str(), "(,)");
        assert_eq!(list().as_str(), "[]");
    }
}
