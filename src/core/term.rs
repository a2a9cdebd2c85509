//! The type term model.
//!
//! Type terms live in a `TypeStore` arena and are addressed by `TermId`
//! indices. A term is either a type variable (with a union-find link that
//! unification rewrites in place) or a type operator (a name applied to an
//! ordered list of argument terms). Function, tuple and list types are
//! operator specializations distinguished by their structural tag.
//!
//! Each typed function owns one store, shared down its currying chain;
//! unrelated declarations never share terms.

use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::intern::{self, Symbol};

/// Index of a term inside a `TypeStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermId(u32);

impl TermId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// An operator name: a fixed constructor symbol, or a type variable standing
/// for an unapplied constructor (the higher-kinded placeholder case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperName {
    Con(Symbol),
    Var(TermId),
}

#[derive(Debug, Clone)]
pub struct VarData {
    /// Unique per-store variable id.
    pub id: u64,
    /// Union-find link; `None` while the variable is unbound.
    pub link: Option<TermId>,
    /// Display name, assigned lazily on first rendering.
    pub name: Option<String>,
    /// Required-typeclass constraints. Unification unions these.
    pub constraints: BTreeSet<Symbol>,
}

#[derive(Debug, Clone)]
pub struct OperData {
    pub name: OperName,
    pub args: SmallVec<[TermId; 2]>,
}

#[derive(Debug, Clone)]
pub enum Term {
    Var(VarData),
    Oper(OperData),
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

/// Arena of type terms with per-store variable numbering and lazy display
/// names.
#[derive(Debug)]
pub struct TypeStore {
    terms: Vec<Term>,
    next_var_id: u64,
    next_name: u32,
    id: u64,
}

impl TypeStore {
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            next_var_id: 0,
            next_name: 0,
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Stable identity of this store, used to detect whether two wrappers
    /// share an arena.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, t: TermId) -> &Term {
        &self.terms[t.index()]
    }

    pub(crate) fn term_mut(&mut self, t: TermId) -> &mut Term {
        &mut self.terms[t.index()]
    }

    fn push(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }

    /// Allocate a fresh unbound, unconstrained variable.
    pub fn new_var(&mut self) -> TermId {
        self.new_var_with(BTreeSet::new())
    }

    /// Allocate a fresh unbound variable carrying typeclass constraints.
    pub fn new_var_with(&mut self, constraints: BTreeSet<Symbol>) -> TermId {
        let id = self.next_var_id;
        self.next_var_id += 1;
        self.push(Term::Var(VarData {
            id,
            link: None,
            name: None,
            constraints,
        }))
    }

    pub fn oper(&mut self, name: OperName, args: impl IntoIterator<Item = TermId>) -> TermId {
        self.push(Term::Oper(OperData {
            name,
            args: args.into_iter().collect(),
        }))
    }

    /// A nullary concrete operator, e.g. `int`.
    pub fn con(&mut self, name: &str) -> TermId {
        let sym = intern::intern(name);
        self.oper(OperName::Con(sym), [])
    }

    /// `a -> b`.
    pub fn function(&mut self, arg: TermId, ret: TermId) -> TermId {
        self.oper(OperName::Con(intern::arrow()), [arg, ret])
    }

    /// `(a, b, ...)`.
    pub fn tuple_of(&mut self, elems: impl IntoIterator<Item = TermId>) -> TermId {
        self.oper(OperName::Con(intern::tuple()), elems)
    }

    /// `[a]`.
    pub fn list_of(&mut self, elem: TermId) -> TermId {
        self.oper(OperName::Con(intern::list()), [elem])
    }

    /// Follow a variable's link chain without compressing it. Used where a
    /// read-only view is needed (imports, rendering).
    pub fn resolve(&self, t: TermId) -> TermId {
        let mut cur = t;
        while let Term::Var(v) = self.term(cur) {
            match v.link {
                Some(next) => cur = next,
                None => break,
            }
        }
        cur
    }

    /// Structurally copy the pruned graph under `root` from `src` into this
    /// store. Variables are renamed consistently through `map`, preserving
    /// sharing and constraints; `map` may be reused across roots from the
    /// same source store.
    pub fn import_from(
        &mut self,
        src: &TypeStore,
        root: TermId,
        map: &mut std::collections::HashMap<TermId, TermId>,
    ) -> TermId {
        let p = src.resolve(root);
        if let Some(copied) = map.get(&p) {
            return *copied;
        }
        match src.term(p).clone() {
            Term::Var(v) => {
                let copied = self.new_var_with(v.constraints);
                map.insert(p, copied);
                copied
            }
            Term::Oper(o) => {
                let name = match o.name {
                    OperName::Con(sym) => OperName::Con(sym),
                    OperName::Var(nv) => OperName::Var(self.import_from(src, nv, map)),
                };
                let args: SmallVec<[TermId; 2]> = o
                    .args
                    .iter()
                    .map(|a| self.import_from(src, *a, map))
                    .collect();
                let copied = self.oper(name, args);
                map.insert(p, copied);
                copied
            }
        }
    }

    fn alloc_name(&mut self) -> String {
        let idx = self.next_name;
        self.next_name += 1;
        let letter = (b'a' + (idx % 26) as u8) as char;
        if idx < 26 {
            letter.to_string()
        } else {
            format!("{}{}", letter, idx / 26)
        }
    }

    fn var_name(&mut self, t: TermId) -> String {
        if let Term::Var(v) = self.term(t) {
            if let Some(name) = &v.name {
                return name.clone();
            }
        }
        let name = self.alloc_name();
        if let Term::Var(v) = self.term_mut(t) {
            v.name = Some(name.clone());
        }
        name
    }

    /// Render a term for display. Assigns variable names lazily, so only
    /// terms that are actually shown consume names.
    pub fn show(&mut self, t: TermId) -> String {
        let p = self.resolve(t);
        match self.term(p).clone() {
            Term::Var(_) => self.var_name(p),
            Term::Oper(o) => {
                let name = match &o.name {
                    OperName::Con(sym) => sym.as_str(),
                    OperName::Var(v) => self.show(*v),
                };
                if name == intern::ARROW && o.args.len() == 2 {
                    let lhs = self.show(o.args[0]);
                    let rhs = self.show(o.args[1]);
                    if self.is_function(o.args[0]) {
                        format!("({}) -> {}", lhs, rhs)
                    } else {
                        format!("{} -> {}", lhs, rhs)
                    }
                } else if name == intern::LIST && o.args.len() == 1 {
                    format!("[{}]", self.show(o.args[0]))
                } else if name == intern::TUPLE {
                    let parts: Vec<String> = o.args.iter().map(|a| self.show(*a)).collect();
                    format!("({})", parts.join(", "))
                } else if o.args.is_empty() {
                    name
                } else {
                    let parts: Vec<String> = o.args.iter().map(|a| self.show(*a)).collect();
                    format!("({} {})", name, parts.join(" "))
                }
            }
        }
    }

    fn is_function(&self, t: TermId) -> bool {
        match self.term(self.resolve(t)) {
            Term::Oper(o) => o.name == OperName::Con(intern::arrow()),
            _ => false,
        }
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}
