//! Unification over the type term arena.
//!
//! `prune` chases and path-compresses variable links; `unify` makes two
//! terms identical by rewriting links (and, for unapplied-constructor
//! placeholders, whole operator slots) in place; `fresh` instantiates a
//! generalized term with brand-new variables for each generic variable.
//!
//! Unification mutates shared links as it proceeds. A failed `unify` leaves
//! the graph partially linked; both operands must be treated as tainted
//! afterwards. Termination is guaranteed by the occurs check, which keeps
//! the link graph acyclic.

use std::collections::HashMap;
use tracing::trace;

use crate::core::term::{OperName, Term, TermId, TypeStore};
use crate::errors::{Result, TypeError};

impl TypeStore {
    /// Follow `t`'s link chain to its ultimate representative, compressing
    /// every visited link. Always returns an unbound variable or an
    /// operator.
    pub fn prune(&mut self, t: TermId) -> TermId {
        if let Term::Var(v) = self.term(t) {
            if let Some(link) = v.link {
                let rep = self.prune(link);
                if let Term::Var(v) = self.term_mut(t) {
                    v.link = Some(rep);
                }
                return rep;
            }
        }
        t
    }

    /// True if variable `v` (pre-pruned) occurs anywhere in `t`.
    pub fn occurs_in_type(&mut self, v: TermId, t: TermId) -> bool {
        let pruned = self.prune(t);
        if pruned == v {
            return true;
        }
        match self.term(pruned).clone() {
            Term::Oper(o) => self.occurs_in(v, &o.args),
            Term::Var(_) => false,
        }
    }

    /// True if variable `v` occurs in any of `terms`.
    pub fn occurs_in(&mut self, v: TermId, terms: &[TermId]) -> bool {
        for t in terms {
            if self.occurs_in_type(v, *t) {
                return true;
            }
        }
        false
    }

    /// A variable is generic unless it is reachable from the non-generic
    /// set. Variables bound to terms count through their contents.
    pub fn is_generic(&mut self, v: TermId, non_generic: &[TermId]) -> bool {
        !self.occurs_in(v, non_generic)
    }

    /// Unify `t1` and `t2`, making their pruned forms identical.
    pub fn unify(&mut self, t1: TermId, t2: TermId) -> Result<()> {
        let a = self.prune(t1);
        let b = self.prune(t2);
        match (self.term(a).clone(), self.term(b).clone()) {
            (Term::Var(_), _) => self.bind(a, b),
            (Term::Oper(_), Term::Var(_)) => self.bind(b, a),
            (Term::Oper(oa), Term::Oper(ob)) => {
                // An operator whose name is a type variable and which carries
                // arguments is an unapplied-constructor placeholder. It is
                // destructively overwritten with the other operator and
                // re-unified; no kind-arity check is performed. This is a
                // documented soundness gap kept for compatibility.
                let a_placeholder = matches!(oa.name, OperName::Var(_)) && !oa.args.is_empty();
                let b_placeholder = matches!(ob.name, OperName::Var(_)) && !ob.args.is_empty();
                if a_placeholder {
                    trace!(target: "typegraft::unify", "rewriting placeholder operator");
                    *self.term_mut(a) = Term::Oper(ob);
                    self.unify(a, b)
                } else if b_placeholder {
                    trace!(target: "typegraft::unify", "rewriting placeholder operator");
                    *self.term_mut(b) = Term::Oper(oa);
                    self.unify(b, a)
                } else if oa.name == ob.name && oa.args.len() == ob.args.len() {
                    for (p, q) in oa.args.iter().zip(ob.args.iter()) {
                        self.unify(*p, *q)?;
                    }
                    Ok(())
                } else {
                    let left = self.show(a);
                    let right = self.show(b);
                    trace!(target: "typegraft::unify", %left, %right, "mismatch");
                    Err(TypeError::mismatch(left, right))
                }
            }
        }
    }

    /// Bind the unbound variable `var` to `other`, unioning constraint sets
    /// when `other` is itself a variable.
    fn bind(&mut self, var: TermId, other: TermId) -> Result<()> {
        if var == other {
            return Ok(());
        }
        if let Term::Var(o) = self.term(other) {
            let mut union = o.constraints.clone();
            if let Term::Var(v) = self.term(var) {
                union.extend(v.constraints.iter().copied());
            }
            if let Term::Var(o) = self.term_mut(other) {
                o.constraints = union.clone();
            }
            if let Term::Var(v) = self.term_mut(var) {
                v.constraints = union;
            }
        }
        if self.occurs_in_type(var, other) {
            let var_name = self.show(var);
            let ty = self.show(other);
            return Err(TypeError::recursive(var_name, ty));
        }
        if let Term::Var(v) = self.term_mut(var) {
            v.link = Some(other);
        }
        Ok(())
    }

    /// Structurally copy `t`, replacing every generic variable (one not
    /// reachable from `non_generic`) with a brand-new variable, consistently
    /// through a local rename map. Non-generic variables are shared. This is
    /// what gives let-bound names an independently instantiable type at each
    /// use site.
    pub fn fresh(&mut self, t: TermId, non_generic: &[TermId]) -> TermId {
        let mut map = HashMap::new();
        self.fresh_rec(t, non_generic, &mut map)
    }

    fn fresh_rec(
        &mut self,
        t: TermId,
        non_generic: &[TermId],
        map: &mut HashMap<TermId, TermId>,
    ) -> TermId {
        let p = self.prune(t);
        match self.term(p).clone() {
            Term::Var(_) => {
                if self.is_generic(p, non_generic) {
                    if let Some(copied) = map.get(&p) {
                        *copied
                    } else {
                        let copied = self.new_var();
                        map.insert(p, copied);
                        copied
                    }
                } else {
                    p
                }
            }
            Term::Oper(o) => {
                let args: Vec<TermId> = o
                    .args
                    .iter()
                    .map(|a| self.fresh_rec(*a, non_generic, map))
                    .collect();
                self.oper(o.name, args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_prune_idempotent() {
        let mut store = TypeStore::new();
        let v1 = store.new_var();
        let v2 = store.new_var();
        let int = store.con("int");
        store.unify(v1, v2).unwrap();
        store.unify(v2, int).unwrap();

        let once = store.prune(v1);
        let twice = store.prune(once);
        assert_eq!(once, twice);
        assert_eq!(once, int);
    }

    #[test]
    fn test_unify_reflexive() {
        let mut store = TypeStore::new();
        let int = store.con("int");
        let v = store.new_var();
        let f = store.function(v, int);
        assert!(store.unify(f, f).is_ok());
        assert!(store.unify(v, v).is_ok());
    }

    #[test]
    fn test_unify_symmetric() {
        let mut store = TypeStore::new();
        let int = store.con("int");
        let a = store.new_var();
        let fa = store.function(a, int);
        let b = store.new_var();
        let fb = store.function(int, b);

        store.unify(fa, fb).unwrap();
        store.unify(fb, fa).unwrap();
        assert_eq!(store.prune(fa), store.prune(fa));
        assert_eq!(store.prune(a), store.prune(a));
        // both sides now agree structurally
        assert_eq!(store.show(fa), store.show(fb));
    }

    #[test]
    fn test_occurs_check_rejects_infinite_type() {
        let mut store = TypeStore::new();
        let v = store.new_var();
        let list_v = store.list_of(v);
        let err = store.unify(v, list_v).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::RecursiveUnification { .. }));
    }

    #[test]
    fn test_mismatch_cites_both_operators() {
        let mut store = TypeStore::new();
        let int = store.con("int");
        let boolean = store.con("bool");
        let err = store.unify(int, boolean).unwrap_err();
        match err.kind {
            ErrorKind::TypeMismatch { left, right } => {
                assert_eq!(left, "int");
                assert_eq!(right, "bool");
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_fails() {
        let mut store = TypeStore::new();
        let int = store.con("int");
        let two = store.tuple_of([int, int]);
        let three = store.tuple_of([int, int, int]);
        assert!(store.unify(two, three).is_err());
    }

    #[test]
    fn test_var_var_unification_unions_constraints() {
        use crate::core::intern::intern;
        use std::collections::BTreeSet;

        let mut store = TypeStore::new();
        let eq_class = intern("Eq");
        let show_class = intern("Show");
        let a = store.new_var_with(BTreeSet::from([eq_class]));
        let b = store.new_var_with(BTreeSet::from([show_class]));
        store.unify(a, b).unwrap();

        for t in [a, b] {
            match store.term(t) {
                Term::Var(v) => {
                    assert!(v.constraints.contains(&eq_class));
                    assert!(v.constraints.contains(&show_class));
                }
                _ => panic!("expected variable"),
            }
        }
    }

    #[test]
    fn test_placeholder_operator_unifies_permissively() {
        // `f a` against `[int]`: the placeholder is rewritten in place.
        let mut store = TypeStore::new();
        let f = store.new_var();
        let a = store.new_var();
        let applied = store.oper(OperName::Var(f), [a]);
        let int = store.con("int");
        let list_int = store.list_of(int);

        store.unify(applied, list_int).unwrap();
        assert_eq!(store.show(applied), "[int]");
        // The overwrite discards the placeholder's own argument slots, so
        // its original argument variable stays unbound.
        let rep = store.prune(a);
        assert!(matches!(store.term(rep), Term::Var(_)));
    }

    #[test]
    fn test_fresh_copies_generic_shares_non_generic() {
        let mut store = TypeStore::new();
        let g = store.new_var();
        let ng = store.new_var();
        let f = store.function(g, ng);

        let copy = store.fresh(f, &[ng]);
        let (copy_arg, copy_ret) = match store.term(copy) {
            Term::Oper(o) => (o.args[0], o.args[1]),
            _ => panic!("expected operator"),
        };
        assert_ne!(store.prune(copy_arg), store.prune(g), "generic var duplicated");
        assert_eq!(store.prune(copy_ret), store.prune(ng), "non-generic var shared");
    }

    #[test]
    fn test_fresh_renames_consistently() {
        let mut store = TypeStore::new();
        let g = store.new_var();
        let f = store.function(g, g);
        let copy = store.fresh(f, &[]);
        let (arg, ret) = match store.term(copy) {
            Term::Oper(o) => (o.args[0], o.args[1]),
            _ => panic!("expected operator"),
        };
        assert_eq!(store.prune(arg), store.prune(ret));
    }
}
