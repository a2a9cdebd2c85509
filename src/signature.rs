//! Declarative type signatures and their compilation into type terms.
//!
//! A `Signature` is an ordered sequence of `SigTerm`s (argument terms
//! followed by the return term) plus a constraint map from type-variable
//! name to required typeclasses. Compilation interns repeated variable names
//! within one signature to the same arena variable, so shared-name
//! constraints are honored, and validates shapes eagerly: a malformed
//! signature fails at declaration time, never at call time.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::classes::adt::AdtInfo;
use crate::core::intern;
use crate::core::term::{OperName, TermId, TypeStore};
use crate::errors::{Result, TypeError};

/// One term of a declarative signature.
#[derive(Debug, Clone)]
pub enum SigTerm {
    /// Lowercase identifier: a type variable.
    Var(String),
    /// Concrete nominal type, e.g. `int`.
    Con(String),
    /// The unit type.
    Unit,
    /// Nested signature: a function-typed argument or return.
    Fun(Vec<SigTerm>),
    /// List of an element term.
    List(Box<SigTerm>),
    /// N-tuple of element terms.
    Tuple(Vec<SigTerm>),
    /// A constructor (variable, named type, or algebraic type) applied to
    /// parameter terms; the higher-kinded case.
    Applied(Box<SigTerm>, Vec<SigTerm>),
    /// A declared algebraic data type, by its runtime metadata.
    Adt(Rc<AdtInfo>),
}

/// Shorthand constructors, mirroring how signatures are written inline.
pub fn var(name: &str) -> SigTerm {
    SigTerm::Var(name.to_string())
}

pub fn con(name: &str) -> SigTerm {
    SigTerm::Con(name.to_string())
}

pub fn fun(terms: Vec<SigTerm>) -> SigTerm {
    SigTerm::Fun(terms)
}

pub fn list(elem: SigTerm) -> SigTerm {
    SigTerm::List(Box::new(elem))
}

pub fn tuple(elems: Vec<SigTerm>) -> SigTerm {
    SigTerm::Tuple(elems)
}

pub fn applied(head: SigTerm, params: Vec<SigTerm>) -> SigTerm {
    SigTerm::Applied(Box::new(head), params)
}

/// A full signature: argument terms, return term, and typeclass constraints.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub terms: Vec<SigTerm>,
    pub constraints: HashMap<String, Vec<String>>,
}

impl Signature {
    pub fn new(terms: Vec<SigTerm>) -> Self {
        Self {
            terms,
            constraints: HashMap::new(),
        }
    }

    /// Attach typeclass constraints to a variable name.
    pub fn with_constraint(mut self, variable: &str, classes: &[&str]) -> Self {
        self.constraints
            .entry(variable.to_string())
            .or_default()
            .extend(classes.iter().map(|c| c.to_string()));
        self
    }

    /// Number of arguments the signature declares.
    pub fn arity(&self) -> usize {
        self.terms.len().saturating_sub(1)
    }
}

/// Compile each signature term into the arena, sharing variables by name.
pub fn build_signature(store: &mut TypeStore, sig: &Signature) -> Result<Vec<TermId>> {
    if sig.terms.len() < 2 {
        return Err(TypeError::signature(
            "a signature needs at least one argument and a return term",
        ));
    }
    let mut var_dict = HashMap::new();
    sig.terms
        .iter()
        .map(|t| build_term(store, t, &sig.constraints, &mut var_dict))
        .collect()
}

fn build_term(
    store: &mut TypeStore,
    term: &SigTerm,
    constraints: &HashMap<String, Vec<String>>,
    var_dict: &mut HashMap<String, TermId>,
) -> Result<TermId> {
    match term {
        SigTerm::Var(name) => build_var(store, name, constraints, var_dict),
        SigTerm::Con(name) => Ok(store.con(name)),
        SigTerm::Unit => Ok(store.con("()")),
        SigTerm::Fun(terms) => {
            if terms.len() < 2 {
                return Err(TypeError::signature(format!(
                    "nested signature needs at least two terms, got {}",
                    terms.len()
                )));
            }
            let built: Vec<TermId> = terms
                .iter()
                .map(|t| build_term(store, t, constraints, var_dict))
                .collect::<Result<_>>()?;
            make_fn_type(store, &built)
        }
        SigTerm::List(elem) => {
            let elem = build_term(store, elem, constraints, var_dict)?;
            Ok(store.list_of(elem))
        }
        SigTerm::Tuple(elems) => {
            if elems.len() < 2 {
                return Err(TypeError::signature(format!(
                    "tuple type needs at least two elements, got {}",
                    elems.len()
                )));
            }
            let elems: Vec<TermId> = elems
                .iter()
                .map(|t| build_term(store, t, constraints, var_dict))
                .collect::<Result<_>>()?;
            Ok(store.tuple_of(elems))
        }
        SigTerm::Applied(head, params) => {
            let name = match head.as_ref() {
                SigTerm::Var(name) => {
                    let v = build_var(store, name, constraints, var_dict)?;
                    OperName::Var(v)
                }
                SigTerm::Con(name) => OperName::Con(intern::intern(name)),
                SigTerm::Adt(info) => OperName::Con(info.symbol),
                other => {
                    return Err(TypeError::signature(format!(
                        "constructor position must be a variable or a named type, got {:?}",
                        other
                    )))
                }
            };
            let params: Vec<TermId> = params
                .iter()
                .map(|t| build_term(store, t, constraints, var_dict))
                .collect::<Result<_>>()?;
            Ok(store.oper(name, params))
        }
        SigTerm::Adt(info) => Ok(store.oper(OperName::Con(info.symbol), [])),
    }
}

fn build_var(
    store: &mut TypeStore,
    name: &str,
    constraints: &HashMap<String, Vec<String>>,
    var_dict: &mut HashMap<String, TermId>,
) -> Result<TermId> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(TypeError::signature(format!(
            "type variable names must be lowercase identifiers, got '{}'",
            name
        )));
    }
    if let Some(existing) = var_dict.get(name) {
        return Ok(*existing);
    }
    let classes: BTreeSet<_> = constraints
        .get(name)
        .map(|cs| cs.iter().map(|c| intern::intern(c)).collect())
        .unwrap_or_default();
    let v = store.new_var_with(classes);
    var_dict.insert(name.to_string(), v);
    Ok(v)
}

/// Right-fold a per-position term list into a chain of function arrows.
pub fn make_fn_type(store: &mut TypeStore, params: &[TermId]) -> Result<TermId> {
    match params {
        [] | [_] => Err(TypeError::signature(
            "a function type needs at least two terms",
        )),
        [last_input, return_type] => Ok(store.function(*last_input, *return_type)),
        [first, rest @ ..] => {
            let tail = make_fn_type(store, rest)?;
            Ok(store.function(*first, tail))
        }
    }
}
