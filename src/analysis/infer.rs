//! A four-node inference evaluator over a typed lambda calculus.
//!
//! `analyze` computes the type of an expression in a type environment. The
//! environment and the non-generic variable set are extended copy-on-write,
//! never mutated across branches, so sibling subtrees cannot observe each
//! other's scopes. Data types enter the language purely through predefined
//! identifiers in the initial environment.

use std::collections::HashMap;
use tracing::trace;

use crate::core::term::{TermId, TypeStore};
use crate::errors::{find_similar_names, Result, TypeError};

/// An expression in the inference language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Variable or identifier reference.
    Var(String),
    /// Application of a single argument; multi-argument calls are curried.
    App(Box<Expr>, Box<Expr>),
    /// Lambda abstraction.
    Lam(String, Box<Expr>),
    /// Let binding; always recursive (the bound name is in scope inside its
    /// own definition).
    Let(String, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn app(f: Expr, arg: Expr) -> Self {
        Expr::App(Box::new(f), Box::new(arg))
    }

    pub fn lam(param: impl Into<String>, body: Expr) -> Self {
        Expr::Lam(param.into(), Box::new(body))
    }

    pub fn let_in(name: impl Into<String>, defn: Expr, body: Expr) -> Self {
        Expr::Let(name.into(), Box::new(defn), Box::new(body))
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::App(func, arg) => write!(f, "({} {})", func, arg),
            Expr::Lam(param, body) => write!(f, "(\\{} -> {})", param, body),
            Expr::Let(name, defn, body) => {
                write!(f, "(let {} = {} in {})", name, defn, body)
            }
        }
    }
}

/// Mapping of identifier names to type terms.
pub type TypeEnv = HashMap<String, TermId>;

/// Compute the type of `expr` in `env`, with `non_generic` holding the
/// variables that must not be generalized (lambda parameters and
/// provisional let bindings).
pub fn analyze(
    store: &mut TypeStore,
    expr: &Expr,
    env: &TypeEnv,
    non_generic: &[TermId],
) -> Result<TermId> {
    match expr {
        Expr::Var(name) => {
            let ty = lookup(store, name, env, non_generic)?;
            Ok(ty)
        }
        Expr::App(func, arg) => {
            let fun_type = analyze(store, func, env, non_generic)?;
            let arg_type = analyze(store, arg, env, non_generic)?;
            let result_type = store.new_var();
            let expected = store.function(arg_type, result_type);
            store.unify(expected, fun_type)?;
            Ok(result_type)
        }
        Expr::Lam(param, body) => {
            let arg_type = store.new_var();
            let mut new_env = env.clone();
            new_env.insert(param.clone(), arg_type);
            let mut new_non_generic = non_generic.to_vec();
            new_non_generic.push(arg_type);
            let result_type = analyze(store, body, &new_env, &new_non_generic)?;
            Ok(store.function(arg_type, result_type))
        }
        Expr::Let(name, defn, body) => {
            // The provisional variable is non-generic while the definition
            // is analyzed (self-reference stays monomorphic), but the body
            // is analyzed against the original non-generic set so each use
            // of the binding is generalized.
            let new_type = store.new_var();
            let mut new_env = env.clone();
            new_env.insert(name.clone(), new_type);
            let mut new_non_generic = non_generic.to_vec();
            new_non_generic.push(new_type);
            let defn_type = analyze(store, defn, &new_env, &new_non_generic)?;
            store.unify(new_type, defn_type)?;
            analyze(store, body, &new_env, non_generic)
        }
    }
}

/// Environment lookup with let-polymorphic instantiation.
fn lookup(
    store: &mut TypeStore,
    name: &str,
    env: &TypeEnv,
    non_generic: &[TermId],
) -> Result<TermId> {
    match env.get(name) {
        Some(ty) => Ok(store.fresh(*ty, non_generic)),
        None => {
            trace!(target: "typegraft::infer", name, "undefined symbol");
            let known: Vec<String> = env.keys().cloned().collect();
            let similar = find_similar_names(name, &known, 2);
            Err(TypeError::undefined_symbol(name, similar))
        }
    }
}
