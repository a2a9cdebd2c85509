//! Typed function wrappers with runtime-checked application.
//!
//! A [`TypedFunc`] pairs a host callable with a declared type held in its
//! own arena. Every application runs inference over a synthetic application
//! chain before the callable executes, so ill-typed arguments are rejected
//! without side effects. Under-application returns a new wrapper over the
//! remaining signature, which makes every typed function curried.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::analysis::{analyze, Expr, TypeEnv};
use crate::core::term::{TermId, TypeStore};
use crate::errors::{Result, TypeError};
use crate::runtime::value::{observed_type, Value};
use crate::signature::{build_signature, make_fn_type, Signature};

/// The host-side implementation of a typed function. Receives exactly as
/// many values as the wrapper's arity.
pub type HostFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A host callable carrying an enforced polymorphic type.
#[derive(Clone)]
pub struct TypedFunc {
    func: HostFn,
    store: Rc<RefCell<TypeStore>>,
    store_id: u64,
    fn_type: TermId,
    /// Signature terms of the original declaration, arguments then result.
    arg_terms: Rc<Vec<TermId>>,
    /// Signature terms still unapplied, arguments then result. Shrinks from
    /// the front as partial applications accumulate.
    remaining: Vec<TermId>,
}

/// Wrap `f` with the declared signature `sig`, validating the signature
/// eagerly.
pub fn typed_fn<F>(sig: &Signature, f: F) -> Result<TypedFunc>
where
    F: Fn(&[Value]) -> Result<Value> + 'static,
{
    let mut store = TypeStore::new();
    let terms = build_signature(&mut store, sig)?;
    let fn_type = make_fn_type(&mut store, &terms)?;
    let store_id = store.id();
    debug!(arity = terms.len() - 1, "declared typed function");
    Ok(TypedFunc {
        func: Rc::new(f),
        store: Rc::new(RefCell::new(store)),
        store_id,
        fn_type,
        arg_terms: Rc::new(terms.clone()),
        remaining: terms,
    })
}

impl TypedFunc {
    /// Number of arguments still expected before the callable runs.
    pub fn arity(&self) -> usize {
        self.remaining.len() - 1
    }

    /// Arity of the original declaration, before any partial application.
    pub fn original_arity(&self) -> usize {
        self.arg_terms.len() - 1
    }

    /// Number of arguments already bound by partial application.
    pub fn applied_count(&self) -> usize {
        self.original_arity() - self.arity()
    }

    /// Render the declared type of the unapplied portion.
    pub fn declared_type(&self) -> String {
        self.store.borrow_mut().show(self.fn_type)
    }

    /// Whether two wrappers share the same underlying callable.
    pub fn same_callable(&self, other: &TypedFunc) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    /// Apply to `args`. Fewer arguments than the arity yields a partially
    /// applied wrapper, exactly the arity runs the callable and checks the
    /// result, and more is an error. Any `Undefined` argument short-circuits
    /// to `Undefined` before inference runs.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if args.iter().any(|a| matches!(a, Value::Undefined)) {
            trace!("undefined argument short-circuits application");
            return Ok(Value::Undefined);
        }
        if args.len() > self.arity() {
            return Err(TypeError::signature(format!(
                "too many arguments: expected at most {}, got {}",
                self.arity(),
                args.len()
            )));
        }

        // Type-check the application chain against a fresh instance of the
        // declared type before touching the callable.
        let result_type = {
            let mut store = self.store.borrow_mut();
            let mut env = TypeEnv::new();
            env.insert("@self".to_string(), self.fn_type);
            let mut expr = Expr::var("@self");
            for (i, arg) in args.iter().enumerate() {
                let name = format!("@arg{}", i);
                let observed = observed_type(&mut store, arg);
                env.insert(name.clone(), observed);
                expr = Expr::app(expr, Expr::var(name));
            }
            analyze(&mut store, &expr, &env, &[])?
        };

        match args.len().cmp(&self.arity()) {
            Ordering::Less => {
                trace!(
                    bound = args.len(),
                    arity = self.arity(),
                    "partial application"
                );
                // The analysis result carries the bindings the supplied
                // arguments just produced, so the partial wrapper's type is
                // narrowed by them. The unapplied signature slice only does
                // arity bookkeeping.
                let new_remaining = self.remaining[args.len()..].to_vec();
                let bound: Vec<Value> = args.to_vec();
                let inner = self.func.clone();
                let func: HostFn = Rc::new(move |rest: &[Value]| {
                    let mut all = bound.clone();
                    all.extend_from_slice(rest);
                    inner(&all)
                });
                Ok(Value::Func(TypedFunc {
                    func,
                    store: self.store.clone(),
                    store_id: self.store_id,
                    fn_type: result_type,
                    arg_terms: self.arg_terms.clone(),
                    remaining: new_remaining,
                }))
            }
            Ordering::Equal => {
                // The borrow must not be held across the callable; the
                // callable may itself apply typed functions over this store.
                let result = (self.func)(args)?;
                let mut store = self.store.borrow_mut();
                let observed = observed_type(&mut store, &result);
                store.unify(result_type, observed)?;
                Ok(result)
            }
            Ordering::Greater => unreachable!("over-application is rejected above"),
        }
    }

    /// Apply to a single argument.
    pub fn call1(&self, arg: Value) -> Result<Value> {
        self.call(std::slice::from_ref(&arg))
    }

    /// Compose with `other`: the result applies `other` to its first
    /// argument, then applies `self` to that value and any further
    /// arguments. The composed type is inferred from both declarations.
    pub fn compose(&self, other: &TypedFunc) -> Result<TypedFunc> {
        let mut store = TypeStore::new();
        let mut outer_map = HashMap::new();
        let mut inner_map = HashMap::new();
        let (outer_type, inner_type) = {
            let outer_src = self.store.borrow();
            let inner_src = other.store.borrow();
            (
                store.import_from(&outer_src, self.fn_type, &mut outer_map),
                store.import_from(&inner_src, other.fn_type, &mut inner_map),
            )
        };

        let mut env = TypeEnv::new();
        env.insert("@outer".to_string(), outer_type);
        env.insert("@inner".to_string(), inner_type);
        let expr = Expr::lam(
            "x",
            Expr::app(
                Expr::var("@outer"),
                Expr::app(Expr::var("@inner"), Expr::var("x")),
            ),
        );
        let fn_type = analyze(&mut store, &expr, &env, &[])?;

        // Argument terms: the inner function's first argument, then
        // everything of the outer signature past its first argument.
        let mut terms = Vec::with_capacity(self.remaining.len());
        {
            let inner_src = other.store.borrow();
            terms.push(store.import_from(&inner_src, other.remaining[0], &mut inner_map));
        }
        {
            let outer_src = self.store.borrow();
            for t in &self.remaining[1..] {
                terms.push(store.import_from(&outer_src, *t, &mut outer_map));
            }
        }

        let outer_fn = self.func.clone();
        let inner_fn = other.func.clone();
        let func: HostFn = Rc::new(move |args: &[Value]| {
            let head = inner_fn(&args[..1])?;
            let mut forwarded = vec![head];
            forwarded.extend_from_slice(&args[1..]);
            outer_fn(&forwarded)
        });

        let store_id = store.id();
        debug!(arity = terms.len() - 1, "composed typed functions");
        Ok(TypedFunc {
            func,
            store: Rc::new(RefCell::new(store)),
            store_id,
            fn_type,
            arg_terms: Rc::new(terms.clone()),
            remaining: terms,
        })
    }

    /// Copy the declared type into `dst`, renaming variables freshly. When
    /// `dst` is this wrapper's own store the type is already a term there.
    pub fn import_type_into(&self, dst: &mut TypeStore) -> TermId {
        if dst.id() == self.store_id {
            return self.fn_type;
        }
        let src = self.store.borrow();
        let mut map = HashMap::new();
        dst.import_from(&src, self.fn_type, &mut map)
    }
}

impl fmt::Debug for TypedFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFunc")
            .field("type", &self.declared_type())
            .field("arity", &self.arity())
            .finish()
    }
}
