//! Hindley-Milner type inference and typeclass dispatch for values of a
//! dynamically-typed host.
//!
//! Functions declare polymorphic signatures through [`Signature`], get
//! wrapped by [`typed_fn`], and are checked on every application: arguments
//! are unified against a fresh instance of the declared type before the
//! callable runs, and the result is unified after. Applying fewer arguments
//! than the arity returns a curried partial application. A [`Registry`]
//! holds typeclasses with superclass dependencies and dispatches members on
//! the outermost shape of a value, including algebraic types declared with
//! [`declare_adt`] and instances derived from their metadata.

// Core modules
pub mod analysis;
pub mod classes;
pub mod core;
pub mod errors;
pub mod logging;
pub mod runtime;
pub mod signature;

// Re-export commonly used items
pub use analysis::{analyze, Expr, TypeEnv};
pub use classes::{
    declare_adt, derive, derive_eq, derive_ord, derive_show, install_prelude, AdtInfo, DataValue,
    Instance, Registry, TypeKey,
};
pub use crate::core::{Term, TermId, TypeStore};
pub use errors::{ErrorKind, Result, TypeError};
pub use logging::{init_default_logging, init_logging, LogConfig, LogFormat};
pub use runtime::{observed_type, typed_fn, HostFn, TypedFunc, Value};
pub use signature::{applied, con, fun, list, tuple, var, SigTerm, Signature};
