//! Core type machinery: interned symbols, the type term arena, and the
//! unification engine that operates over it.

pub mod intern;
pub mod term;
pub mod unify;


pub use intern::{intern, resolve, Symbol};
pub use term::{OperName, Term, TermId, TypeStore, VarData};
