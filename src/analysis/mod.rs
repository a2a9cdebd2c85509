//! The inference-expression evaluator used to re-check typed calls.

pub mod infer;

pub use infer::{analyze, Expr, TypeEnv};
