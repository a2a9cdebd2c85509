//! Host values and runtime-checked typed functions.

pub mod func;
pub mod value;

pub use func::{typed_fn, HostFn, TypedFunc};
pub use value::{observed_type, Value};
