//! Typeclass registry, algebraic data declarations, and derived instances.

pub mod adt;
pub mod derive;
pub mod prelude;
pub mod registry;

pub use adt::{declare_adt, tag_name, AdtInfo, AdtTag, DataValue, VariantInfo};
pub use derive::{derive, derive_eq, derive_ord, derive_show};
pub use prelude::install_prelude;
pub use registry::{Instance, Member, Registry, TypeKey};
