//! Runtime metadata for algebraic data types.
//!
//! The crate does not define an ADT declaration syntax; it defines the
//! reflection metadata that syntax layers produce once at construction time
//! and that the derive mechanism and observed-type extraction operate over:
//! the type constructor's name and parameters, each variant's field terms,
//! and the variant's declaration-order ordinal.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::intern::{self, Symbol};
use crate::errors::{Result, TypeError};
use crate::runtime::value::Value;
use crate::signature::{applied, var, SigTerm, Signature};

/// Unique tag of a declared algebraic type; the dispatch key for its values.
pub type AdtTag = u32;

static NEXT_TAG: AtomicU32 = AtomicU32::new(0);

/// Tag-to-name mapping, for rendering dispatch keys in diagnostics.
static TAG_NAMES: Lazy<DashMap<AdtTag, String>> = Lazy::new(DashMap::new);

/// Resolve an ADT tag back to the declared type name.
pub fn tag_name(tag: AdtTag) -> String {
    TAG_NAMES
        .get(&tag)
        .map(|r| r.value().clone())
        .unwrap_or_else(|| format!("<adt:{}>", tag))
}

/// One data constructor: name, field terms, declaration-order ordinal.
#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub name: String,
    pub fields: Vec<SigTerm>,
    pub ordinal: usize,
}

/// Reflection metadata for an algebraic type, captured once at construction.
#[derive(Debug)]
pub struct AdtInfo {
    pub name: String,
    /// Interned operator name of the type constructor.
    pub symbol: Symbol,
    /// Lowercase type parameter names.
    pub params: Vec<String>,
    pub variants: Vec<VariantInfo>,
    pub tag: AdtTag,
}

/// A constructed algebraic value: which constructor, and its field values.
#[derive(Clone)]
pub struct DataValue {
    pub info: Rc<AdtInfo>,
    pub ordinal: usize,
    pub fields: Vec<Value>,
}

impl DataValue {
    pub fn variant(&self) -> &VariantInfo {
        &self.info.variants[self.ordinal]
    }

    /// The field value standing at type parameter `param`, if any variant
    /// field is declared with exactly that parameter type.
    pub fn field_for_param(&self, param: &str) -> Option<&Value> {
        let variant = self.variant();
        variant
            .fields
            .iter()
            .position(|f| matches!(f, SigTerm::Var(name) if name == param))
            .map(|i| &self.fields[i])
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        self.info.tag == other.info.tag
            && self.ordinal == other.ordinal
            && self.fields == other.fields
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = self.variant();
        if self.fields.is_empty() {
            write!(f, "{}", variant.name)
        } else {
            f.debug_tuple(&variant.name)
                .field(&self.fields)
                .finish()
        }
    }
}

/// Declare a new algebraic type and capture its metadata.
///
/// `variants` are `(constructor name, field terms)` pairs in declaration
/// order; the order fixes the derived ordering of the constructors.
pub fn declare_adt(
    name: &str,
    params: &[&str],
    variants: Vec<(&str, Vec<SigTerm>)>,
) -> Result<Rc<AdtInfo>> {
    if variants.is_empty() {
        return Err(TypeError::signature(format!(
            "type {} declares no data constructors",
            name
        )));
    }
    for param in params {
        if param.is_empty() || !param.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(TypeError::signature(format!(
                "type parameters must be lowercase identifiers, got '{}'",
                param
            )));
        }
    }
    let tag = NEXT_TAG.fetch_add(1, Ordering::SeqCst);
    TAG_NAMES.insert(tag, name.to_string());
    Ok(Rc::new(AdtInfo {
        name: name.to_string(),
        symbol: intern::intern(name),
        params: params.iter().map(|p| p.to_string()).collect(),
        variants: variants
            .into_iter()
            .enumerate()
            .map(|(ordinal, (vname, fields))| VariantInfo {
                name: vname.to_string(),
                fields,
                ordinal,
            })
            .collect(),
        tag,
    }))
}

impl AdtInfo {
    /// The signature term for this type applied to its own parameters,
    /// i.e. the return term of every data constructor.
    pub fn applied_term(self: &Rc<Self>) -> SigTerm {
        if self.params.is_empty() {
            SigTerm::Adt(self.clone())
        } else {
            applied(
                SigTerm::Adt(self.clone()),
                self.params.iter().map(|p| var(p)).collect(),
            )
        }
    }

    /// Build the runtime constructor for variant `ordinal`: a plain data
    /// value for nullary constructors, otherwise a typed function from the
    /// field terms to the applied type.
    pub fn constructor(self: &Rc<Self>, ordinal: usize) -> Result<Value> {
        let variant = self.variants.get(ordinal).ok_or_else(|| {
            TypeError::signature(format!(
                "type {} has no constructor at position {}",
                self.name, ordinal
            ))
        })?;
        if variant.fields.is_empty() {
            return Ok(Value::Data(DataValue {
                info: self.clone(),
                ordinal,
                fields: Vec::new(),
            }));
        }
        let mut terms = variant.fields.clone();
        terms.push(self.applied_term());
        let sig = Signature::new(terms);
        let info = self.clone();
        let wrapper = crate::runtime::func::typed_fn(&sig, move |args| {
            Ok(Value::Data(DataValue {
                info: info.clone(),
                ordinal,
                fields: args.to_vec(),
            }))
        })?;
        Ok(Value::Func(wrapper))
    }

    /// Build all constructors in declaration order.
    pub fn constructors(self: &Rc<Self>) -> Result<Vec<Value>> {
        (0..self.variants.len())
            .map(|i| self.constructor(i))
            .collect()
    }
}
