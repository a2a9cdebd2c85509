//! Derived Show, Eq, and Ord instances for declared algebraic types.
//!
//! Derivation reads the reflection metadata recorded at declaration time.
//! Ordering is by variant declaration order first, then by the fields of
//! matching variants left to right, each through the registry so nested
//! algebraic values compare with their own derived instances.

use std::cmp::Ordering;
use std::rc::Rc;

use tracing::debug;

use crate::classes::adt::{AdtInfo, DataValue};
use crate::classes::prelude::{self, ordering_to_value};
use crate::classes::registry::{Instance, Registry, TypeKey};
use crate::errors::{Result, TypeError};
use crate::runtime::value::Value;
use crate::signature::SigTerm;

/// Dispatch key of a signature term, when the term names a concrete
/// outermost shape. Variables and applied variables have no key until a
/// value arrives.
pub fn key_of_sigterm(term: &SigTerm) -> Option<TypeKey> {
    match term {
        SigTerm::Con(name) => match name.as_str() {
            "int" => Some(TypeKey::Int),
            "float" => Some(TypeKey::Float),
            "bool" => Some(TypeKey::Bool),
            "str" => Some(TypeKey::Str),
            "()" => Some(TypeKey::Unit),
            _ => None,
        },
        SigTerm::Unit => Some(TypeKey::Unit),
        SigTerm::Fun(_) => Some(TypeKey::Func),
        SigTerm::List(_) => Some(TypeKey::List),
        SigTerm::Tuple(_) => Some(TypeKey::Tuple),
        SigTerm::Adt(info) => Some(TypeKey::Adt(info.tag)),
        SigTerm::Applied(head, _) => match head.as_ref() {
            SigTerm::Adt(info) => Some(TypeKey::Adt(info.tag)),
            _ => None,
        },
        SigTerm::Var(_) => None,
    }
}

/// Every concrete field type must already have an instance of `class`,
/// otherwise the derived members would fail on first use.
fn check_field_instances(reg: &Registry, class: &str, info: &AdtInfo) -> Result<()> {
    for variant in &info.variants {
        for field in &variant.fields {
            if let Some(key) = key_of_sigterm(field) {
                if !reg.has_instance(class, key) {
                    return Err(TypeError::missing_dependency(
                        &info.name,
                        class,
                        key.to_string(),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn data_pair<'a>(args: &'a [Value]) -> Result<(&'a DataValue, &'a DataValue)> {
    match (&args[0], &args[1]) {
        (Value::Data(a), Value::Data(b)) if a.info.tag == b.info.tag => Ok((a, b)),
        (a, b) => Err(TypeError::mismatch(a.kind_name(), b.kind_name())),
    }
}

/// Derive a Show instance rendering `Variant` or `Variant(f1, f2)`.
pub fn derive_show(reg: &mut Registry, info: &Rc<AdtInfo>) -> Result<()> {
    check_field_instances(reg, "Show", info)?;
    let member = move |reg: &Registry, args: &[Value]| -> Result<Value> {
        let data = match &args[0] {
            Value::Data(d) => d,
            other => return Err(TypeError::no_instance("Show", other.kind_name())),
        };
        let name = &data.variant().name;
        if data.fields.is_empty() {
            return Ok(Value::Str(name.clone()));
        }
        let parts = data
            .fields
            .iter()
            .map(|f| prelude::show(reg, f))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Str(format!("{}({})", name, parts.join(", "))))
    };
    debug!(ty = %info.name, "derived Show");
    reg.register_instance(
        "Show",
        TypeKey::Adt(info.tag),
        Instance::new().member("show", member),
    )
}

/// Derive an Eq instance: same variant and all fields equal.
pub fn derive_eq(reg: &mut Registry, info: &Rc<AdtInfo>) -> Result<()> {
    check_field_instances(reg, "Eq", info)?;
    let member = move |reg: &Registry, args: &[Value]| -> Result<Value> {
        let (a, b) = data_pair(args)?;
        if a.ordinal != b.ordinal {
            return Ok(Value::Bool(false));
        }
        for (x, y) in a.fields.iter().zip(b.fields.iter()) {
            if !prelude::eq(reg, x, y)? {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    };
    debug!(ty = %info.name, "derived Eq");
    reg.register_instance(
        "Eq",
        TypeKey::Adt(info.tag),
        Instance::new().member("eq", member),
    )
}

/// Derive an Ord instance: declaration order between variants, field order
/// within a variant.
pub fn derive_ord(reg: &mut Registry, info: &Rc<AdtInfo>) -> Result<()> {
    check_field_instances(reg, "Ord", info)?;
    let member = move |reg: &Registry, args: &[Value]| -> Result<Value> {
        let (a, b) = data_pair(args)?;
        let by_variant = a.ordinal.cmp(&b.ordinal);
        if by_variant != Ordering::Equal {
            return Ok(ordering_to_value(by_variant));
        }
        for (x, y) in a.fields.iter().zip(b.fields.iter()) {
            let o = prelude::cmp(reg, x, y)?;
            if o != Ordering::Equal {
                return Ok(ordering_to_value(o));
            }
        }
        Ok(ordering_to_value(Ordering::Equal))
    };
    debug!(ty = %info.name, "derived Ord");
    reg.register_instance(
        "Ord",
        TypeKey::Adt(info.tag),
        Instance::new().member("cmp", member),
    )
}

/// Derive the named classes in order. Only Show, Eq, and Ord are derivable.
pub fn derive(reg: &mut Registry, info: &Rc<AdtInfo>, classes: &[&str]) -> Result<()> {
    for class in classes {
        match *class {
            "Show" => derive_show(reg, info)?,
            "Eq" => derive_eq(reg, info)?,
            "Ord" => derive_ord(reg, info)?,
            other => {
                return Err(TypeError::signature(format!(
                    "class {} cannot be derived",
                    other
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::adt::declare_adt;
    use crate::classes::prelude::install_prelude;
    use crate::signature::con;

    fn color() -> Rc<AdtInfo> {
        declare_adt(
            "Color",
            &[],
            vec![("Red", vec![]), ("Green", vec![]), ("Blue", vec![])],
        )
        .unwrap()
    }

    fn value_of(info: &Rc<AdtInfo>, ordinal: usize, fields: Vec<Value>) -> Value {
        Value::Data(DataValue {
            info: info.clone(),
            ordinal,
            fields,
        })
    }

    #[test]
    fn test_derived_ord_follows_declaration_order() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let info = color();
        derive(&mut reg, &info, &["Eq", "Ord"]).unwrap();
        let red = value_of(&info, 0, vec![]);
        let blue = value_of(&info, 2, vec![]);
        assert!(prelude::lt(&reg, &red, &blue).unwrap());
        assert!(prelude::ge(&reg, &blue, &red).unwrap());
    }

    #[test]
    fn test_derived_show_renders_fields() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let info = declare_adt(
            "Shape",
            &[],
            vec![("Point", vec![]), ("Circle", vec![con("int")])],
        )
        .unwrap();
        derive_show(&mut reg, &info).unwrap();
        let point = value_of(&info, 0, vec![]);
        let circle = value_of(&info, 1, vec![Value::Int(4)]);
        assert_eq!(prelude::show(&reg, &point).unwrap(), "Point");
        assert_eq!(prelude::show(&reg, &circle).unwrap(), "Circle(4)");
    }

    #[test]
    fn test_derived_eq_compares_fields() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let info = declare_adt("Wrap", &[], vec![("Wrap", vec![con("int")])]).unwrap();
        derive_eq(&mut reg, &info).unwrap();
        let a = value_of(&info, 0, vec![Value::Int(1)]);
        let b = value_of(&info, 0, vec![Value::Int(1)]);
        let c = value_of(&info, 0, vec![Value::Int(2)]);
        assert!(prelude::eq(&reg, &a, &b).unwrap());
        assert!(!prelude::eq(&reg, &a, &c).unwrap());
    }

    #[test]
    fn test_ord_requires_eq_first() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let info = color();
        let err = derive_ord(&mut reg, &info).unwrap_err();
        assert!(err.to_string().contains("instance of Eq"));
    }

    #[test]
    fn test_nested_adt_field_needs_its_own_instance() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let inner = color();
        let outer = declare_adt(
            "Paint",
            &[],
            vec![("Paint", vec![SigTerm::Adt(inner.clone())])],
        )
        .unwrap();
        // Color has no Show instance yet, so deriving Show for Paint fails.
        let err = derive_show(&mut reg, &outer).unwrap_err();
        assert!(err.to_string().contains("Show"));
        derive_show(&mut reg, &inner).unwrap();
        derive_show(&mut reg, &outer).unwrap();
    }

    #[test]
    fn test_unknown_class_cannot_be_derived() {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        let info = color();
        assert!(derive(&mut reg, &info, &["Monoid"]).is_err());
    }
}
