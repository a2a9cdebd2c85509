//! The built-in classes Show, Eq, and Ord, with instances for every
//! primitive and aggregate host shape. Aggregate members recurse through the
//! registry, so user instances for element types participate automatically.

use std::cmp::Ordering;

use crate::classes::registry::{Instance, Registry, TypeKey};
use crate::errors::{Result, TypeError};
use crate::runtime::value::Value;

/// Declare Show, Eq, and Ord and install instances for the primitive and
/// aggregate shapes.
pub fn install_prelude(reg: &mut Registry) -> Result<()> {
    reg.declare_class("Show", &[])?;
    reg.declare_class("Eq", &[])?;
    reg.declare_class("Ord", &["Eq"])?;

    for key in [
        TypeKey::Unit,
        TypeKey::Bool,
        TypeKey::Int,
        TypeKey::Float,
        TypeKey::Str,
        TypeKey::Tuple,
        TypeKey::List,
    ] {
        reg.register_instance("Show", key, Instance::new().member("show", show_member))?;
        reg.register_instance("Eq", key, Instance::new().member("eq", eq_member))?;
        reg.register_instance("Ord", key, Instance::new().member("cmp", cmp_member))?;
    }
    Ok(())
}

fn show_member(reg: &Registry, args: &[Value]) -> Result<Value> {
    let rendered = match &args[0] {
        Value::Unit => "()".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Str(s) => format!("{:?}", s),
        Value::Tuple(vs) => {
            let parts = vs.iter().map(|v| show(reg, v)).collect::<Result<Vec<_>>>()?;
            format!("({})", parts.join(", "))
        }
        Value::List(vs) => {
            let parts = vs.iter().map(|v| show(reg, v)).collect::<Result<Vec<_>>>()?;
            format!("[{}]", parts.join(", "))
        }
        other => return Err(TypeError::no_instance("Show", other.kind_name())),
    };
    Ok(Value::Str(rendered))
}

fn eq_member(reg: &Registry, args: &[Value]) -> Result<Value> {
    let result = match (&args[0], &args[1]) {
        (Value::Unit, Value::Unit) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                false
            } else {
                let mut all = true;
                for (x, y) in a.iter().zip(b.iter()) {
                    if !eq(reg, x, y)? {
                        all = false;
                        break;
                    }
                }
                all
            }
        }
        (a, b) => {
            return Err(TypeError::mismatch(a.kind_name(), b.kind_name()));
        }
    };
    Ok(Value::Bool(result))
}

fn cmp_member(reg: &Registry, args: &[Value]) -> Result<Value> {
    let ordering = match (&args[0], &args[1]) {
        (Value::Unit, Value::Unit) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
            let mut ordering = Ordering::Equal;
            for (x, y) in a.iter().zip(b.iter()) {
                ordering = cmp(reg, x, y)?;
                if ordering != Ordering::Equal {
                    break;
                }
            }
            if ordering == Ordering::Equal {
                a.len().cmp(&b.len())
            } else {
                ordering
            }
        }
        (a, b) => {
            return Err(TypeError::mismatch(a.kind_name(), b.kind_name()));
        }
    };
    Ok(ordering_to_value(ordering))
}

pub(crate) fn ordering_to_value(o: Ordering) -> Value {
    Value::Int(match o {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

pub(crate) fn value_to_ordering(v: &Value) -> Result<Ordering> {
    match v {
        Value::Int(n) if *n < 0 => Ok(Ordering::Less),
        Value::Int(0) => Ok(Ordering::Equal),
        Value::Int(_) => Ok(Ordering::Greater),
        other => Err(TypeError::signature(format!(
            "comparison member returned {} instead of an ordering",
            other.kind_name()
        ))),
    }
}

/// Render a value through its Show instance.
pub fn show(reg: &Registry, v: &Value) -> Result<String> {
    match reg.method("Show", "show", std::slice::from_ref(v))? {
        Value::Str(s) => Ok(s),
        other => Err(TypeError::signature(format!(
            "show member returned {} instead of a string",
            other.kind_name()
        ))),
    }
}

/// Structural equality through the Eq instance of the operands.
pub fn eq(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    match reg.method("Eq", "eq", &[a.clone(), b.clone()])? {
        Value::Bool(r) => Ok(r),
        other => Err(TypeError::signature(format!(
            "eq member returned {} instead of a bool",
            other.kind_name()
        ))),
    }
}

pub fn ne(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    Ok(!eq(reg, a, b)?)
}

/// Total ordering through the Ord instance of the operands.
pub fn cmp(reg: &Registry, a: &Value, b: &Value) -> Result<Ordering> {
    let raw = reg.method("Ord", "cmp", &[a.clone(), b.clone()])?;
    value_to_ordering(&raw)
}

pub fn lt(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    Ok(cmp(reg, a, b)? == Ordering::Less)
}

pub fn le(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    Ok(cmp(reg, a, b)? != Ordering::Greater)
}

pub fn gt(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    Ok(cmp(reg, a, b)? == Ordering::Greater)
}

pub fn ge(reg: &Registry, a: &Value, b: &Value) -> Result<bool> {
    Ok(cmp(reg, a, b)? != Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prelude() -> Registry {
        let mut reg = Registry::new();
        install_prelude(&mut reg).unwrap();
        reg
    }

    #[test]
    fn test_show_primitives() {
        let reg = prelude();
        assert_eq!(show(&reg, &Value::Int(5)).unwrap(), "5");
        assert_eq!(show(&reg, &Value::Bool(true)).unwrap(), "True");
        assert_eq!(show(&reg, &Value::Str("hi".into())).unwrap(), "\"hi\"");
        assert_eq!(show(&reg, &Value::Unit).unwrap(), "()");
    }

    #[test]
    fn test_show_recurses_through_aggregates() {
        let reg = prelude();
        let v = Value::List(vec![
            Value::Tuple(vec![Value::Int(1), Value::Bool(false)]),
            Value::Tuple(vec![Value::Int(2), Value::Bool(true)]),
        ]);
        assert_eq!(show(&reg, &v).unwrap(), "[(1, False), (2, True)]");
    }

    #[test]
    fn test_eq_and_ne() {
        let reg = prelude();
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let c = Value::List(vec![Value::Int(1)]);
        assert!(eq(&reg, &a, &b).unwrap());
        assert!(ne(&reg, &a, &c).unwrap());
    }

    #[test]
    fn test_ord_is_lexicographic_on_lists() {
        let reg = prelude();
        let shorter = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let longer = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(0)]);
        let bigger = Value::List(vec![Value::Int(2)]);
        assert!(lt(&reg, &shorter, &longer).unwrap());
        assert!(lt(&reg, &shorter, &bigger).unwrap());
        assert!(ge(&reg, &bigger, &longer).unwrap());
    }

    #[test]
    fn test_float_ordering_is_total() {
        let reg = prelude();
        assert!(lt(&reg, &Value::Float(1.0), &Value::Float(2.0)).unwrap());
        assert!(le(&reg, &Value::Float(2.0), &Value::Float(2.0)).unwrap());
    }

    #[test]
    fn test_mixed_operands_are_a_mismatch() {
        let reg = prelude();
        assert!(eq(&reg, &Value::Int(1), &Value::Str("1".into())).is_err());
    }
}
