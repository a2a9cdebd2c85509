//! The dynamic host value model and observed-type extraction.
//!
//! `observed_type` is the bridge between host values and the type term
//! model: every value maps to a term in the caller's arena. Typed functions
//! contribute their declared type (imported across arenas when needed),
//! algebraic values contribute their constructor applied to the observed
//! types of parameter-typed fields, and the `Undefined` sentinel observes as
//! a fresh variable so it unifies with anything.

use std::fmt;

use crate::classes::adt::DataValue;
use crate::core::term::{OperName, TermId, TypeStore};
use crate::runtime::func::TypedFunc;

/// A value of the dynamically-typed host.
#[derive(Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Func(TypedFunc),
    Data(DataValue),
    /// Reserved placeholder with no concrete type; short-circuits typed
    /// application so pattern-driven recursive definitions do not
    /// over-evaluate.
    Undefined,
}

impl Value {
    pub fn as_func(&self) -> Option<&TypedFunc> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short human-readable kind of the value, for diagnostics.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Unit => "()".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "str".into(),
            Value::Tuple(_) => "tuple".into(),
            Value::List(_) => "list".into(),
            Value::Func(_) => "function".into(),
            Value::Data(d) => d.info.name.clone(),
            Value::Undefined => "undefined".into(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.same_callable(b),
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Undefined, Value::Undefined) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Tuple(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::List(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Func(func) => write!(f, "<typed function of arity {}>", func.arity()),
            Value::Data(d) => write!(f, "{:?}", d),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Extract the type of a host value as a term in `store`.
pub fn observed_type(store: &mut TypeStore, value: &Value) -> TermId {
    match value {
        Value::Undefined => store.new_var(),
        Value::Unit => store.con("()"),
        Value::Bool(_) => store.con("bool"),
        Value::Int(_) => store.con("int"),
        Value::Float(_) => store.con("float"),
        Value::Str(_) => store.con("str"),
        Value::Tuple(vs) => {
            let elems: Vec<TermId> = vs.iter().map(|v| observed_type(store, v)).collect();
            store.tuple_of(elems)
        }
        Value::List(vs) => {
            // Lists are homogeneous by construction; the first element
            // stands for all of them, and an empty list stays polymorphic.
            let elem = match vs.first() {
                Some(first) => observed_type(store, first),
                None => store.new_var(),
            };
            store.list_of(elem)
        }
        Value::Func(func) => func.import_type_into(store),
        Value::Data(data) => {
            let args: Vec<TermId> = data
                .info
                .params
                .iter()
                .map(|p| match data.field_for_param(p) {
                    Some(field) => observed_type(store, field),
                    None => store.new_var(),
                })
                .collect();
            store.oper(OperName::Con(data.info.symbol), args)
        }
    }
}
