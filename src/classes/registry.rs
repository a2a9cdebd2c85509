//! Typeclass declaration, instance registration, and method dispatch.
//!
//! The registry is an explicit value threaded through dispatch rather than a
//! global table, so independent registries can coexist and members can
//! recurse through the registry they were installed in. Dispatch keys on the
//! outermost shape of a value; nested shapes are the member's business.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::classes::adt::{tag_name, AdtTag};
use crate::errors::{Result, TypeError};
use crate::runtime::value::Value;

/// Dispatch key: the outermost constructor of a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum TypeKey {
    Unit,
    Bool,
    Int,
    Float,
    Str,
    Tuple,
    List,
    Func,
    Adt(AdtTag),
}

impl TypeKey {
    /// Key of a value, or `None` for the undefined sentinel, which belongs
    /// to no class.
    pub fn of(value: &Value) -> Option<TypeKey> {
        match value {
            Value::Unit => Some(TypeKey::Unit),
            Value::Bool(_) => Some(TypeKey::Bool),
            Value::Int(_) => Some(TypeKey::Int),
            Value::Float(_) => Some(TypeKey::Float),
            Value::Str(_) => Some(TypeKey::Str),
            Value::Tuple(_) => Some(TypeKey::Tuple),
            Value::List(_) => Some(TypeKey::List),
            Value::Func(_) => Some(TypeKey::Func),
            Value::Data(d) => Some(TypeKey::Adt(d.info.tag)),
            Value::Undefined => None,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Unit => write!(f, "()"),
            TypeKey::Bool => write!(f, "bool"),
            TypeKey::Int => write!(f, "int"),
            TypeKey::Float => write!(f, "float"),
            TypeKey::Str => write!(f, "str"),
            TypeKey::Tuple => write!(f, "tuple"),
            TypeKey::List => write!(f, "list"),
            TypeKey::Func => write!(f, "function"),
            TypeKey::Adt(tag) => write!(f, "{}", tag_name(*tag)),
        }
    }
}

/// A member implementation. Receives the registry so it can dispatch
/// recursively into element types.
pub type Member = Rc<dyn Fn(&Registry, &[Value]) -> Result<Value>>;

/// The member table of one instance.
#[derive(Clone, Default)]
pub struct Instance {
    members: HashMap<String, Member>,
}

impl Instance {
    pub fn new() -> Self {
        Instance::default()
    }

    pub fn member<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Registry, &[Value]) -> Result<Value> + 'static,
    {
        self.members.insert(name.to_string(), Rc::new(f));
        self
    }
}

struct ClassDef {
    /// Direct and inherited dependencies, flattened at declaration.
    deps: Vec<String>,
    instances: HashMap<TypeKey, Instance>,
}

/// All declared classes and their registered instances.
#[derive(Default)]
pub struct Registry {
    classes: HashMap<String, ClassDef>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Declare a class with the named superclass dependencies. Dependencies
    /// must already be declared; their own dependencies are folded in so
    /// later registration checks are a flat scan.
    pub fn declare_class(&mut self, name: &str, deps: &[&str]) -> Result<()> {
        if self.classes.contains_key(name) {
            return Err(TypeError::signature(format!(
                "typeclass {} is already declared",
                name
            )));
        }
        let mut flattened: Vec<String> = Vec::new();
        for dep in deps {
            let def = self.classes.get(*dep).ok_or_else(|| {
                TypeError::signature(format!(
                    "typeclass {} depends on undeclared class {}",
                    name, dep
                ))
            })?;
            for inherited in &def.deps {
                if !flattened.iter().any(|d| d == inherited) {
                    flattened.push(inherited.clone());
                }
            }
            if !flattened.iter().any(|d| d == *dep) {
                flattened.push(dep.to_string());
            }
        }
        debug!(class = name, deps = ?flattened, "declared typeclass");
        self.classes.insert(
            name.to_string(),
            ClassDef {
                deps: flattened,
                instances: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn has_instance(&self, class: &str, key: TypeKey) -> bool {
        self.classes
            .get(class)
            .map(|def| def.instances.contains_key(&key))
            .unwrap_or(false)
    }

    /// Register an instance of `class` for `key`. Every dependency of the
    /// class must already have an instance for the same key.
    pub fn register_instance(
        &mut self,
        class: &str,
        key: TypeKey,
        instance: Instance,
    ) -> Result<()> {
        let deps: Vec<String> = match self.classes.get(class) {
            Some(def) => def.deps.clone(),
            None => {
                return Err(TypeError::signature(format!(
                    "cannot register instance of undeclared class {}",
                    class
                )))
            }
        };
        for dep in &deps {
            if !self.has_instance(dep, key) {
                return Err(TypeError::missing_dependency(class, dep, key.to_string()));
            }
        }
        debug!(class, key = %key, "registered instance");
        if let Some(def) = self.classes.get_mut(class) {
            def.instances.insert(key, instance);
        }
        Ok(())
    }

    /// Look up `method` of `class` for `key` and invoke it with `args`.
    pub fn dispatch(
        &self,
        class: &str,
        method: &str,
        key: TypeKey,
        args: &[Value],
    ) -> Result<Value> {
        let instance = self
            .classes
            .get(class)
            .and_then(|def| def.instances.get(&key))
            .ok_or_else(|| TypeError::no_instance(class, key.to_string()))?;
        let member = instance.members.get(method).ok_or_else(|| {
            TypeError::signature(format!("class {} has no method {}", class, method))
        })?;
        member(self, args)
    }

    /// Dispatch on the key of the first argument.
    pub fn method(&self, class: &str, method: &str, args: &[Value]) -> Result<Value> {
        let first = args
            .first()
            .ok_or_else(|| TypeError::signature("dispatch requires at least one argument"))?;
        let key = TypeKey::of(first)
            .ok_or_else(|| TypeError::no_instance(class, first.kind_name()))?;
        self.dispatch(class, method, key, args)
    }
}
