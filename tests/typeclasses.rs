//! End-to-end behavior of the class registry: prelude instances, dependency
//! enforcement, and instances derived for declared algebraic types.

use typegraft::classes::prelude::{self, install_prelude};
use typegraft::{con, declare_adt, derive, var, Instance, Registry, TypeKey, Value};

fn prelude_registry() -> Registry {
    let mut reg = Registry::new();
    install_prelude(&mut reg).unwrap();
    reg
}

#[test]
fn prelude_covers_primitives_and_aggregates() {
    let reg = prelude_registry();
    let nested = Value::Tuple(vec![
        Value::Int(1),
        Value::List(vec![Value::Bool(true), Value::Bool(false)]),
    ]);
    assert_eq!(prelude::show(&reg, &nested).unwrap(), "(1, [True, False])");
    assert!(prelude::eq(&reg, &nested, &nested.clone()).unwrap());
    assert!(prelude::le(&reg, &Value::Str("a".into()), &Value::Str("b".into())).unwrap());
}

#[test]
fn dispatch_without_instance_fails() {
    let mut reg = Registry::new();
    reg.declare_class("Show", &[]).unwrap();
    let err = prelude::show(&reg, &Value::Int(1)).unwrap_err();
    assert!(err.to_string().contains("No instance for Show of int"));
}

#[test]
fn superclass_instances_are_required_first() {
    let mut reg = Registry::new();
    reg.declare_class("Eq", &[]).unwrap();
    reg.declare_class("Ord", &["Eq"]).unwrap();

    let err = reg
        .register_instance("Ord", TypeKey::Int, Instance::new())
        .unwrap_err();
    assert!(err.to_string().contains("requires an instance of Eq"));

    reg.register_instance("Eq", TypeKey::Int, Instance::new())
        .unwrap();
    reg.register_instance("Ord", TypeKey::Int, Instance::new())
        .unwrap();
}

#[test]
fn class_with_undeclared_dependency_is_rejected() {
    let mut reg = Registry::new();
    assert!(reg.declare_class("Ord", &["Eq"]).is_err());
}

#[test]
fn custom_instances_participate_in_recursive_dispatch() {
    let mut reg = prelude_registry();
    reg.declare_class("Pretty", &["Show"]).unwrap();
    reg.register_instance(
        "Pretty",
        TypeKey::Int,
        Instance::new().member("pretty", |reg, args| {
            let shown = prelude::show(reg, &args[0])?;
            Ok(Value::Str(format!("<{}>", shown)))
        }),
    )
    .unwrap();

    let out = reg.method("Pretty", "pretty", &[Value::Int(9)]).unwrap();
    assert_eq!(out, Value::Str("<9>".into()));
}

#[test]
fn derived_instances_for_an_enumeration() {
    let mut reg = prelude_registry();
    let color = declare_adt(
        "Color",
        &[],
        vec![("Red", vec![]), ("Green", vec![]), ("Blue", vec![])],
    )
    .unwrap();
    derive(&mut reg, &color, &["Show", "Eq", "Ord"]).unwrap();

    let ctors = color.constructors().unwrap();
    let red = ctors[0].clone();
    let green = ctors[1].clone();
    let blue = ctors[2].clone();

    assert_eq!(prelude::show(&reg, &red).unwrap(), "Red");
    assert!(prelude::eq(&reg, &red, &red.clone()).unwrap());
    assert!(prelude::ne(&reg, &red, &green).unwrap());
    // Declaration order: Red < Green < Blue.
    assert!(prelude::lt(&reg, &red, &green).unwrap());
    assert!(prelude::lt(&reg, &green, &blue).unwrap());
    assert!(prelude::gt(&reg, &blue, &red).unwrap());
}

#[test]
fn derived_instances_recurse_into_fields() {
    let mut reg = prelude_registry();
    let maybe = declare_adt(
        "MaybeInt",
        &[],
        vec![("Nothing", vec![]), ("Just", vec![con("int")])],
    )
    .unwrap();
    derive(&mut reg, &maybe, &["Show", "Eq", "Ord"]).unwrap();

    let ctors = maybe.constructors().unwrap();
    let nothing = ctors[0].clone();
    let just = ctors[1].as_func().unwrap();

    let just5 = just.call(&[Value::Int(5)]).unwrap();
    let just7 = just.call(&[Value::Int(7)]).unwrap();

    assert_eq!(prelude::show(&reg, &just5).unwrap(), "Just(5)");
    assert!(prelude::lt(&reg, &nothing, &just5).unwrap());
    assert!(prelude::lt(&reg, &just5, &just7).unwrap());
    assert!(prelude::eq(&reg, &just5, &just5.clone()).unwrap());
    assert!(prelude::ne(&reg, &just5, &just7).unwrap());
}

#[test]
fn constructors_enforce_declared_field_types() {
    let maybe = declare_adt(
        "MaybeNum",
        &[],
        vec![("None", vec![]), ("Some", vec![con("int")])],
    )
    .unwrap();
    let ctors = maybe.constructors().unwrap();
    let some = ctors[1].as_func().unwrap();

    assert!(some.call(&[Value::Str("five".into())]).is_err());
    assert!(some.call(&[Value::Int(5)]).is_ok());
}

#[test]
fn parameterized_constructors_observe_their_arguments() {
    let pair = declare_adt(
        "Pair",
        &["a", "b"],
        vec![("Pair", vec![var("a"), var("b")])],
    )
    .unwrap();
    let ctors = pair.constructors().unwrap();
    let mk = ctors[0].as_func().unwrap();

    let v = mk
        .call(&[Value::Int(1), Value::Str("one".into())])
        .unwrap();
    match &v {
        Value::Data(d) => {
            assert_eq!(d.variant().name, "Pair");
            assert_eq!(d.fields, vec![Value::Int(1), Value::Str("one".into())]);
        }
        other => panic!("expected data value, got {:?}", other),
    }

    // Partial application of a constructor is a typed function too.
    let half = mk.call(&[Value::Bool(true)]).unwrap();
    let done = half
        .as_func()
        .unwrap()
        .call(&[Value::Float(0.5)])
        .unwrap();
    assert!(matches!(done, Value::Data(_)));
}
