use super::{number_to_string, Context, Object, Value, ValueKind};
use serde_json::json;

#[test]
fn object_keeps_insertion_order_on_overwrite() {
    let mut object = Object::new();
    object.insert("b", Value::from(1));
    object.insert("a", Value::from(2));
    object.insert("b", Value::from(3));
    assert_eq!(object.iter().map(|(key, _)| key).collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(object.get("b"), Some(&Value::Number(3.0)));
    assert!(object.get("c").is_none());
}

#[test]
fn derived_context_does_not_touch_parent() {
    let outer = Context::new().with("a", 1).with("b", 2);
    let mut derived = outer.clone();
    assert!(derived.shares_bindings_with(&outer));

    derived.insert("a", 10);
    assert!(!derived.shares_bindings_with(&outer));
    assert_eq!(outer.lookup("a"), Value::Number(1.0));
    assert_eq!(derived.lookup("a"), Value::Number(10.0));
    assert_eq!(derived.lookup("b"), Value::Number(2.0));
    assert_eq!(derived.lookup("missing"), Value::Undefined);
}

#[test]
fn truthiness_follows_js() {
    assert!(!Value::Undefined.is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Number(f64::NAN).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("0").is_truthy());
    assert!(Value::Array(Vec::new()).is_truthy());
    assert!(Value::Object(Object::new()).is_truthy());
}

#[test]
fn converts_from_and_to_json() {
    let value = Value::from(json!({ "a": [1, "x", true, null], "b": { "c": 1.5 } }));
    let Value::Object(object) = &value else {
        panic!("expected object");
    };
    assert_eq!(object.get("a").map(Value::kind), Some(ValueKind::Array));
    assert_eq!(value.to_json(), json!({ "a": [1.0, "x", true, null], "b": { "c": 1.5 } }));

    let function = Value::function(|_| Ok(Value::Undefined));
    assert_eq!(Value::Array(vec![Value::Undefined, function, Value::Number(f64::INFINITY)]).to_json(), json!([null, null, null]));
}

#[test]
fn functions_compare_by_identity() {
    let function = Value::function(|args| Ok(args.first().cloned().unwrap_or(Value::Undefined)));
    assert_eq!(function, function.clone());
    assert_ne!(function, Value::function(|_| Ok(Value::Undefined)));
    let result = function.call(&[Value::from(7)]).expect("callable").expect("call");
    assert_eq!(result, Value::Number(7.0));
    assert!(Value::Null.call(&[]).is_none());
}

#[test]
fn displays_literal_form() {
    let object: Object = [("a", Value::from(1)), ("b", Value::from("x"))].into_iter().collect();
    let value = Value::Array(vec![Value::Object(object), Value::Null, Value::Bool(false)]);
    assert_eq!(value.to_string(), "[{ a: 1, b: 'x' }, null, false]");
    assert_eq!(Value::Object(Object::new()).to_string(), "{}");
}

#[test]
fn formats_numbers_like_js() {
    assert_eq!(number_to_string(1.0), "1");
    assert_eq!(number_to_string(0.5), "0.5");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
}
