use std::fs;
use std::path::Path;

use contentvar_core::{
    ContentVariable, Direction, MessageKind, MessageObject, Service, ValidationError,
    ValidationOptions, VariableType, validate, validate_contents, validate_report,
};
use serde_json::{Value, json};

fn load_json(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let contents =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse json")
}

fn load_service(name: &str) -> Service {
    serde_json::from_value(load_json(name)).expect("parse service")
}

fn object(value: Value) -> MessageObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn simple_service() -> Service {
    Service::with_outputs(vec![ContentVariable::new("simple", VariableType::String)])
}

const MATRIX: [(bool, bool); 4] = [(true, true), (true, false), (false, true), (false, false)];

#[test]
fn additional_field_matrix() {
    let service = simple_service();
    let msg = object(json!({"simple": "abc", "extra": "foo"}));

    for (additional, missing) in MATRIX {
        let result = validate(&msg, &service, ValidationOptions::new(additional, missing));
        if additional {
            assert!(result.is_ok(), "({additional},{missing}) should pass: {result:?}");
        } else {
            assert_eq!(
                result,
                Err(ValidationError::UnexpectedField("extra".to_string())),
                "({additional},{missing})"
            );
        }
    }
}

#[test]
fn missing_field_matrix() {
    let service = simple_service();
    let msg = MessageObject::new();

    for (additional, missing) in MATRIX {
        let result = validate(&msg, &service, ValidationOptions::new(additional, missing));
        if missing {
            assert!(result.is_ok(), "({additional},{missing}) should pass: {result:?}");
        } else {
            assert_eq!(
                result,
                Err(ValidationError::MissingField("simple".to_string())),
                "({additional},{missing})"
            );
        }
    }
}

#[test]
fn numbers_are_loosely_typed() {
    let service = Service::with_outputs(vec![
        ContentVariable::new("int", VariableType::Integer),
        ContentVariable::new("float", VariableType::Float),
    ]);
    let msg = object(json!({"int": 4.2, "float": 24}));

    assert!(validate(&msg, &service, ValidationOptions::strict()).is_ok());
}

#[test]
fn complex_fixture_validates_strictly() {
    let service = load_service("complex.service.json");
    let msg = object(load_json("complex.message.json"));

    assert!(validate(&msg, &service, ValidationOptions::strict()).is_ok());
}

#[test]
fn nested_missing_field_follows_policy() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"]["map"]
        .as_object_mut()
        .expect("map object")
        .remove("str3");

    assert_eq!(
        validate(&msg, &service, ValidationOptions::strict()),
        Err(ValidationError::MissingField("str3".to_string()))
    );
    assert!(validate(&msg, &service, ValidationOptions::new(false, true)).is_ok());
}

#[test]
fn nested_additional_field_follows_policy() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"]["map"]["foo"] = json!("bar");

    assert_eq!(
        validate(&msg, &service, ValidationOptions::strict()),
        Err(ValidationError::UnexpectedField("foo".to_string()))
    );
    assert!(validate(&msg, &service, ValidationOptions::new(true, false)).is_ok());
}

#[test]
fn wildcard_list_accepts_any_length() {
    let service = load_service("complex.service.json");
    for list in [json!([]), json!(["a"]), json!(["a", "b", "c", "d", "e"])] {
        let mut msg = object(load_json("complex.message.json"));
        msg["complex"]["list"] = list.clone();
        assert!(
            validate(&msg, &service, ValidationOptions::strict()).is_ok(),
            "list {list} should validate"
        );
    }
}

#[test]
fn wildcard_list_checks_every_element() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"]["list"] = json!(["a", 1]);

    let err = validate(&msg, &service, ValidationOptions::lenient()).expect_err("number in list");
    assert_eq!(err.code(), "unexpected_type");
}

#[test]
fn indexed_list_length_follows_policy() {
    let service = load_service("list.service.json");

    let long = object(json!({"list": ["a", "b", "c", "d"]}));
    assert_eq!(
        validate(&long, &service, ValidationOptions::strict()),
        Err(ValidationError::UnexpectedField("3".to_string()))
    );
    assert!(validate(&long, &service, ValidationOptions::new(true, false)).is_ok());

    let short = object(json!({"list": ["a", "b"]}));
    assert_eq!(
        validate(&short, &service, ValidationOptions::strict()),
        Err(ValidationError::MissingField("2".to_string()))
    );
    assert!(validate(&short, &service, ValidationOptions::new(false, true)).is_ok());
}

#[test]
fn scalar_type_mismatch_names_the_variable() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"]["int"] = json!("7");

    assert_eq!(
        validate(&msg, &service, ValidationOptions::lenient()),
        Err(ValidationError::UnexpectedType {
            name: "int".to_string(),
            expected: VariableType::Integer,
            actual: MessageKind::String,
        })
    );
}

#[test]
fn container_shape_must_match() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"] = json!(["not", "a", "structure"]);

    assert_eq!(
        validate(&msg, &service, ValidationOptions::lenient()),
        Err(ValidationError::UnexpectedType {
            name: "complex".to_string(),
            expected: VariableType::Structure,
            actual: MessageKind::Array,
        })
    );
}

#[test]
fn null_leaf_is_accepted_only_when_missing_is_allowed() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg["complex"]["str"] = Value::Null;

    assert!(validate(&msg, &service, ValidationOptions::new(false, true)).is_ok());
    let err = validate(&msg, &service, ValidationOptions::strict()).expect_err("null str");
    assert_eq!(err.code(), "unexpected_type");
}

#[test]
fn schema_fields_are_checked_before_extra_keys() {
    let service = simple_service();
    let msg = object(json!({"extra": 1}));

    assert_eq!(
        validate(&msg, &service, ValidationOptions::strict()),
        Err(ValidationError::MissingField("simple".to_string()))
    );
}

#[test]
fn report_starts_with_the_fail_fast_error() {
    let service = load_service("complex.service.json");
    let mut msg = object(load_json("complex.message.json"));
    msg.remove("simple");
    msg["complex"]["bool"] = json!("false");
    msg["complex"]["map"]["foo"] = json!(1);
    msg.insert("extra".to_string(), json!(true));

    let options = ValidationOptions::strict();
    let err = validate(&msg, &service, options).expect_err("invalid message");
    let report = validate_report(&msg, &service, options);

    let first = report.first().expect("at least one issue");
    assert_eq!(first.code, err.code());
    assert_eq!(first.message, err.to_string());
    assert_eq!(first.path, "/simple");

    let paths: Vec<_> = report.issues.iter().map(|issue| issue.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/simple", "/complex/bool", "/complex/map/foo", "/extra"]
    );
}

#[test]
fn inputs_can_be_validated_directly() {
    let service = load_service("lamp.service.json");
    let msg = object(json!({"struct": {"hue": 120, "on": true, "time": "13:00:00 UTC"}}));

    assert!(
        validate_contents(
            &msg,
            service.contents(Direction::Inputs),
            ValidationOptions::strict()
        )
        .is_ok()
    );
}

fn indexed_list(indices: &[&str]) -> Service {
    let children = indices
        .iter()
        .map(|index| ContentVariable::new(*index, VariableType::String))
        .collect();
    Service::with_outputs(vec![
        ContentVariable::new("list", VariableType::List)
            .with_children(children)
            .expect("indexed children"),
    ])
}

#[test]
fn short_list_names_the_lowest_absent_index() {
    let service = indexed_list(&["1", "0", "2"]);
    let msg = object(json!({"list": ["a"]}));

    assert_eq!(
        validate(&msg, &service, ValidationOptions::strict()),
        Err(ValidationError::MissingField("1".to_string()))
    );
}

#[test]
fn out_of_order_children_match_by_index() {
    let service = indexed_list(&["2", "0", "1"]);
    let msg = object(json!({"list": ["a", "b", "c"]}));

    assert!(validate(&msg, &service, ValidationOptions::strict()).is_ok());
}

#[test]
fn element_in_an_index_gap_is_unexpected() {
    let service = indexed_list(&["0", "2"]);
    let msg = object(json!({"list": ["a", "b"]}));

    assert_eq!(
        validate(&msg, &service, ValidationOptions::strict()),
        Err(ValidationError::UnexpectedField("1".to_string()))
    );
    assert!(validate(&msg, &service, ValidationOptions::new(true, false)).is_err());
    assert!(validate(&msg, &service, ValidationOptions::lenient()).is_ok());
}
