//! Tests for converting literal snippets into typed values.
mod common;
use common::*;
use kairo::literal::Intermediate;
use kairo::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn mismatch_path(error: &LiteralError) -> &str {
    match error {
        LiteralError::Mismatch { path, .. }
        | LiteralError::OutOfRange { path, .. }
        | LiteralError::LengthMismatch { path, .. }
        | LiteralError::MissingField { path, .. }
        | LiteralError::UnknownField { path, .. }
        | LiteralError::NotAssignable { path, .. }
        | LiteralError::Unsupported { path, .. } => path,
        other => panic!("expected a materialization error, got {:?}", other),
    }
}

#[test]
fn test_converts_simple_record() {
    let query: Query = code_to_value(r#"{ text: "a", top_k: 3 }"#).unwrap();
    assert_eq!(
        query,
        Query {
            text: "a".to_string(),
            top_k: 3
        }
    );
}

#[test]
fn test_converts_declaration_form() {
    let query: Query = code_to_value(
        r#"
        // input for the retriever
        let input: Query = &Query {
            text: "rust ownership", /* trailing */
            top_k: 10,
        };
        "#,
    )
    .unwrap();
    assert_eq!(query.text, "rust ownership");
    assert_eq!(query.top_k, 10);
}

#[test]
fn test_text_into_numeric_field_is_a_mismatch() {
    let error = code_to_value::<Query>(r#"{ text: "a", top_k: "three" }"#).unwrap_err();
    assert_eq!(
        error,
        LiteralError::Mismatch {
            path: "$.top_k".to_string(),
            expected: "u32".to_string(),
            found: "string".to_string(),
        }
    );
    assert!(!error.is_syntax());
}

#[test]
fn test_call_expression_is_a_syntax_error() {
    let error = code_to_value::<Query>("make_query(\"a\", 3)").unwrap_err();
    assert!(error.is_syntax());
    assert!(matches!(error, LiteralError::Syntax { line: 1, column: 11, .. }));
}

#[test]
fn test_syntax_errors_win_over_shape_errors() {
    // Both malformed and ill-typed: the syntax error is reported.
    let error = code_to_value::<Query>(r#"{ text: 1, top_k: "x" "#).unwrap_err();
    assert!(error.is_syntax());

    let error = code_to_value::<Query>(r#"{ text: SOME_CONSTANT, top_k: "x" }"#).unwrap_err();
    assert!(matches!(error, LiteralError::UnresolvedReference { ref name, .. } if name == "SOME_CONSTANT"));
}

#[test]
fn test_converts_nested_collections() {
    let person: Person = code_to_value(
        r#"Person {
            name: "ada",
            age: 36,
            email: "ada@example.com",
            friends: vec![
                Person { name: "bob", age: 40, friends: [], scores: {} },
            ],
            scores: { "math": 9.5, "chess": 7 },
        }"#,
    )
    .unwrap();

    assert_eq!(person.email.as_deref(), Some("ada@example.com"));
    assert_eq!(person.friends.len(), 1);
    assert_eq!(person.friends[0].name, "bob");
    assert_eq!(person.friends[0].email, None);
    assert_eq!(person.scores["math"], 9.5);
    // Integers widen into float destinations.
    assert_eq!(person.scores["chess"], 7.0);
}

#[test]
fn test_error_paths_name_nested_fields() {
    let error = code_to_value::<Person>(
        r#"{
            name: "ada", age: 36, scores: {},
            friends: [
                { name: "bob", age: 40, friends: [], scores: {} },
                { name: "eve", age: -1, friends: [], scores: {} },
            ],
        }"#,
    )
    .unwrap_err();
    assert_eq!(
        error,
        LiteralError::OutOfRange {
            path: "$.friends[1].age".to_string(),
            expected: "u32".to_string(),
            value: "-1".to_string(),
        }
    );

    let error = code_to_value::<Person>(
        r#"{ name: "ada", age: 36, friends: [], scores: { "go": true } }"#,
    )
    .unwrap_err();
    assert_eq!(mismatch_path(&error), "$.scores[\"go\"]");
}

#[test]
fn test_floats_never_narrow() {
    let error = code_to_value::<Query>(r#"{ text: "a", top_k: 2.0 }"#).unwrap_err();
    assert!(matches!(error, LiteralError::Mismatch { ref found, .. } if found == "float"));
}

#[test]
fn test_missing_and_unknown_fields() {
    let error = code_to_value::<Query>(r#"{ text: "a" }"#).unwrap_err();
    assert_eq!(
        error,
        LiteralError::MissingField {
            path: "$".to_string(),
            field: "top_k".to_string(),
        }
    );

    let error = code_to_value::<Query>(r#"{ text: "a", top_k: 1, rerank: true }"#).unwrap_err();
    assert_eq!(
        error,
        LiteralError::UnknownField {
            path: "$".to_string(),
            field: "rerank".to_string(),
        }
    );

    let lenient = LiteralConverter::builder().ignore_unknown_fields(true).build();
    let query: Query = lenient
        .convert(r#"{ text: "a", top_k: 1, rerank: true }"#)
        .unwrap();
    assert_eq!(query.top_k, 1);
}

#[test]
fn test_fields_are_addressed_by_declared_name() {
    let config: ModelConfig = code_to_value(
        r##"ModelConfig {
            model: "small",
            max_tokens: 256,
            temperature: 0.5,
            stop: ['\n', "#"],
            weights: { 1: 0.25, 2: 0.75 },
            extra: { "seed": 7, "tags": ["a", null] },
            fallback: &Query { text: "retry", top_k: 1 },
        }"##,
    )
    .unwrap();

    assert_eq!(config.max_tokens, 256);
    assert_eq!(config.temperature, 0.5);
    assert_eq!(config.stop, ['\n', '#']);
    assert_eq!(config.weights[&2], 0.75);
    assert_eq!(config.extra, json!({ "seed": 7, "tags": ["a", null] }));
    assert_eq!(config.fallback.as_deref().map(|q| q.text.as_str()), Some("retry"));

    // The serialized key is not a literal field name.
    let error = code_to_value::<ModelConfig>(r#"{ maxTokens: 1 }"#).unwrap_err();
    assert!(matches!(error, LiteralError::UnknownField { ref field, .. } if field == "maxTokens"));
}

#[test]
fn test_value_checks_against_shape() {
    let base = r#"model: "m", max_tokens: 1, temperature: 1, weights: {}, extra: null, fallback: None"#;

    let error = code_to_value::<ModelConfig>(&format!("{{ {}, stop: ['a'] }}", base)).unwrap_err();
    assert_eq!(
        error,
        LiteralError::LengthMismatch {
            path: "$.stop".to_string(),
            expected: 2,
            found: 1,
        }
    );

    let error = code_to_value::<ModelConfig>(&format!("{{ {}, stop: ['a', \"bc\"] }}", base)).unwrap_err();
    assert_eq!(mismatch_path(&error), "$.stop[1]");

    let error = code_to_value::<ModelConfig>(
        r#"{ model: "m", max_tokens: 70000, temperature: 1, stop: ['a', 'b'], weights: {}, extra: 1 }"#,
    )
    .unwrap_err();
    assert!(matches!(error, LiteralError::OutOfRange { ref expected, .. } if expected == "u16"));

    let error = code_to_value::<ModelConfig>(
        r#"{ model: "m", max_tokens: 1, temperature: 1e300, stop: ['a', 'b'], weights: {}, extra: 1 }"#,
    )
    .unwrap_err();
    assert!(matches!(error, LiteralError::OutOfRange { ref expected, .. } if expected == "f32"));

    let error = code_to_value::<ModelConfig>(
        r#"{ model: "m", max_tokens: 1, temperature: 1, stop: ['a', 'b'], weights: { "one": 1 }, extra: 1 }"#,
    )
    .unwrap_err();
    assert_eq!(mismatch_path(&error), "$.weights[\"one\"]");

    let config: ModelConfig = code_to_value(&format!("{{ {}, stop: ['a', 'b'] }}", base)).unwrap();
    assert_eq!(config.extra, serde_json::Value::Null);
    assert!(config.fallback.is_none());
}

#[test]
fn test_null_only_fills_optional_shapes() {
    let error = code_to_value::<Query>(r#"{ text: null, top_k: 1 }"#).unwrap_err();
    assert_eq!(mismatch_path(&error), "$.text");

    let error = code_to_value::<Box<Query>>("None").unwrap_err();
    assert!(matches!(error, LiteralError::Mismatch { ref expected, .. } if expected == "Box<Query>"));

    let nothing: Option<Query> = code_to_value("null").unwrap();
    assert!(nothing.is_none());
    let shared: Arc<Query> = code_to_value(r#"{ text: "x", top_k: 0 }"#).unwrap();
    assert_eq!(shared.text, "x");
}

#[test]
fn test_recursive_destination() {
    let tree: TreeNode = code_to_value(
        r#"TreeNode {
            value: 1,
            children: [
                { value: 2, children: [ { value: 3, children: [] } ] },
            ],
            parent: { value: 0, children: [] },
        }"#,
    )
    .unwrap();

    assert_eq!(tree.children[0].children[0].value, 3);
    assert_eq!(tree.parent.as_ref().map(|p| p.value), Some(0));
}

#[test]
fn test_closed_interfaces_and_unsupported_shapes() {
    struct Handle;
    impl Reflect for Handle {
        fn shape() -> TypeShape {
            TypeShape::Unsupported("Handle")
        }
    }
    struct Plugin;
    kairo::reflect_interface!(Plugin);

    let converter = LiteralConverter::new();
    let error = converter
        .materialize("1", &TypeSchema::of(&Handle::shape()), &Handle::shape())
        .unwrap_err();
    assert_eq!(
        error,
        LiteralError::Unsupported {
            path: "$".to_string(),
            type_name: "Handle".to_string(),
        }
    );

    let error = converter
        .materialize("{}", &TypeSchema::of(&Plugin::shape()), &Plugin::shape())
        .unwrap_err();
    assert!(matches!(error, LiteralError::NotAssignable { ref found, .. } if found == "map"));
}

#[test]
fn test_scalar_and_map_destinations() {
    let tags: Vec<String> = code_to_value(r#"["a", 'b', r"c\d"]"#).unwrap();
    assert_eq!(tags, vec!["a", "b", "c\\d"]);

    let counts: HashMap<String, i64> = code_to_value(r#"{ "a": -1, "b": 0x10 }"#).unwrap();
    assert_eq!(counts["a"], -1);
    assert_eq!(counts["b"], 16);

    let flag: bool = code_to_value("true").unwrap();
    assert!(flag);

    let error = code_to_value::<HashMap<String, i64>>("[1]").unwrap_err();
    assert!(matches!(error, LiteralError::Mismatch { ref found, .. } if found == "list"));
}

#[test]
fn test_convert_with_caller_schema() {
    // A schema that predates `fieldName` joins on the description.
    let schema: TypeSchema = serde_json::from_value(json!({
        "type": "object",
        "title": "Query",
        "properties": {
            "text": { "type": "string", "description": "text" },
            "top_k": { "type": "number", "description": "top_k" }
        }
    }))
    .unwrap();

    let query: Query = LiteralConverter::new()
        .convert_with_schema(r#"{ text: "q", top_k: 2 }"#, &schema)
        .unwrap();
    assert_eq!(query.top_k, 2);
}

#[test]
fn test_lower_and_parse() {
    let converter = LiteralConverter::new();
    assert_eq!(
        converter.lower(r#"&Thing { id: 1, tags: ["x"], ok: false }"#).unwrap(),
        json!({ "id": 1, "tags": ["x"], "ok": false })
    );
    assert_eq!(
        converter.intermediate("[1, 2.5]").unwrap(),
        Intermediate::List(vec![Intermediate::Int(1), Intermediate::Float(2.5)])
    );
    assert!(converter.parse("{ a: [1, 2], b: { c: 'x' } }").is_ok());
}

#[test]
fn test_max_depth_is_configurable() {
    let shallow = LiteralConverter::builder().max_depth(2).build();
    assert!(shallow.lower("[[1]]").is_ok());
    let error = shallow.lower("[[[1]]]").unwrap_err();
    assert!(error.is_syntax());
}

#[test]
fn test_map_keys_with_same_canonical_form_are_rejected() {
    let error = code_to_value::<HashMap<u8, f64>>(r#"{ "1": 1.0, "01": 2.0 }"#).unwrap_err();
    assert_eq!(
        error,
        LiteralError::DuplicateKey {
            path: "$".to_string(),
            key: "1".to_string(),
        }
    );
    assert!(!error.is_syntax());

    let distinct: Person = code_to_value(
        r#"{ name: "a", age: 1, friends: [], scores: { "x": 1, "y": 2 } }"#,
    )
    .unwrap();
    assert_eq!(distinct.scores.len(), 2);
}

#[test]
fn test_open_interface_rejects_numbers_json_cannot_hold() {
    let value: serde_json::Value = code_to_value("[-1, 18446744073709551615]").unwrap();
    assert_eq!(value, json!([-1, u64::MAX]));

    let error = code_to_value::<serde_json::Value>("{ \"big\": [1, 18446744073709551616] }").unwrap_err();
    assert_eq!(
        error,
        LiteralError::OutOfRange {
            path: "$[\"big\"][1]".to_string(),
            expected: "Value".to_string(),
            value: "18446744073709551616".to_string(),
        }
    );

    let error = code_to_value::<serde_json::Value>("1e400").unwrap_err();
    assert!(matches!(error, LiteralError::OutOfRange { ref path, .. } if path == "$"));
}
