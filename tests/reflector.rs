//! Tests for deriving type schemas from type shapes.
mod common;
use common::*;
use kairo::prelude::*;
use kairo::schema::JsonType;
use kairo::shape::IntKind;
use kairo::{reflect_interface, reflect_record};
use serde_json::json;

#[allow(dead_code)]
struct Pair {
    left: Query,
    right: Query,
    label: String,
}
reflect_record!(Pair { left: Query, right: Query, label: String });

#[allow(dead_code)]
struct Folder {
    name: String,
    readme: Option<Box<File>>,
}

#[allow(dead_code)]
struct File {
    size: u64,
    siblings: Vec<Folder>,
}
reflect_record!(Folder { name: String, readme: Option<Box<File>> });
reflect_record!(File { size: u64, siblings: Vec<Folder> });

#[allow(dead_code)]
struct Toolbox;
reflect_interface!(Toolbox);

/// A resource handle with no structural description.
struct Socket;

impl Reflect for Socket {
    fn shape() -> TypeShape {
        TypeShape::Unsupported("Socket")
    }
}

#[test]
fn test_reflects_two_scalar_fields_in_order() {
    let schema = TypeSchema::of(&TypeShape::of::<Query>());

    assert_eq!(schema.kind, JsonType::Object);
    assert_eq!(schema.title, "Query");
    assert_eq!(schema.properties.len(), 2);
    assert_eq!(schema.property_order, vec!["text", "top_k"]);
    assert_eq!(schema.properties["text"].kind, JsonType::String);
    assert_eq!(schema.properties["top_k"].kind, JsonType::Number);
    assert_eq!(schema.required, vec!["text", "top_k"]);

    let ordered: Vec<&str> = schema.ordered_properties().into_iter().map(|(k, _)| k).collect();
    assert_eq!(ordered, vec!["text", "top_k"]);
}

#[test]
fn test_field_descriptions_are_declared_names() {
    let schema = TypeSchema::of(&TypeShape::of::<ModelConfig>());

    let max_tokens = &schema.properties["maxTokens"];
    assert_eq!(max_tokens.description, "max_tokens");
    assert_eq!(max_tokens.field_name.as_deref(), Some("max_tokens"));
    assert_eq!(max_tokens.join_key(), Some("max_tokens"));

    let (key, found) = schema.property_by_join_key("max_tokens").unwrap();
    assert_eq!(key, "maxTokens");
    assert_eq!(found.title, "u16");
    assert!(schema.property_by_join_key("maxTokens").is_none());
}

#[test]
fn test_self_referential_record_terminates() {
    let schema = TypeSchema::of(&TypeShape::of::<TreeNode>());

    let children = &schema.properties["children"];
    assert_eq!(children.kind, JsonType::Array);
    let item = children.items.as_ref().unwrap();
    assert_eq!(item.kind, JsonType::Null);
    assert_eq!(item.title, "TreeNode");
    assert!(item.properties.is_empty());

    let parent = &schema.properties["parent"];
    assert_eq!(parent.kind, JsonType::Null);
    assert_eq!(parent.title, "**TreeNode");
    assert_eq!(schema.required, vec!["value", "children"]);

    // Finite, so it serializes.
    assert!(serde_json::to_string(&schema).is_ok());
}

#[test]
fn test_mutual_recursion_breaks_at_ancestor() {
    let schema = TypeSchema::of(&TypeShape::of::<Folder>());

    let readme = &schema.properties["readme"];
    assert_eq!(readme.kind, JsonType::Object);
    assert_eq!(readme.title, "**File");

    let siblings = &readme.properties["siblings"];
    let placeholder = siblings.items.as_ref().unwrap();
    assert_eq!(placeholder.kind, JsonType::Null);
    assert_eq!(placeholder.title, "Folder");
}

#[test]
fn test_sibling_fields_of_same_type_are_expanded() {
    let schema = TypeSchema::of(&TypeShape::of::<Pair>());

    let left = &schema.properties["left"];
    let right = &schema.properties["right"];
    assert_eq!(left.kind, JsonType::Object);
    assert_eq!(right.kind, JsonType::Object);
    assert_eq!(left.properties, right.properties);
    assert_eq!(left.description, "left");
    assert_eq!(right.description, "right");
}

#[test]
fn test_reflects_collections_and_indirection() {
    let schema = TypeSchema::of(&TypeShape::of::<Person>());

    let email = &schema.properties["email"];
    assert_eq!(email.kind, JsonType::String);
    assert_eq!(email.title, "*String");
    assert!(!schema.is_required("email"));

    let scores = &schema.properties["scores"];
    assert_eq!(scores.kind, JsonType::Object);
    assert_eq!(scores.title, "Map<String, f64>");
    assert_eq!(scores.additional_properties.as_ref().unwrap().kind, JsonType::Number);

    let friends = &schema.properties["friends"];
    assert_eq!(friends.title, "Vec<Person>");
    assert_eq!(friends.items.as_ref().unwrap().kind, JsonType::Null);
}

#[test]
fn test_reflects_interfaces_and_unknown_shapes() {
    let config = TypeSchema::of(&TypeShape::of::<ModelConfig>());
    assert_eq!(config.properties["extra"].kind, JsonType::Interface);
    assert_eq!(config.properties["stop"].title, "[char; 2]");
    assert_eq!(
        config.properties["stop"].items.as_ref().unwrap().kind,
        JsonType::String
    );

    let fallback = &config.properties["fallback"];
    assert_eq!(fallback.title, "**Query");
    assert_eq!(fallback.properties.len(), 2);

    assert_eq!(TypeSchema::of(&TypeShape::of::<Toolbox>()).kind, JsonType::Interface);
    assert_eq!(TypeSchema::of(&TypeShape::of::<Socket>()).kind, JsonType::Null);
    assert_eq!(TypeSchema::of(&TypeShape::of::<bool>()).kind, JsonType::Boolean);
    assert_eq!(TypeSchema::of(&TypeShape::Int(IntKind::I8)).title, "i8");
}

#[test]
fn test_schema_json_layout() {
    let schema = TypeSchema::of(&TypeShape::of::<Query>());
    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "type": "object",
            "title": "Query",
            "properties": {
                "text": { "type": "string", "title": "String", "description": "text", "fieldName": "text" },
                "top_k": { "type": "number", "title": "u32", "description": "top_k", "fieldName": "top_k" }
            },
            "propertyOrder": ["text", "top_k"],
            "required": ["text", "top_k"]
        })
    );
}

#[test]
fn test_join_key_falls_back_to_description() {
    let document = json!({
        "type": "object",
        "title": "Query",
        "properties": {
            "text": { "type": "string", "description": "text" },
            "top_k": { "type": "number", "description": "top_k" }
        }
    });
    let schema: TypeSchema = serde_json::from_value(document).unwrap();
    let (key, _) = schema.property_by_join_key("top_k").unwrap();
    assert_eq!(key, "top_k");
    assert_eq!(schema.properties["text"].join_key(), Some("text"));
}

#[test]
fn test_reflection_is_deterministic() {
    let shape = TypeShape::of::<Person>();
    assert_eq!(TypeSchema::of(&shape), TypeSchema::of(&shape));
}

#[test]
fn test_record_shapes_compare_by_type() {
    let TypeShape::Record(query) = TypeShape::of::<Query>() else {
        panic!("Query must reflect to a record");
    };
    let TypeShape::Record(again) = TypeShape::of::<Query>() else {
        panic!("Query must reflect to a record");
    };
    let TypeShape::Record(pair) = TypeShape::of::<Pair>() else {
        panic!("Pair must reflect to a record");
    };
    assert_eq!(query, again);
    assert_ne!(query, pair);
    let names: Vec<&str> = pair.fields().iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["left", "right", "label"]);
}

#[test]
fn test_display_schema_tree() {
    let schema = TypeSchema::of(&TypeShape::of::<Query>());
    let rendered = DisplaySchema { schema: &schema }.to_string();
    assert_eq!(
        rendered,
        "└── object Query\n    ├── text: string String (required)\n    └── top_k: number u32 (required)\n"
    );
}
