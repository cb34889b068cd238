//! Structural, JSON-schema-like descriptions of type shapes.
//!
//! The serialized field names of [`TypeSchema`] are consumed by the visual
//! editor and must not change.

pub mod display;
pub mod reflector;

pub use display::DisplaySchema;
pub use reflector::SchemaReflector;

use crate::shape::TypeShape;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The `type` tag of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    #[default]
    Null,
    Boolean,
    String,
    Number,
    Object,
    Array,
    Interface,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Human-facing label. For record properties this is the declared field name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Machine join key for record properties: the identifier a literal uses
    /// to address this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeSchema>>,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub properties: AHashMap<String, TypeSchema>,
    /// Property keys in declaration order; `properties` itself is unordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<TypeSchema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
}

fn is_empty_map(map: &AHashMap<String, TypeSchema>) -> bool {
    map.is_empty()
}

impl TypeSchema {
    pub fn new(kind: JsonType, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Reflects the schema of `shape`. Shorthand for [`SchemaReflector::reflect`].
    pub fn of(shape: &TypeShape) -> Self {
        SchemaReflector::reflect(shape)
    }

    /// The key a literal must use to address this property.
    ///
    /// Prefers the explicit `fieldName`; schemas that predate it fall back to
    /// the description.
    pub fn join_key(&self) -> Option<&str> {
        match &self.field_name {
            Some(name) => Some(name.as_str()),
            None if !self.description.is_empty() => Some(self.description.as_str()),
            None => None,
        }
    }

    /// Properties in declaration order. Keys missing from `property_order`
    /// are yielded last, sorted.
    pub fn ordered_properties(&self) -> Vec<(&str, &TypeSchema)> {
        let mut ordered: Vec<(&str, &TypeSchema)> = self
            .property_order
            .iter()
            .filter_map(|key| self.properties.get(key).map(|s| (key.as_str(), s)))
            .collect();
        let mut rest: Vec<(&str, &TypeSchema)> = self
            .properties
            .iter()
            .filter(|(key, _)| !self.property_order.contains(key))
            .map(|(key, s)| (key.as_str(), s))
            .collect();
        rest.sort_by_key(|(key, _)| *key);
        ordered.extend(rest);
        ordered
    }

    /// Finds the property whose join key is `name`, returning its serialized key.
    pub fn property_by_join_key(&self, name: &str) -> Option<(&str, &TypeSchema)> {
        self.properties
            .iter()
            .find(|(_, schema)| schema.join_key() == Some(name))
            .map(|(key, schema)| (key.as_str(), schema))
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }
}
