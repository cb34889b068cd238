use super::{JsonType, TypeSchema};
use crate::shape::{FieldShape, RecordShape, TypeShape};
use std::any::TypeId;
use std::collections::HashSet;

const INDIRECTION_MARKER: &str = "*";

/// Derives a [`TypeSchema`] tree from a [`TypeShape`].
///
/// Never fails: shapes it cannot describe become `null` nodes. Recursion
/// through records is guarded by an explicit set of the records currently
/// being expanded, so self-referential shapes end in a `null` placeholder at
/// the point where they would re-enter an ancestor.
pub struct SchemaReflector {
    ancestors: HashSet<TypeId>,
}

impl SchemaReflector {
    /// Reflects `shape` with a fresh ancestor set.
    pub fn reflect(shape: &TypeShape) -> TypeSchema {
        let mut reflector = Self {
            ancestors: HashSet::new(),
        };
        reflector.visit(shape, "")
    }

    fn visit(&mut self, shape: &TypeShape, marker: &str) -> TypeSchema {
        let title = || format!("{}{}", marker, shape.type_name());
        match shape {
            TypeShape::Indirect(_, inner) => {
                let marker = format!("{}{}", marker, INDIRECTION_MARKER);
                self.visit(inner, &marker)
            }
            TypeShape::Record(record) => self.visit_record(record, marker),
            TypeShape::Map { value, .. } => {
                let mut schema = TypeSchema::new(JsonType::Object, title());
                schema.additional_properties = Some(Box::new(self.visit(value, "")));
                schema
            }
            TypeShape::Sequence { element, .. } => {
                let mut schema = TypeSchema::new(JsonType::Array, title());
                schema.items = Some(Box::new(self.visit(element, "")));
                schema
            }
            TypeShape::Bool => TypeSchema::new(JsonType::Boolean, title()),
            TypeShape::String | TypeShape::Char => TypeSchema::new(JsonType::String, title()),
            TypeShape::Int(_) | TypeShape::Float(_) => TypeSchema::new(JsonType::Number, title()),
            TypeShape::Interface(_) => TypeSchema::new(JsonType::Interface, title()),
            TypeShape::Unsupported(_) => TypeSchema::new(JsonType::Null, title()),
        }
    }

    fn visit_record(&mut self, record: &RecordShape, marker: &str) -> TypeSchema {
        let title = format!("{}{}", marker, record.name());
        if !self.ancestors.insert(record.type_id()) {
            return TypeSchema::new(JsonType::Null, title);
        }

        let mut schema = TypeSchema::new(JsonType::Object, title);
        // Sibling fields of the same type share one reflected schema.
        let mut seen: Vec<(TypeShape, TypeSchema)> = Vec::new();

        for field in record.fields() {
            let field_shape = field.shape();
            let reflected = match seen.iter().find(|(shape, _)| *shape == field_shape) {
                Some((_, cached)) => cached.clone(),
                None => {
                    let fresh = self.visit(&field_shape, "");
                    seen.push((field_shape.clone(), fresh.clone()));
                    fresh
                }
            };
            Self::attach_field(&mut schema, &field, reflected, field_shape.is_optional());
        }

        self.ancestors.remove(&record.type_id());
        schema
    }

    fn attach_field(schema: &mut TypeSchema, field: &FieldShape, mut reflected: TypeSchema, optional: bool) {
        reflected.description = field.name.to_string();
        reflected.field_name = Some(field.name.to_string());
        if !optional {
            schema.required.push(field.key.to_string());
        }
        schema.property_order.push(field.key.to_string());
        schema.properties.insert(field.key.to_string(), reflected);
    }
}
