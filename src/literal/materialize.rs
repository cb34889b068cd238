use super::lower::{int_to_json, Intermediate};
use crate::error::LiteralError;
use crate::schema::{JsonType, SchemaReflector, TypeSchema};
use crate::shape::{FloatKind, Indirection, IntKind, RecordShape, TypeShape};
use ahash::AHashSet;
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

/// Location of the value being materialized, rendered as `$.team[2]["k"]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FieldPath(Vec<Segment>);

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
                Segment::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

/// Checks an intermediate value against a destination shape and builds the
/// JSON document the destination is then deserialized from.
///
/// The shape decides what a value must look like; the schema only decides
/// which record field a literal key addresses. Where the schema holds a
/// cycle placeholder (or nothing usable) the shape is re-reflected on the
/// spot.
pub struct Materializer {
    ignore_unknown_fields: bool,
    path: FieldPath,
}

impl Materializer {
    pub fn new(ignore_unknown_fields: bool) -> Self {
        Self {
            ignore_unknown_fields,
            path: FieldPath::default(),
        }
    }

    pub fn materialize(
        &mut self,
        value: &Intermediate,
        shape: &TypeShape,
        schema: &TypeSchema,
    ) -> Result<Value, LiteralError> {
        self.path = FieldPath::default();
        self.visit(value, shape, schema)
    }

    fn at(&self) -> String {
        self.path.to_string()
    }

    fn mismatch(&self, shape: &TypeShape, value: &Intermediate) -> LiteralError {
        LiteralError::Mismatch {
            path: self.at(),
            expected: shape.type_name(),
            found: value.kind_name().to_string(),
        }
    }

    fn nested<T>(
        &mut self,
        segment: Segment,
        step: impl FnOnce(&mut Self) -> Result<T, LiteralError>,
    ) -> Result<T, LiteralError> {
        self.path.0.push(segment);
        let result = step(self);
        self.path.0.pop();
        result
    }

    fn visit(
        &mut self,
        value: &Intermediate,
        shape: &TypeShape,
        schema: &TypeSchema,
    ) -> Result<Value, LiteralError> {
        match shape {
            TypeShape::Indirect(Indirection::Optional, inner) => match value {
                Intermediate::Null => Ok(Value::Null),
                _ => self.visit(value, inner, schema),
            },
            TypeShape::Indirect(_, inner) => match value {
                Intermediate::Null => Err(self.mismatch(shape, value)),
                _ => self.visit(value, inner, schema),
            },
            TypeShape::Record(record) => self.record(value, shape, record, schema),
            TypeShape::Map { key, value: value_shape } => {
                self.map(value, shape, key, value_shape, schema)
            }
            TypeShape::Sequence { element, len } => self.sequence(value, shape, element, *len, schema),
            TypeShape::Bool => match value {
                Intermediate::Bool(b) => Ok(Value::Bool(*b)),
                _ => Err(self.mismatch(shape, value)),
            },
            TypeShape::String => match value {
                Intermediate::Str(s) => Ok(Value::String(s.clone())),
                Intermediate::Char(c) => Ok(Value::String(c.to_string())),
                _ => Err(self.mismatch(shape, value)),
            },
            TypeShape::Char => match value {
                Intermediate::Char(c) => Ok(Value::String(c.to_string())),
                Intermediate::Str(s) if s.chars().count() == 1 => Ok(Value::String(s.clone())),
                _ => Err(self.mismatch(shape, value)),
            },
            TypeShape::Int(kind) => match value {
                Intermediate::Int(n) => self.int(*n, *kind),
                _ => Err(self.mismatch(shape, value)),
            },
            TypeShape::Float(kind) => match value {
                Intermediate::Int(n) => self.float(*n as f64, *kind),
                Intermediate::Float(x) => self.float(*x, *kind),
                _ => Err(self.mismatch(shape, value)),
            },
            TypeShape::Interface(interface) => {
                if interface.open {
                    self.open(value, interface.name)
                } else {
                    Err(LiteralError::NotAssignable {
                        path: self.at(),
                        interface: interface.name.to_string(),
                        found: value.kind_name().to_string(),
                    })
                }
            }
            TypeShape::Unsupported(name) => Err(LiteralError::Unsupported {
                path: self.at(),
                type_name: name.to_string(),
            }),
        }
    }

    fn int(&self, n: i128, kind: IntKind) -> Result<Value, LiteralError> {
        if !kind.contains(n) {
            return Err(LiteralError::OutOfRange {
                path: self.at(),
                expected: kind.name().to_string(),
                value: n.to_string(),
            });
        }
        Ok(int_to_json(n))
    }

    /// Renders a value for an open interface. JSON numbers hold at most 64
    /// bits, so wider integers and non-finite floats are rejected.
    fn open(&mut self, value: &Intermediate, interface: &str) -> Result<Value, LiteralError> {
        let out_of_range = |this: &Self, value: String| LiteralError::OutOfRange {
            path: this.at(),
            expected: interface.to_string(),
            value,
        };
        match value {
            Intermediate::Int(n) => i64::try_from(*n)
                .map(Value::from)
                .or_else(|_| u64::try_from(*n).map(Value::from))
                .map_err(|_| out_of_range(self, n.to_string())),
            Intermediate::Float(x) => Number::from_f64(*x)
                .map(Value::Number)
                .ok_or_else(|| out_of_range(self, x.to_string())),
            Intermediate::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(self.nested(Segment::Index(index), |this| this.open(item, interface))?);
                }
                Ok(Value::Array(out))
            }
            Intermediate::Map(entries) => {
                let mut out = Map::new();
                for (key, entry) in entries {
                    let materialized =
                        self.nested(Segment::Key(key.clone()), |this| this.open(entry, interface))?;
                    out.insert(key.clone(), materialized);
                }
                Ok(Value::Object(out))
            }
            scalar => Ok(scalar.to_json()),
        }
    }

    fn float(&self, x: f64, kind: FloatKind) -> Result<Value, LiteralError> {
        let fits = match kind {
            FloatKind::F32 => x.is_finite() && x.abs() <= f32::MAX as f64,
            FloatKind::F64 => x.is_finite(),
        };
        match Number::from_f64(x) {
            Some(number) if fits => Ok(Value::Number(number)),
            _ => Err(LiteralError::OutOfRange {
                path: self.at(),
                expected: kind.name().to_string(),
                value: x.to_string(),
            }),
        }
    }

    fn sequence(
        &mut self,
        value: &Intermediate,
        shape: &TypeShape,
        element: &TypeShape,
        len: Option<usize>,
        schema: &TypeSchema,
    ) -> Result<Value, LiteralError> {
        let Intermediate::List(items) = value else {
            return Err(self.mismatch(shape, value));
        };
        if let Some(expected) = len {
            if items.len() != expected {
                return Err(LiteralError::LengthMismatch {
                    path: self.at(),
                    expected,
                    found: items.len(),
                });
            }
        }

        let items_schema = match &schema.items {
            Some(items_schema) => Cow::Borrowed(items_schema.as_ref()),
            None => Cow::Owned(SchemaReflector::reflect(element)),
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let materialized =
                self.nested(Segment::Index(index), |this| this.visit(item, element, &items_schema))?;
            out.push(materialized);
        }
        Ok(Value::Array(out))
    }

    fn map(
        &mut self,
        value: &Intermediate,
        shape: &TypeShape,
        key_shape: &TypeShape,
        value_shape: &TypeShape,
        schema: &TypeSchema,
    ) -> Result<Value, LiteralError> {
        let Intermediate::Map(entries) = value else {
            return Err(self.mismatch(shape, value));
        };

        let value_schema = match &schema.additional_properties {
            Some(value_schema) => Cow::Borrowed(value_schema.as_ref()),
            None => Cow::Owned(SchemaReflector::reflect(value_shape)),
        };
        let mut out = Map::new();
        for (key, entry) in entries {
            let (key, materialized) = self.nested(Segment::Key(key.clone()), |this| {
                let key = this.map_key(key, key_shape)?;
                let materialized = this.visit(entry, value_shape, &value_schema)?;
                Ok((key, materialized))
            })?;
            // Distinct literal keys may share a canonical form (`"1"`, `"01"`).
            if out.contains_key(&key) {
                return Err(LiteralError::DuplicateKey {
                    path: self.at(),
                    key,
                });
            }
            out.insert(key, materialized);
        }
        Ok(Value::Object(out))
    }

    /// Validates a map key against the key shape and returns its canonical text.
    fn map_key(&self, key: &str, key_shape: &TypeShape) -> Result<String, LiteralError> {
        let found = Intermediate::Str(key.to_string());
        match key_shape {
            TypeShape::String => Ok(key.to_string()),
            TypeShape::Char if key.chars().count() == 1 => Ok(key.to_string()),
            TypeShape::Char => Err(self.mismatch(key_shape, &found)),
            TypeShape::Int(kind) => {
                let n: i128 = key.parse().map_err(|_| self.mismatch(key_shape, &found))?;
                self.int(n, *kind)?;
                Ok(n.to_string())
            }
            other => Err(LiteralError::Unsupported {
                path: self.at(),
                type_name: format!("map key {}", other.type_name()),
            }),
        }
    }

    fn record(
        &mut self,
        value: &Intermediate,
        shape: &TypeShape,
        record: &RecordShape,
        schema: &TypeSchema,
    ) -> Result<Value, LiteralError> {
        let Intermediate::Map(entries) = value else {
            return Err(self.mismatch(shape, value));
        };

        let schema = if schema.kind == JsonType::Object {
            Cow::Borrowed(schema)
        } else {
            trace!(record = record.name(), path = %self.path, "re-reflecting record schema");
            Cow::Owned(SchemaReflector::reflect(shape))
        };
        let fields = record.fields();
        let mut provided: AHashSet<&'static str> = AHashSet::new();
        let mut out = Map::new();

        for (name, entry) in entries {
            let target = schema
                .property_by_join_key(name)
                .and_then(|(key, property)| {
                    fields
                        .iter()
                        .find(|field| field.key == key)
                        .map(|field| (field, property))
                });
            let Some((field, property)) = target else {
                if self.ignore_unknown_fields {
                    trace!(field = name.as_str(), path = %self.path, "ignoring unknown field");
                    continue;
                }
                return Err(LiteralError::UnknownField {
                    path: self.at(),
                    field: name.clone(),
                });
            };

            let field_shape = field.shape();
            let materialized = self.nested(Segment::Field(field.name.to_string()), |this| {
                this.visit(entry, &field_shape, property)
            })?;
            provided.insert(field.key);
            out.insert(field.key.to_string(), materialized);
        }

        for field in &fields {
            if provided.contains(field.key) {
                continue;
            }
            if field.required() {
                return Err(LiteralError::MissingField {
                    path: self.at(),
                    field: field.name.to_string(),
                });
            }
            out.insert(field.key.to_string(), Value::Null);
        }
        Ok(Value::Object(out))
    }
}
