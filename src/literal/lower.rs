use super::parser::{Entry, Literal};
use crate::error::LiteralError;
use ahash::AHashSet;
use itertools::Itertools;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Shape-agnostic value a literal lowers to before materialization.
///
/// Maps keep the literal's entry order; both record and map literals end up
/// here, keyed by field identifier or unquoted key respectively.
#[derive(Debug, Clone, PartialEq)]
pub enum Intermediate {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Char(char),
    Str(String),
    List(Vec<Intermediate>),
    Map(Vec<(String, Intermediate)>),
}

impl Intermediate {
    /// Kind name used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Intermediate::Null => "null",
            Intermediate::Bool(_) => "boolean",
            Intermediate::Int(_) => "integer",
            Intermediate::Float(_) => "float",
            Intermediate::Char(_) => "char",
            Intermediate::Str(_) => "string",
            Intermediate::List(_) => "list",
            Intermediate::Map(_) => "map",
        }
    }

    /// Untyped JSON rendering. Integers beyond 64 bits and non-finite floats
    /// have no exact JSON form and degrade to a float and `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Intermediate::Null => Value::Null,
            Intermediate::Bool(b) => Value::Bool(*b),
            Intermediate::Int(n) => int_to_json(*n),
            Intermediate::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Intermediate::Char(c) => Value::String(c.to_string()),
            Intermediate::Str(s) => Value::String(s.clone()),
            Intermediate::List(items) => Value::Array(items.iter().map(Intermediate::to_json).collect()),
            Intermediate::Map(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

pub(crate) fn int_to_json(n: i128) -> Value {
    if let Ok(signed) = i64::try_from(n) {
        Value::from(signed)
    } else if let Ok(unsigned) = u64::try_from(n) {
        Value::from(unsigned)
    } else {
        Number::from_f64(n as f64).map_or(Value::Null, Value::Number)
    }
}

impl fmt::Display for Intermediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intermediate::Null => write!(f, "null"),
            Intermediate::Bool(b) => write!(f, "{}", b),
            Intermediate::Int(n) => write!(f, "{}", n),
            Intermediate::Float(x) => write!(f, "{:?}", x),
            Intermediate::Char(c) => write!(f, "{:?}", c),
            Intermediate::Str(s) => write!(f, "{:?}", s),
            Intermediate::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Intermediate::Map(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!("{:?}: {}", key, value))
                    .join(", ")
            ),
        }
    }
}

/// Lowers a parsed literal. Fails on duplicate keys and on paths other than
/// the known constants.
pub fn lower(literal: &Literal) -> Result<Intermediate, LiteralError> {
    match literal {
        Literal::AddressOf(inner) => lower(inner),
        Literal::Str(s) => Ok(Intermediate::Str(s.clone())),
        Literal::Int(n) => Ok(Intermediate::Int(*n)),
        Literal::Float(x) => Ok(Intermediate::Float(*x)),
        Literal::Char(c) => Ok(Intermediate::Char(*c)),
        Literal::Path { name, line, column } => match name.as_str() {
            "true" => Ok(Intermediate::Bool(true)),
            "false" => Ok(Intermediate::Bool(false)),
            "null" | "None" => Ok(Intermediate::Null),
            _ => Err(LiteralError::UnresolvedReference {
                name: name.clone(),
                line: *line,
                column: *column,
            }),
        },
        Literal::Array { elements, .. } => elements
            .iter()
            .map(lower)
            .collect::<Result<Vec<_>, _>>()
            .map(Intermediate::List),
        Literal::Object { entries, .. } => lower_entries(entries),
    }
}

fn lower_entries(entries: &[Entry]) -> Result<Intermediate, LiteralError> {
    let mut seen: AHashSet<String> = AHashSet::with_capacity(entries.len());
    let mut lowered = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = entry.key.text();
        if !seen.insert(key.clone()) {
            return Err(LiteralError::syntax(
                entry.line,
                entry.column,
                format!("key `{}` appears more than once", key),
            ));
        }
        lowered.push((key, lower(&entry.value)?));
    }
    Ok(Intermediate::Map(lowered))
}
