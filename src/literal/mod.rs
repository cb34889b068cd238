//! Turns hand-written literal snippets into typed values.
//!
//! Conversion runs in three steps: the snippet is parsed with a grammar
//! that only knows literals ([`parse`](LiteralConverter::parse)), lowered to
//! a shape-agnostic [`Intermediate`] value ([`lower`](LiteralConverter::lower)),
//! and finally checked against the destination shape while the JSON document
//! the destination is deserialized from is built. Nothing is ever evaluated.
//!
//! ```
//! use kairo::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Query {
//!     text: String,
//!     top_k: u32,
//! }
//! kairo::reflect_record!(Query { text: String, top_k: u32 });
//!
//! let query: Query = LiteralConverter::new()
//!     .convert(r#"Query { text: "rust", top_k: 3 }"#)
//!     .unwrap();
//! assert_eq!(query, Query { text: "rust".into(), top_k: 3 });
//! ```

mod lexer;
mod lower;
mod materialize;
mod parser;

pub use lower::Intermediate;
pub use materialize::Materializer;
pub use parser::{Entry, EntryKey, Literal};

use crate::error::LiteralError;
use crate::schema::{SchemaReflector, TypeSchema};
use crate::shape::{Reflect, TypeShape};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 64;

pub struct LiteralConverter {
    max_depth: usize,
    ignore_unknown_fields: bool,
}

pub struct LiteralConverterBuilder {
    max_depth: usize,
    ignore_unknown_fields: bool,
}

impl LiteralConverterBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ignore_unknown_fields: false,
        }
    }

    /// Deepest nesting the parser accepts before reporting a syntax error.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Skip record fields the destination does not declare instead of failing.
    pub fn ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }

    pub fn build(self) -> LiteralConverter {
        LiteralConverter {
            max_depth: self.max_depth,
            ignore_unknown_fields: self.ignore_unknown_fields,
        }
    }
}

impl Default for LiteralConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralConverter {
    pub fn new() -> Self {
        LiteralConverterBuilder::new().build()
    }

    pub fn builder() -> LiteralConverterBuilder {
        LiteralConverterBuilder::new()
    }

    /// Parses `code` without lowering it.
    pub fn parse(&self, code: &str) -> Result<Literal, LiteralError> {
        parser::parse_snippet(code, self.max_depth)
    }

    /// Parses and lowers `code`, rendering the intermediate value as JSON.
    pub fn lower(&self, code: &str) -> Result<serde_json::Value, LiteralError> {
        Ok(self.intermediate(code)?.to_json())
    }

    /// Parses and lowers `code`.
    pub fn intermediate(&self, code: &str) -> Result<Intermediate, LiteralError> {
        lower::lower(&self.parse(code)?)
    }

    /// Converts `code` into a `T`, reflecting `T`'s schema first.
    pub fn convert<T: Reflect + DeserializeOwned>(&self, code: &str) -> Result<T, LiteralError> {
        let schema = SchemaReflector::reflect(&T::shape());
        self.convert_with_schema(code, &schema)
    }

    /// Converts `code` into a `T`, resolving record fields through `schema`.
    pub fn convert_with_schema<T: Reflect + DeserializeOwned>(
        &self,
        code: &str,
        schema: &TypeSchema,
    ) -> Result<T, LiteralError> {
        let document = self.materialize(code, schema, &T::shape())?;
        serde_json::from_value(document).map_err(|e| LiteralError::Deserialize(e.to_string()))
    }

    /// Runs the whole pipeline but stops at the checked JSON document.
    pub fn materialize(
        &self,
        code: &str,
        schema: &TypeSchema,
        shape: &TypeShape,
    ) -> Result<serde_json::Value, LiteralError> {
        let value = self.intermediate(code)?;
        debug!(destination = %shape, kind = value.kind_name(), "materializing literal");
        Materializer::new(self.ignore_unknown_fields).materialize(&value, shape, schema)
    }
}

impl Default for LiteralConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts `code` into a `T` with the default converter settings.
pub fn code_to_value<T: Reflect + DeserializeOwned>(code: &str) -> Result<T, LiteralError> {
    LiteralConverter::new().convert(code)
}
