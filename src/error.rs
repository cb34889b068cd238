use crate::graph::ComponentKind;
use thiserror::Error;

/// Errors raised while building a graph or extracting a subgraph from one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Cannot start a debug run at '{0}': it is the end sentinel")]
    InvalidStartNode(String),

    #[error("Start node '{0}' is not part of the graph")]
    StartNodeNotFound(String),

    #[error("Node '{0}' has already been added to the graph")]
    DuplicateNode(String),

    #[error("'{0}' is a reserved key and cannot be used as a node key")]
    ReservedKey(String),

    #[error(
        "Edge '{source_key}' -> '{target_key}' references node '{missing_key}', which is not part of the graph"
    )]
    UnknownEdgeEndpoint {
        source_key: String,
        target_key: String,
        missing_key: String,
    },

    #[error("Edge '{source_key}' -> '{target_key}' has already been added")]
    DuplicateEdge {
        source_key: String,
        target_key: String,
    },

    #[error("Edge '{source_key}' -> '{target_key}' is invalid: {message}")]
    InvalidEdge {
        source_key: String,
        target_key: String,
        message: String,
    },

    #[error("Branch on node '{source_key}' targets '{target_key}', which is not part of the graph")]
    UnknownBranchTarget {
        source_key: String,
        target_key: String,
    },

    #[error("Branch source '{0}' is not part of the graph")]
    UnknownBranchSource(String),

    #[error("Branch on node '{0}' declares no possible targets")]
    EmptyBranch(String),

    #[error("Instance of node '{key}' does not implement its declared kind '{kind}'")]
    KindMismatch { key: String, kind: ComponentKind },

    #[error("Graph has no entry point: nothing is connected to the start sentinel")]
    NoEntryPoint,
}

/// Errors raised while projecting a graph into a canvas schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    #[error("Node '{source_key}' connects to '{target_key}', which is not part of the graph")]
    DanglingTarget {
        source_key: String,
        target_key: String,
    },

    #[error("Connections are declared for '{0}', which is not part of the graph")]
    UnknownSource(String),

    #[error("Failed to build the canvas of subgraph node '{key}': {source}")]
    Nested {
        key: String,
        #[source]
        source: Box<CanvasError>,
    },
}

/// Errors raised while converting a literal snippet into a value.
///
/// `Syntax` and `UnresolvedReference` are raised before the destination is
/// touched; every other variant comes out of materialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("Syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unresolved reference '{name}' at {line}:{column}: only true, false, null and None are known")]
    UnresolvedReference {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Type mismatch at '{path}': expected {expected}, but found {found}")]
    Mismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Value {value} at '{path}' does not fit in {expected}")]
    OutOfRange {
        path: String,
        expected: String,
        value: String,
    },

    #[error("Array at '{path}' needs exactly {expected} elements, but the literal has {found}")]
    LengthMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Map at '{path}' receives key '{key}' more than once")]
    DuplicateKey { path: String, key: String },

    #[error("Required field '{field}' is missing at '{path}'")]
    MissingField { path: String, field: String },

    #[error("Record at '{path}' has no field named '{field}'")]
    UnknownField { path: String, field: String },

    #[error("A {found} at '{path}' is not assignable to interface {interface}")]
    NotAssignable {
        path: String,
        interface: String,
        found: String,
    },

    #[error("Destination type {type_name} at '{path}' cannot be built from a literal")]
    Unsupported { path: String, type_name: String },

    #[error("Failed to build the destination value: {0}")]
    Deserialize(String),
}

impl LiteralError {
    /// Whether the error was raised before materialization began.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            LiteralError::Syntax { .. } | LiteralError::UnresolvedReference { .. }
        )
    }

    pub(crate) fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        LiteralError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Error returned by a branch selection function.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Branch condition failed: {0}")]
pub struct BranchError(pub String);
