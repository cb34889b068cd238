//! Prelude module for convenient imports
//!
//! This module re-exports the types most debugger front-ends need from the
//! kairo crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! # fn run_example(info: &GraphInfo) -> Result<()> {
//! let debug_graph = extract_subgraph(info, "retriever")?;
//! let canvas = build_canvas(debug_graph.info())?;
//! println!("{}", serde_json::to_string_pretty(&canvas)?);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{
    Branch, ChatModel, ChatTemplate, CompiledGraph, Component, ComponentKind, Embedder, Graph,
    GraphInfo, GraphNodeInfo, Indexer, InstanceHandle, Lambda, NodeOptions, NodeSpec, Retriever,
    SubGraph, ToolsNode, END, START,
};

// Debugging operations
pub use crate::canvas::{build_canvas, CanvasBuilder, CanvasSchema, NodeType};
pub use crate::extract::extract_subgraph;
pub use crate::literal::{code_to_value, LiteralConverter};
pub use crate::schema::{DisplaySchema, SchemaReflector, TypeSchema};
pub use crate::shape::{Reflect, TypeShape};

// Error types
pub use crate::error::{BranchError, CanvasError, GraphError, LiteralError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
