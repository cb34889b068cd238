//! # Kairo - Interactive Debugging Toolkit for Orchestration Graphs
//!
//! **Kairo** contains the pieces a visual debugger needs to work on a compiled
//! orchestration graph without running the whole thing. It reads the graph's
//! static description ([`GraphInfo`](graph::GraphInfo)) and never mutates it.
//!
//! ## Core Workflow
//!
//! 1.  **Describe your types**: implement [`Reflect`](shape::Reflect) for the records flowing
//!     through the graph with [`reflect_record!`].
//! 2.  **Build or receive a graph**: the [`Graph`](graph::Graph) builder applies the same
//!     construction rules the orchestration compiler does.
//! 3.  **Extract**: [`extract_subgraph`](extract::extract_subgraph) carves out the part of the
//!     graph reachable from any node, so a run can start there.
//! 4.  **Project**: [`build_canvas`](canvas::build_canvas) turns the topology into the document
//!     the visual editor renders, with [`TypeSchema`](schema::TypeSchema)s for every node.
//! 5.  **Feed inputs**: the [`LiteralConverter`](literal::LiteralConverter) turns a hand-written
//!     literal into a value of the start node's input type.
//!
//! ## Quick Start
//!
//! ```rust
//! use kairo::prelude::*;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Deserialize)]
//! struct Question {
//!     text: String,
//!     top_k: Option<u32>,
//! }
//! kairo::reflect_record!(Question { text: String, top_k: Option<u32> });
//!
//! struct Search;
//! impl Component for Search {
//!     fn as_retriever(self: Arc<Self>) -> Option<Arc<dyn Retriever>> {
//!         Some(self)
//!     }
//! }
//! impl Retriever for Search {}
//!
//! fn main() -> Result<()> {
//!     let mut graph = Graph::new(TypeShape::of::<Question>(), TypeShape::of::<Vec<String>>());
//!     graph.add_passthrough_node("rewrite", NodeSpec::of::<Question, Question>())?;
//!     graph.add_retriever_node("search", Arc::new(Search), NodeSpec::of::<Question, Vec<String>>())?;
//!     graph.add_edge(START, "rewrite")?;
//!     graph.add_edge("rewrite", "search")?;
//!     graph.add_edge("search", END)?;
//!     let compiled = graph.compile()?;
//!
//!     // Debug from "search" onwards.
//!     let debug_graph = extract_subgraph(compiled.info(), "search")?;
//!     assert_eq!(debug_graph.info().nodes.len(), 1);
//!
//!     let canvas = build_canvas(debug_graph.info())?;
//!     println!("{}", serde_json::to_string_pretty(&canvas)?);
//!
//!     let input: Question = code_to_value(r#"Question { text: "what is rust?" }"#)?;
//!     assert_eq!(input.top_k, None);
//!     Ok(())
//! }
//! ```

pub mod canvas;
pub mod error;
pub mod extract;
pub mod graph;
pub mod literal;
pub mod prelude;
pub mod schema;
pub mod shape;
