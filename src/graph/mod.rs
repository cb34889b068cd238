//! The contract side of a compiled orchestration graph.
//!
//! The orchestration engine that runs graphs lives elsewhere; this module
//! models what the debugging tools need from it: the closed set of component
//! kinds, opaque instance handles with checked capability downcasts, the
//! read-only [`GraphInfo`] descriptor and a [`Graph`] builder that applies the
//! same construction rules the engine's compiler does.

mod builder;
mod info;

pub use builder::{CompiledGraph, Graph, NodeSpec};
pub use info::{Branch, BranchCondition, GraphInfo, GraphNodeInfo, NodeOptions, StateGenerator};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Reserved key of the entry sentinel.
pub const START: &str = "start";
/// Reserved key of the exit sentinel.
pub const END: &str = "end";

/// The closed set of node kinds a compiled graph can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Embedding,
    Retriever,
    Indexer,
    ChatModel,
    Prompt,
    Lambda,
    ToolsNode,
    Passthrough,
    Graph,
    Chain,
}

impl ComponentKind {
    /// The generic display name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Embedding => "Embedding",
            ComponentKind::Retriever => "Retriever",
            ComponentKind::Indexer => "Indexer",
            ComponentKind::ChatModel => "ChatModel",
            ComponentKind::Prompt => "Prompt",
            ComponentKind::Lambda => "Lambda",
            ComponentKind::ToolsNode => "ToolsNode",
            ComponentKind::Passthrough => "Passthrough",
            ComponentKind::Graph => "Graph",
            ComponentKind::Chain => "Chain",
        }
    }

    /// Whether nodes of this kind wrap a nested graph.
    pub fn is_subgraph(self) -> bool {
        matches!(self, ComponentKind::Graph | ComponentKind::Chain)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque node instance. The toolkit never looks inside one; it only asks
/// for the capability a node's declared kind requires.
pub type InstanceHandle = Arc<dyn Component>;

/// Implemented by every node instance a graph can hold.
///
/// Each `as_*` accessor is a checked downcast to one capability. They default
/// to `None`; an implementation overrides the ones it provides, typically
/// with `Some(self)`.
pub trait Component: Send + Sync + 'static {
    /// The concrete implementation's name, if it has one worth showing.
    fn display_name(&self) -> Option<&str> {
        None
    }

    fn as_embedder(self: Arc<Self>) -> Option<Arc<dyn Embedder>> {
        None
    }

    fn as_retriever(self: Arc<Self>) -> Option<Arc<dyn Retriever>> {
        None
    }

    fn as_indexer(self: Arc<Self>) -> Option<Arc<dyn Indexer>> {
        None
    }

    fn as_chat_model(self: Arc<Self>) -> Option<Arc<dyn ChatModel>> {
        None
    }

    fn as_chat_template(self: Arc<Self>) -> Option<Arc<dyn ChatTemplate>> {
        None
    }

    fn as_lambda(self: Arc<Self>) -> Option<Arc<dyn Lambda>> {
        None
    }

    fn as_tools_node(self: Arc<Self>) -> Option<Arc<dyn ToolsNode>> {
        None
    }

    fn as_graph(self: Arc<Self>) -> Option<Arc<dyn SubGraph>> {
        None
    }
}

/// Turns text into vectors.
pub trait Embedder: Component {}

/// Finds documents relevant to a query.
pub trait Retriever: Component {}

/// Stores documents for later retrieval.
pub trait Indexer: Component {}

/// Generates messages from a conversation.
pub trait ChatModel: Component {}

/// Formats prompt variables into messages.
pub trait ChatTemplate: Component {}

/// A user function wrapped as a node.
pub trait Lambda: Component {}

/// Executes tool calls.
pub trait ToolsNode: Component {}

/// A node that is itself a compiled graph.
pub trait SubGraph: Component {
    fn graph_info(&self) -> &GraphInfo;
}

/// Whether `handle` provides the capability `kind` requires.
pub(crate) fn implements_kind(handle: &InstanceHandle, kind: ComponentKind) -> bool {
    let handle = Arc::clone(handle);
    match kind {
        ComponentKind::Embedding => handle.as_embedder().is_some(),
        ComponentKind::Retriever => handle.as_retriever().is_some(),
        ComponentKind::Indexer => handle.as_indexer().is_some(),
        ComponentKind::ChatModel => handle.as_chat_model().is_some(),
        ComponentKind::Prompt => handle.as_chat_template().is_some(),
        ComponentKind::Lambda => handle.as_lambda().is_some(),
        ComponentKind::ToolsNode => handle.as_tools_node().is_some(),
        ComponentKind::Graph | ComponentKind::Chain => handle.as_graph().is_some(),
        ComponentKind::Passthrough => true,
    }
}
