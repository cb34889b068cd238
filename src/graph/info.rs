use super::{ComponentKind, InstanceHandle};
use crate::error::BranchError;
use crate::shape::TypeShape;
use ahash::AHashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Picks the next node key from a branch source's output.
pub type BranchCondition = Arc<dyn Fn(&serde_json::Value) -> Result<String, BranchError> + Send + Sync>;

/// Produces the initial graph-local state of a run.
pub type StateGenerator = Arc<dyn Fn() -> serde_json::Value + Send + Sync>;

/// Options a node was constructed with. Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOptions {
    pub name: Option<String>,
    pub input_key: Option<String>,
    pub output_key: Option<String>,
}

impl NodeOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A conditional fan-out: at run time `condition` selects one of `end_nodes`.
#[derive(Clone)]
pub struct Branch {
    pub condition: BranchCondition,
    pub end_nodes: BTreeSet<String>,
    /// Optional human label shown on the canvas.
    pub label: Option<String>,
}

impl Branch {
    pub fn new<F, I, S>(condition: F, end_nodes: I) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<String, BranchError> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            condition: Arc::new(condition),
            end_nodes: end_nodes.into_iter().map(Into::into).collect(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Runs the selection function.
    pub fn select(&self, value: &serde_json::Value) -> Result<String, BranchError> {
        (self.condition)(value)
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("end_nodes", &self.end_nodes)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Static description of one node of a compiled graph.
#[derive(Clone)]
pub struct GraphNodeInfo {
    pub key: String,
    /// Display name: the `name` option if one was given, else the key.
    pub name: String,
    pub kind: ComponentKind,
    /// `None` only for passthrough nodes.
    pub instance: Option<InstanceHandle>,
    pub input_type: TypeShape,
    pub output_type: TypeShape,
    /// Set when the node is itself a compiled graph.
    pub graph_info: Option<GraphInfo>,
    pub options: NodeOptions,
}

impl GraphNodeInfo {
    /// The concrete implementation's name, else the generic kind name.
    pub fn implementation_name(&self) -> &str {
        self.instance
            .as_ref()
            .and_then(|instance| instance.display_name())
            .unwrap_or(self.kind.as_str())
    }
}

impl fmt::Debug for GraphNodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNodeInfo")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("graph_info", &self.graph_info)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Static topology and type information of a compiled graph.
///
/// Produced once by the graph compiler and read-only afterwards. `START` and
/// `END` never appear in `nodes`.
#[derive(Clone)]
pub struct GraphInfo {
    pub nodes: AHashMap<String, GraphNodeInfo>,
    /// Source key -> ordered target keys.
    pub edges: AHashMap<String, Vec<String>>,
    pub branches: AHashMap<String, Vec<Branch>>,
    pub input_type: TypeShape,
    pub output_type: TypeShape,
    pub state_generator: Option<StateGenerator>,
}

impl GraphInfo {
    pub fn node(&self, key: &str) -> Option<&GraphNodeInfo> {
        self.nodes.get(key)
    }

    pub fn edge_targets(&self, source: &str) -> &[String] {
        self.edges.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn branches_of(&self, source: &str) -> &[Branch] {
        self.branches.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for GraphInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphInfo")
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .field("branches", &self.branches)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("state_generator", &self.state_generator.is_some())
            .finish()
    }
}
