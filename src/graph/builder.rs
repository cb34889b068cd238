use super::info::{Branch, GraphInfo, GraphNodeInfo, NodeOptions, StateGenerator};
use super::{
    implements_kind, ChatModel, ChatTemplate, Component, ComponentKind, Embedder, Indexer,
    InstanceHandle, Lambda, Retriever, SubGraph, ToolsNode, END, START,
};
use crate::error::GraphError;
use crate::shape::{Reflect, TypeShape};
use ahash::AHashMap;
use std::sync::Arc;

/// Declared types and options of a node being added to a [`Graph`].
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub input_type: TypeShape,
    pub output_type: TypeShape,
    pub options: NodeOptions,
}

impl NodeSpec {
    pub fn new(input_type: TypeShape, output_type: TypeShape) -> Self {
        Self {
            input_type,
            output_type,
            options: NodeOptions::default(),
        }
    }

    /// Spec for a node consuming `I` and producing `O`.
    pub fn of<I: Reflect, O: Reflect>() -> Self {
        Self::new(I::shape(), O::shape())
    }

    pub fn with_options(mut self, options: NodeOptions) -> Self {
        self.options = options;
        self
    }

    fn from_node(node: &GraphNodeInfo) -> Self {
        Self {
            input_type: node.input_type.clone(),
            output_type: node.output_type.clone(),
            options: node.options.clone(),
        }
    }
}

/// Builds a graph under the same rules the orchestration compiler applies.
///
/// Every mutation is validated eagerly: keys are unique and not reserved,
/// edges and branches only reference nodes that are already present (or the
/// sentinels), and a node's instance must implement its declared kind.
pub struct Graph {
    nodes: AHashMap<String, GraphNodeInfo>,
    edges: AHashMap<String, Vec<String>>,
    branches: AHashMap<String, Vec<Branch>>,
    input_type: TypeShape,
    output_type: TypeShape,
    state_generator: Option<StateGenerator>,
}

impl Graph {
    pub fn new(input_type: TypeShape, output_type: TypeShape) -> Self {
        Self {
            nodes: AHashMap::new(),
            edges: AHashMap::new(),
            branches: AHashMap::new(),
            input_type,
            output_type,
            state_generator: None,
        }
    }

    pub fn with_state_generator(mut self, generator: StateGenerator) -> Self {
        self.state_generator = Some(generator);
        self
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Adds a node of `kind`, checking that `instance` provides the
    /// capability the kind requires. Passthrough nodes carry no instance.
    pub fn add_node(
        &mut self,
        key: &str,
        kind: ComponentKind,
        instance: Option<InstanceHandle>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        if key == START || key == END {
            return Err(GraphError::ReservedKey(key.to_string()));
        }
        if self.nodes.contains_key(key) {
            return Err(GraphError::DuplicateNode(key.to_string()));
        }

        let mismatch = || GraphError::KindMismatch {
            key: key.to_string(),
            kind,
        };
        let graph_info = match (kind, &instance) {
            (ComponentKind::Passthrough, _) => None,
            (kind, Some(handle)) if kind.is_subgraph() => {
                let subgraph = Arc::clone(handle).as_graph().ok_or_else(mismatch)?;
                Some(subgraph.graph_info().clone())
            }
            (kind, Some(handle)) if implements_kind(handle, kind) => None,
            _ => return Err(mismatch()),
        };

        let name = spec.options.name.clone().unwrap_or_else(|| key.to_string());
        self.nodes.insert(
            key.to_string(),
            GraphNodeInfo {
                key: key.to_string(),
                name,
                kind,
                instance,
                input_type: spec.input_type,
                output_type: spec.output_type,
                graph_info,
                options: spec.options,
            },
        );
        Ok(())
    }

    /// Re-adds a node described by an existing [`GraphNodeInfo`], sharing its instance.
    pub fn add_node_from_info(&mut self, node: &GraphNodeInfo) -> Result<(), GraphError> {
        self.add_node(
            &node.key,
            node.kind,
            node.instance.clone(),
            NodeSpec::from_node(node),
        )
    }

    pub fn add_embedding_node<E: Embedder>(
        &mut self,
        key: &str,
        node: Arc<E>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Embedding, Some(node as InstanceHandle), spec)
    }

    pub fn add_retriever_node<R: Retriever>(
        &mut self,
        key: &str,
        node: Arc<R>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Retriever, Some(node as InstanceHandle), spec)
    }

    pub fn add_indexer_node<I: Indexer>(
        &mut self,
        key: &str,
        node: Arc<I>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Indexer, Some(node as InstanceHandle), spec)
    }

    pub fn add_chat_model_node<M: ChatModel>(
        &mut self,
        key: &str,
        node: Arc<M>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::ChatModel, Some(node as InstanceHandle), spec)
    }

    pub fn add_chat_template_node<T: ChatTemplate>(
        &mut self,
        key: &str,
        node: Arc<T>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Prompt, Some(node as InstanceHandle), spec)
    }

    pub fn add_lambda_node<L: Lambda>(
        &mut self,
        key: &str,
        node: Arc<L>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Lambda, Some(node as InstanceHandle), spec)
    }

    pub fn add_tools_node<T: ToolsNode>(
        &mut self,
        key: &str,
        node: Arc<T>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::ToolsNode, Some(node as InstanceHandle), spec)
    }

    pub fn add_passthrough_node(&mut self, key: &str, spec: NodeSpec) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Passthrough, None, spec)
    }

    /// Adds a compiled graph as a node; its topology becomes the node's nested info.
    pub fn add_graph_node(
        &mut self,
        key: &str,
        graph: Arc<CompiledGraph>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Graph, Some(graph as InstanceHandle), spec)
    }

    /// Adds a compiled sequential graph as a chain node.
    pub fn add_chain_node(
        &mut self,
        key: &str,
        chain: Arc<CompiledGraph>,
        spec: NodeSpec,
    ) -> Result<(), GraphError> {
        self.add_node(key, ComponentKind::Chain, Some(chain as InstanceHandle), spec)
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        let invalid = |message: &str| GraphError::InvalidEdge {
            source_key: source.to_string(),
            target_key: target.to_string(),
            message: message.to_string(),
        };
        if source == END {
            return Err(invalid("edges cannot leave the end sentinel"));
        }
        if target == START {
            return Err(invalid("edges cannot enter the start sentinel"));
        }
        for endpoint in [source, target] {
            if endpoint != START && endpoint != END && !self.nodes.contains_key(endpoint) {
                return Err(GraphError::UnknownEdgeEndpoint {
                    source_key: source.to_string(),
                    target_key: target.to_string(),
                    missing_key: endpoint.to_string(),
                });
            }
        }

        let targets = self.edges.entry(source.to_string()).or_default();
        if targets.iter().any(|t| t == target) {
            return Err(GraphError::DuplicateEdge {
                source_key: source.to_string(),
                target_key: target.to_string(),
            });
        }
        targets.push(target.to_string());
        Ok(())
    }

    pub fn add_branch(&mut self, source: &str, branch: Branch) -> Result<(), GraphError> {
        if source == END {
            return Err(GraphError::InvalidEdge {
                source_key: source.to_string(),
                target_key: branch.end_nodes.iter().next().cloned().unwrap_or_default(),
                message: "branches cannot leave the end sentinel".to_string(),
            });
        }
        if source != START && !self.nodes.contains_key(source) {
            return Err(GraphError::UnknownBranchSource(source.to_string()));
        }
        if branch.end_nodes.is_empty() {
            return Err(GraphError::EmptyBranch(source.to_string()));
        }
        if let Some(missing) = branch
            .end_nodes
            .iter()
            .find(|t| t.as_str() != END && !self.nodes.contains_key(t.as_str()))
        {
            return Err(GraphError::UnknownBranchTarget {
                source_key: source.to_string(),
                target_key: missing.clone(),
            });
        }
        self.branches.entry(source.to_string()).or_default().push(branch);
        Ok(())
    }

    /// Finalizes the graph. Fails when nothing leaves the start sentinel.
    pub fn compile(self) -> Result<CompiledGraph, GraphError> {
        let has_entry = self.edges.get(START).is_some_and(|t| !t.is_empty())
            || self.branches.get(START).is_some_and(|b| !b.is_empty());
        if !has_entry {
            return Err(GraphError::NoEntryPoint);
        }
        Ok(CompiledGraph {
            info: GraphInfo {
                nodes: self.nodes,
                edges: self.edges,
                branches: self.branches,
                input_type: self.input_type,
                output_type: self.output_type,
                state_generator: self.state_generator,
            },
        })
    }
}

/// A compiled, read-only graph. It can be embedded in another graph as a node.
#[derive(Debug)]
pub struct CompiledGraph {
    info: GraphInfo,
}

impl CompiledGraph {
    pub fn info(&self) -> &GraphInfo {
        &self.info
    }

    pub fn into_info(self) -> GraphInfo {
        self.info
    }
}

impl Component for CompiledGraph {
    fn as_graph(self: Arc<Self>) -> Option<Arc<dyn SubGraph>> {
        Some(self)
    }
}

impl SubGraph for CompiledGraph {
    fn graph_info(&self) -> &GraphInfo {
        &self.info
    }
}
