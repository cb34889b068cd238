//! Common test utilities: fake components, reflected records and graph fixtures.
use kairo::prelude::*;
use kairo::reflect_record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// --- Fake components ---

#[allow(dead_code)]
pub struct FakeEmbedder;

impl Component for FakeEmbedder {
    fn display_name(&self) -> Option<&str> {
        Some("FakeEmbedder")
    }

    fn as_embedder(self: Arc<Self>) -> Option<Arc<dyn Embedder>> {
        Some(self)
    }
}
impl Embedder for FakeEmbedder {}

#[allow(dead_code)]
pub struct FakeRetriever;

impl Component for FakeRetriever {
    fn display_name(&self) -> Option<&str> {
        Some("FakeRetriever")
    }

    fn as_retriever(self: Arc<Self>) -> Option<Arc<dyn Retriever>> {
        Some(self)
    }
}
impl Retriever for FakeRetriever {}

/// A chat model that does not report an implementation name.
#[allow(dead_code)]
pub struct FakeChatModel;

impl Component for FakeChatModel {
    fn as_chat_model(self: Arc<Self>) -> Option<Arc<dyn ChatModel>> {
        Some(self)
    }
}
impl ChatModel for FakeChatModel {}

#[allow(dead_code)]
pub struct FakeTemplate;

impl Component for FakeTemplate {
    fn display_name(&self) -> Option<&str> {
        Some("FakeTemplate")
    }

    fn as_chat_template(self: Arc<Self>) -> Option<Arc<dyn ChatTemplate>> {
        Some(self)
    }
}
impl ChatTemplate for FakeTemplate {}

#[allow(dead_code)]
pub struct FakeLambda(pub &'static str);

impl Component for FakeLambda {
    fn display_name(&self) -> Option<&str> {
        Some(self.0)
    }

    fn as_lambda(self: Arc<Self>) -> Option<Arc<dyn Lambda>> {
        Some(self)
    }
}
impl Lambda for FakeLambda {}

/// Implements no capability at all.
#[allow(dead_code)]
pub struct Opaque;

impl Component for Opaque {}

// --- Reflected records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub top_k: u32,
}
reflect_record!(Query { text: String, top_k: u32 });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub email: Option<String>,
    pub friends: Vec<Person>,
    pub scores: HashMap<String, f64>,
}
reflect_record!(Person {
    name: String,
    age: u32,
    email: Option<String>,
    friends: Vec<Person>,
    scores: HashMap<String, f64>,
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub value: i32,
    pub children: Vec<TreeNode>,
    pub parent: Option<Box<TreeNode>>,
}
reflect_record!(TreeNode {
    value: i32,
    children: Vec<TreeNode>,
    parent: Option<Box<TreeNode>>,
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(rename = "maxTokens")]
    pub max_tokens: u16,
    pub temperature: f32,
    pub stop: [char; 2],
    pub weights: HashMap<u8, f64>,
    pub extra: serde_json::Value,
    pub fallback: Option<Arc<Query>>,
}
reflect_record!(ModelConfig {
    model: String,
    max_tokens: u16 as "maxTokens",
    temperature: f32,
    stop: [char; 2],
    weights: HashMap<u8, f64>,
    extra: serde_json::Value,
    fallback: Option<Arc<Query>>,
});

// --- Graph fixtures ---

#[allow(dead_code)]
pub fn query_spec() -> NodeSpec {
    NodeSpec::of::<Query, Query>()
}

#[allow(dead_code)]
pub fn new_graph() -> Graph {
    Graph::new(TypeShape::of::<Query>(), TypeShape::of::<Vec<String>>())
}

/// `START -> a -> b -> END`
#[allow(dead_code)]
pub fn linear_graph() -> CompiledGraph {
    let mut graph = new_graph();
    graph
        .add_lambda_node("a", Arc::new(FakeLambda("Normalize")), query_spec())
        .unwrap();
    graph
        .add_chat_model_node("b", Arc::new(FakeChatModel), NodeSpec::of::<Query, Vec<String>>())
        .unwrap();
    graph.add_edge(START, "a").unwrap();
    graph.add_edge("a", "b").unwrap();
    graph.add_edge("b", END).unwrap();
    graph.compile().unwrap()
}

/// `START -> a -> {b, c} -> d -> END`
#[allow(dead_code)]
pub fn diamond_graph() -> CompiledGraph {
    let mut graph = new_graph();
    for key in ["a", "b", "c", "d"] {
        graph.add_passthrough_node(key, query_spec()).unwrap();
    }
    graph.add_edge(START, "a").unwrap();
    graph.add_edge("a", "b").unwrap();
    graph.add_edge("a", "c").unwrap();
    graph.add_edge("b", "d").unwrap();
    graph.add_edge("c", "d").unwrap();
    graph.add_edge("d", END).unwrap();
    graph.compile().unwrap()
}

/// `START -> root -> {x, y, z} -> END`, plus an unreachable `orphan`.
#[allow(dead_code)]
pub fn fan_out_graph() -> CompiledGraph {
    let mut graph = new_graph();
    graph
        .add_embedding_node("root", Arc::new(FakeEmbedder), query_spec())
        .unwrap();
    for key in ["x", "y", "z", "orphan"] {
        graph
            .add_retriever_node(key, Arc::new(FakeRetriever), query_spec())
            .unwrap();
    }
    graph.add_edge(START, "root").unwrap();
    for key in ["x", "y", "z"] {
        graph.add_edge("root", key).unwrap();
        graph.add_edge(key, END).unwrap();
    }
    graph.add_edge("orphan", END).unwrap();
    graph.compile().unwrap()
}

/// `START -> classify`, then a branch picking `answer` or `search`;
/// `search -> answer -> END`.
#[allow(dead_code)]
pub fn branch_graph() -> CompiledGraph {
    let mut graph = new_graph();
    graph
        .add_chat_template_node("classify", Arc::new(FakeTemplate), query_spec())
        .unwrap();
    graph
        .add_retriever_node("search", Arc::new(FakeRetriever), query_spec())
        .unwrap();
    graph
        .add_chat_model_node("answer", Arc::new(FakeChatModel), NodeSpec::of::<Query, Vec<String>>())
        .unwrap();
    graph.add_edge(START, "classify").unwrap();
    graph
        .add_branch("classify", route_branch().with_label("needs_search"))
        .unwrap();
    graph.add_edge("search", "answer").unwrap();
    graph.add_edge("answer", END).unwrap();
    graph.compile().unwrap()
}

/// Routes to `search` when the input asks for results, else to `answer`.
#[allow(dead_code)]
pub fn route_branch() -> Branch {
    Branch::new(
        |value: &serde_json::Value| {
            let top_k = value
                .get("top_k")
                .and_then(serde_json::Value::as_u64)
                .ok_or_else(|| BranchError("missing top_k".to_string()))?;
            Ok(if top_k > 0 { "search" } else { "answer" }.to_string())
        },
        ["answer", "search"],
    )
}

/// `START -> inner_a -> inner_b -> END`
#[allow(dead_code)]
pub fn inner_graph() -> CompiledGraph {
    let mut graph = new_graph();
    graph.add_passthrough_node("inner_a", query_spec()).unwrap();
    graph
        .add_chat_model_node("inner_b", Arc::new(FakeChatModel), NodeSpec::of::<Query, Vec<String>>())
        .unwrap();
    graph.add_edge(START, "inner_a").unwrap();
    graph.add_edge("inner_a", "inner_b").unwrap();
    graph.add_edge("inner_b", END).unwrap();
    graph.compile().unwrap()
}

/// `START -> prep -> sub -> END`, where `sub` is [`inner_graph`].
#[allow(dead_code)]
pub fn nested_graph() -> CompiledGraph {
    let mut graph = new_graph();
    graph
        .add_lambda_node("prep", Arc::new(FakeLambda("Prepare")), query_spec())
        .unwrap();
    graph
        .add_graph_node(
            "sub",
            Arc::new(inner_graph()),
            NodeSpec::of::<Query, Vec<String>>().with_options(NodeOptions::named("Answer pipeline")),
        )
        .unwrap();
    graph.add_edge(START, "prep").unwrap();
    graph.add_edge("prep", "sub").unwrap();
    graph.add_edge("sub", END).unwrap();
    graph.compile().unwrap()
}

/// Sorted `source -> target` pairs of all plain edges.
#[allow(dead_code)]
pub fn edge_pairs(info: &GraphInfo) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = info
        .edges
        .iter()
        .flat_map(|(source, targets)| targets.iter().map(move |t| (source.clone(), t.clone())))
        .collect();
    pairs.sort();
    pairs
}

/// Sorted node keys.
#[allow(dead_code)]
pub fn node_keys(info: &GraphInfo) -> Vec<String> {
    let mut keys: Vec<String> = info.nodes.keys().cloned().collect();
    keys.sort();
    keys
}
