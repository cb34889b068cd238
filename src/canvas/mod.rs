//! Visual-editor projection of a graph.
//!
//! The serialized field names below are read by the external canvas editor
//! and must stay exactly as they are.

mod builder;

pub use builder::{build_canvas, CanvasBuilder};

use crate::graph::ComponentKind;
use crate::schema::TypeSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Start,
    End,
    Branch,
    Parallel,
    Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSchema {
    pub name: String,
    pub component: ComponentKind,
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
    pub branches: Vec<CanvasBranch>,
}

impl CanvasSchema {
    pub fn node(&self, key: &str) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    pub fn edges_from<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CanvasEdge> {
        self.edges.iter().filter(move |e| e.source_node_key == key)
    }

    pub fn edges_into<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CanvasEdge> {
        self.edges.iter().filter(move |e| e.target_node_key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_schema: Option<ComponentSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_schema: Option<Box<CanvasSchema>>,
    pub allow_operate: bool,
}

/// Implementation name and reflected I/O types of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentKind>,
    pub name: String,
    pub input_type: TypeSchema,
    pub output_type: TypeSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: String,
    pub name: String,
    pub source_node_key: String,
    pub target_node_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasBranch {
    pub id: String,
    pub condition: String,
    pub source_node_key: String,
    pub target_node_keys: Vec<String>,
}
