use super::{
    CanvasBranch, CanvasEdge, CanvasNode, CanvasSchema, ComponentSchema, NodeType,
};
use crate::error::CanvasError;
use crate::graph::{Branch, ComponentKind, GraphInfo, GraphNodeInfo, END, START};
use crate::schema::TypeSchema;
use crate::shape::TypeShape;
use ahash::AHashSet;
use itertools::Itertools;
use tracing::debug;

/// Projects a [`GraphInfo`] into a [`CanvasSchema`] without touching it.
///
/// Fan-out and branch points have no node of their own in a graph, so the
/// canvas synthesizes one: a `parallel` node for every source with more than
/// one plain-edge target and a `branch` node for every branch. Nested
/// graphs are projected recursively and are never operable from the parent.
///
/// Node keys and edge ids are unique within one build. A synthetic key or
/// edge id that is already taken gets a numeric suffix (`a_parallel_1`).
pub struct CanvasBuilder<'a> {
    info: &'a GraphInfo,
    name: String,
    component: ComponentKind,
    editable: bool,
}

impl<'a> CanvasBuilder<'a> {
    pub fn new(info: &'a GraphInfo) -> Self {
        Self {
            info,
            name: "graph".to_string(),
            component: ComponentKind::Graph,
            editable: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_component(mut self, component: ComponentKind) -> Self {
        self.component = component;
        self
    }

    /// Marks every node of the projection as non-operable.
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn build(&self) -> Result<CanvasSchema, CanvasError> {
        let info = self.info;
        let mut canvas = CanvasSchema {
            name: self.name.clone(),
            component: self.component,
            nodes: Vec::new(),
            edges: Vec::new(),
            branches: Vec::new(),
        };

        let mut taken = Taken::new(info);
        canvas.nodes.push(self.sentinel(START, NodeType::Start, &info.input_type));
        canvas.nodes.push(self.sentinel(END, NodeType::End, &info.output_type));
        for (_, node) in info.nodes.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            canvas.nodes.push(self.component_node(node)?);
        }

        let sources: Vec<&String> = info
            .edges
            .keys()
            .chain(info.branches.keys())
            .unique()
            .sorted()
            .collect();
        for source in sources {
            if source != START && !info.nodes.contains_key(source) {
                return Err(CanvasError::UnknownSource(source.clone()));
            }
            self.wire_edges(source, info.edge_targets(source), &mut taken, &mut canvas)?;
            self.wire_branches(source, info.branches_of(source), &mut taken, &mut canvas)?;
        }

        debug!(
            name = %canvas.name,
            nodes = canvas.nodes.len(),
            edges = canvas.edges.len(),
            branches = canvas.branches.len(),
            "built canvas schema"
        );
        Ok(canvas)
    }

    fn sentinel(&self, key: &str, node_type: NodeType, shape: &TypeShape) -> CanvasNode {
        let schema = TypeSchema::of(shape);
        CanvasNode {
            key: key.to_string(),
            name: key.to_string(),
            node_type,
            component_schema: Some(ComponentSchema {
                component: None,
                name: key.to_string(),
                input_type: schema.clone(),
                output_type: schema,
            }),
            graph_schema: None,
            allow_operate: self.editable && node_type == NodeType::Start,
        }
    }

    fn component_node(&self, node: &GraphNodeInfo) -> Result<CanvasNode, CanvasError> {
        let graph_schema = match &node.graph_info {
            Some(nested) => {
                let schema = CanvasBuilder::new(nested)
                    .with_name(node.key.clone())
                    .with_component(node.kind)
                    .read_only()
                    .build()
                    .map_err(|source| CanvasError::Nested {
                        key: node.key.clone(),
                        source: Box::new(source),
                    })?;
                Some(Box::new(schema))
            }
            None => None,
        };

        Ok(CanvasNode {
            key: node.key.clone(),
            name: node.name.clone(),
            node_type: NodeType::Component,
            component_schema: Some(ComponentSchema {
                component: Some(node.kind),
                name: node.implementation_name().to_string(),
                input_type: TypeSchema::of(&node.input_type),
                output_type: TypeSchema::of(&node.output_type),
            }),
            graph_schema,
            allow_operate: self.editable,
        })
    }

    fn wire_edges(
        &self,
        source: &str,
        targets: &[String],
        taken: &mut Taken,
        canvas: &mut CanvasSchema,
    ) -> Result<(), CanvasError> {
        for target in targets {
            self.check_target(source, target)?;
        }
        match targets {
            [] => {}
            [target] => canvas.edges.push(taken.edge(source, target)),
            _ => {
                let parallel = taken.node_key(format!("{}_parallel", source));
                canvas.nodes.push(self.synthetic(&parallel, NodeType::Parallel));
                canvas.edges.push(taken.edge(source, &parallel));
                for target in targets {
                    canvas.edges.push(taken.edge(&parallel, target));
                }
            }
        }
        Ok(())
    }

    fn wire_branches(
        &self,
        source: &str,
        branches: &[Branch],
        taken: &mut Taken,
        canvas: &mut CanvasSchema,
    ) -> Result<(), CanvasError> {
        for (index, branch) in branches.iter().enumerate() {
            for target in &branch.end_nodes {
                self.check_target(source, target)?;
            }
            let key = taken.node_key(format!("{}_branch_{}", source, index));
            canvas.nodes.push(self.synthetic(&key, NodeType::Branch));
            canvas.edges.push(taken.edge(source, &key));
            for target in &branch.end_nodes {
                canvas.edges.push(taken.edge(&key, target));
            }
            canvas.branches.push(CanvasBranch {
                id: key.clone(),
                condition: branch.label.clone().unwrap_or_else(|| key.clone()),
                source_node_key: source.to_string(),
                target_node_keys: branch.end_nodes.iter().cloned().collect(),
            });
        }
        Ok(())
    }

    fn synthetic(&self, key: &str, node_type: NodeType) -> CanvasNode {
        CanvasNode {
            key: key.to_string(),
            name: key.to_string(),
            node_type,
            component_schema: None,
            graph_schema: None,
            allow_operate: false,
        }
    }

    fn check_target(&self, source: &str, target: &str) -> Result<(), CanvasError> {
        if target == END || self.info.nodes.contains_key(target) {
            Ok(())
        } else {
            Err(CanvasError::DanglingTarget {
                source_key: source.to_string(),
                target_key: target.to_string(),
            })
        }
    }
}

/// Node keys and edge ids handed out so far in one build.
struct Taken {
    node_keys: AHashSet<String>,
    edge_ids: AHashSet<String>,
}

impl Taken {
    fn new(info: &GraphInfo) -> Self {
        let node_keys = info
            .nodes
            .keys()
            .cloned()
            .chain([START.to_string(), END.to_string()])
            .collect();
        Self {
            node_keys,
            edge_ids: AHashSet::new(),
        }
    }

    fn node_key(&mut self, base: String) -> String {
        claim(&mut self.node_keys, base)
    }

    fn edge(&mut self, source: &str, target: &str) -> CanvasEdge {
        CanvasEdge {
            id: claim(&mut self.edge_ids, format!("{}_to_{}", source, target)),
            name: format!("{} -> {}", source, target),
            source_node_key: source.to_string(),
            target_node_key: target.to_string(),
        }
    }
}

/// Returns `base`, or `base_N` with the smallest free `N`, and marks it taken.
fn claim(taken: &mut AHashSet<String>, base: String) -> String {
    let mut candidate = base.clone();
    let mut suffix = 0;
    while taken.contains(&candidate) {
        suffix += 1;
        candidate = format!("{}_{}", base, suffix);
    }
    taken.insert(candidate.clone());
    candidate
}

/// Projects `info` with the default builder settings.
pub fn build_canvas(info: &GraphInfo) -> Result<CanvasSchema, CanvasError> {
    CanvasBuilder::new(info).build()
}
