//! Carves a minimal, independently runnable subgraph out of a compiled graph.

use crate::error::GraphError;
use crate::graph::{CompiledGraph, Graph, GraphInfo, END, START};
use ahash::AHashSet;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Rebuilds the part of `info` reachable from `start` as a new graph.
///
/// When `start` is a real node an edge from the start sentinel to it is
/// synthesized so the result can be run on its own. Every reachable node is
/// added exactly once, every edge and branch leaving a reachable node is
/// carried over, and instances are shared with the source graph. Any
/// construction failure aborts the whole extraction.
pub fn extract_subgraph(info: &GraphInfo, start: &str) -> Result<CompiledGraph, GraphError> {
    if start == END {
        return Err(GraphError::InvalidStartNode(start.to_string()));
    }

    let input_type = if start == START {
        info.input_type.clone()
    } else {
        info.node(start)
            .ok_or_else(|| GraphError::StartNodeNotFound(start.to_string()))?
            .input_type
            .clone()
    };

    let mut graph = Graph::new(input_type, info.output_type.clone());
    if let Some(generator) = &info.state_generator {
        graph = graph.with_state_generator(generator.clone());
    }

    let mut extractor = Extractor {
        info,
        graph,
        settled: AHashSet::new(),
        queue: VecDeque::new(),
    };

    if start != START {
        extractor.settle(start, start)?;
        extractor.graph.add_edge(START, start)?;
    } else {
        extractor.queue.push_back(START.to_string());
    }

    while let Some(key) = extractor.queue.pop_front() {
        extractor.expand(&key)?;
    }

    let compiled = extractor.graph.compile()?;
    info!(
        start,
        nodes = compiled.info().nodes.len(),
        edges = compiled.info().edge_count(),
        branches = compiled.info().branch_count(),
        "extracted debug subgraph"
    );
    Ok(compiled)
}

struct Extractor<'a> {
    info: &'a GraphInfo,
    graph: Graph,
    settled: AHashSet<String>,
    queue: VecDeque<String>,
}

impl<'a> Extractor<'a> {
    /// Carries over the plain edges and branches leaving `key`.
    fn expand(&mut self, key: &str) -> Result<(), GraphError> {
        let info = self.info;

        for target in info.edge_targets(key) {
            if target != END {
                self.settle(target, key)?;
            }
            self.graph.add_edge(key, target)?;
            debug!(source = key, target = target.as_str(), "added edge");
        }

        for branch in info.branches_of(key) {
            for target in &branch.end_nodes {
                if target != END {
                    self.settle(target, key).map_err(|err| match err {
                        GraphError::UnknownEdgeEndpoint { missing_key, .. } => {
                            GraphError::UnknownBranchTarget {
                                source_key: key.to_string(),
                                target_key: missing_key,
                            }
                        }
                        other => other,
                    })?;
                }
            }
            self.graph.add_branch(key, branch.clone())?;
            debug!(source = key, targets = branch.end_nodes.len(), "added branch");
        }
        Ok(())
    }

    /// Adds `key` to the new graph and queues it, unless it was added before.
    fn settle(&mut self, key: &str, reached_from: &str) -> Result<(), GraphError> {
        if self.settled.contains(key) {
            return Ok(());
        }
        let node = self
            .info
            .node(key)
            .ok_or_else(|| GraphError::UnknownEdgeEndpoint {
                source_key: reached_from.to_string(),
                target_key: key.to_string(),
                missing_key: key.to_string(),
            })?;
        self.graph.add_node_from_info(node)?;
        self.settled.insert(key.to_string());
        self.queue.push_back(key.to_string());
        debug!(node = key, kind = %node.kind, "added node");
        Ok(())
    }
}
