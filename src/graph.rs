// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph construction and layout for a single repository

use crate::types::{
    BranchData, DeploymentData, Edge, EdgeStyle, MarkerType, Node, NodeData, NodeKind, Position,
    RepoSnapshot,
};
use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Horizontal distance between neighbouring nodes in a row
pub const NODE_SPACING: f64 = 250.0;
/// Y coordinate of the branch row
pub const BRANCH_ROW_Y: f64 = 0.0;
/// Y coordinate of the deployment row
pub const DEPLOYMENT_ROW_Y: f64 = 200.0;

const EDGE_STROKE: &str = "#94a3b8";
const EDGE_STROKE_WIDTH: f64 = 2.0;

/// Nodes and edges ready to hand to a renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoGraph {
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
    /// Edges in insertion order
    pub edges: Vec<Edge>,
}

/// An edge whose endpoint is not part of the node set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    /// Offending edge
    pub edge_id: String,
    /// Node ID that could not be found
    pub missing: String,
}

/// Build the graph for a repository snapshot.
///
/// Emits one node per branch along the top row and one node per deployment
/// along the row below it, then connects every branch to every deployment.
/// Commits, languages and workflows are accepted but produce no nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_graph(snapshot: &RepoSnapshot) -> RepoGraph {
    let branch_nodes: Vec<Node> = snapshot
        .branches
        .iter()
        .enumerate()
        .map(|(index, branch)| Node {
            id: format!("branch-{index}"),
            position: Position::new(index as f64 * NODE_SPACING, BRANCH_ROW_Y),
            data: NodeData::Branch(BranchData {
                label: branch.name.clone(),
                name: branch.name.clone(),
                sha: branch.commit.as_ref().map(|c| c.sha.clone()),
                protected: branch.protected,
                ..Default::default()
            }),
        })
        .collect();

    let deployment_nodes: Vec<Node> = snapshot
        .deployments
        .iter()
        .enumerate()
        .map(|(index, deployment)| Node {
            id: format!("deployment-{index}"),
            position: Position::new(index as f64 * NODE_SPACING, DEPLOYMENT_ROW_Y),
            data: NodeData::Deployment(DeploymentData {
                label: format!("Deployment {}", deployment.id),
                environment: deployment.environment.clone(),
                status: deployment.state.clone(),
                date: deployment.created_at.clone(),
            }),
        })
        .collect();

    let edges: Vec<Edge> = branch_nodes
        .iter()
        .flat_map(|branch| {
            deployment_nodes
                .iter()
                .map(move |deployment| deployment_edge(&branch.id, &deployment.id))
        })
        .collect();

    let mut nodes = branch_nodes;
    nodes.extend(deployment_nodes);

    debug!(
        repo = %snapshot.repo.full_name,
        nodes = nodes.len(),
        edges = edges.len(),
        "built repository graph"
    );

    RepoGraph { nodes, edges }
}

fn deployment_edge(source: &str, target: &str) -> Edge {
    Edge {
        id: Edge::generate_id(source, target),
        source: source.to_string(),
        target: target.to_string(),
        label: None,
        animated: true,
        marker_end: Some(MarkerType::ArrowClosed),
        style: Some(EdgeStyle {
            stroke: EDGE_STROKE.to_string(),
            stroke_width: EDGE_STROKE_WIDTH,
        }),
    }
}

/// Turn language byte counts into percentages of the total, largest first
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn language_shares(languages: &BTreeMap<String, u64>) -> Vec<(String, f64)> {
    // Summed as f64; the byte counts of a snapshot can exceed a u64 total.
    let total: f64 = languages.values().map(|&bytes| bytes as f64).sum();
    let mut shares: Vec<(String, f64)> = languages
        .iter()
        .map(|(name, bytes)| {
            let share = if total == 0.0 {
                0.0
            } else {
                *bytes as f64 * 100.0 / total
            };
            (name.clone(), share)
        })
        .collect();
    shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares
}

impl RepoGraph {
    /// Get a node by ID
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes of one kind
    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.kind() == kind).collect()
    }

    /// Get edges leaving a node
    #[must_use]
    pub fn edges_from(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == node_id).collect()
    }

    /// Get edges entering a node
    #[must_use]
    pub fn edges_to(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == node_id).collect()
    }

    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges whose source or target is missing from the node set.
    ///
    /// The builder never produces these; they appear when node and edge
    /// lists from different builds are mixed.
    #[must_use]
    pub fn validate(&self) -> Vec<DanglingEdge> {
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut dangling = Vec::new();
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !known.contains(endpoint.as_str()) {
                    dangling.push(DanglingEdge {
                        edge_id: edge.id.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }
        dangling
    }

    /// Petgraph view of the graph, node and edge weights are IDs.
    /// Dangling edges are left out.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<String, String> {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.as_str(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from_idx), Some(&to_idx)) = (
                node_indices.get(edge.source.as_str()),
                node_indices.get(edge.target.as_str()),
            ) {
                graph.add_edge(from_idx, to_idx, edge.id.clone());
            }
        }

        graph
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph repository {\n");
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for node in &self.nodes {
            let label = format!("{}\\n{}", escape(node.data.label()), node.kind().code());
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\", pos=\"{},{}!\"];\n",
                node.id,
                label,
                node.position.x,
                0.0 - node.position.y
            ));
        }

        dot.push('\n');

        for edge in &self.edges {
            let label = edge.label.as_deref().map(escape).unwrap_or_default();
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.source, edge.target, label
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize graph to JSON")
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
