// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repograph library - a GitHub repository as a shareable node graph
//!
//! This crate turns the branches and deployments of a repository into a
//! node/edge graph, encodes view state into share links, and fetches the
//! raw data from the GitHub REST API with interactive token recovery.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod annotations;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod fetch;
pub mod github;
pub mod graph;
pub mod share;

/// Core data types shared by the graph builder, the codec and the fetch layer
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use sha2::{Digest, Sha256};
    use std::collections::BTreeMap;

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Position in 2D space
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct Position {
        /// X coordinate
        pub x: f64,
        /// Y coordinate
        pub y: f64,
    }

    impl Position {
        /// Create a position from its coordinates
        #[must_use]
        pub const fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }

        /// Whether both coordinates are finite numbers
        #[must_use]
        pub fn is_finite(&self) -> bool {
            self.x.is_finite() && self.y.is_finite()
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// The fixed set of node kinds a graph may contain
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum NodeKind {
        /// The repository itself
        Repository,
        /// A single commit
        Commit,
        /// A deployment to some environment
        Deployment,
        /// A language share of the codebase
        Language,
        /// A branch
        Branch,
        /// Free-text annotation
        Annotation,
    }

    impl NodeKind {
        /// Wire name of this kind
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Repository => "repository",
                Self::Commit => "commit",
                Self::Deployment => "deployment",
                Self::Language => "language",
                Self::Branch => "branch",
                Self::Annotation => "annotation",
            }
        }
    }

    /// Attributes of a repository-root node
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RepositoryData {
        /// Display label
        pub label: String,
        /// `owner/name`
        pub full_name: String,
        /// Repository description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Star count
        #[serde(default)]
        pub stars: u64,
    }

    /// Attributes of a commit node
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CommitData {
        /// Display label
        pub label: String,
        /// Commit SHA
        pub sha: String,
        /// Commit message
        #[serde(default)]
        pub message: String,
        /// Author name, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub author: Option<String>,
    }

    /// Attributes of a deployment node
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeploymentData {
        /// Display label derived from the deployment identifier
        pub label: String,
        /// Target environment
        pub environment: String,
        /// Deployment state as reported by the API
        pub status: String,
        /// Creation timestamp as reported by the API
        pub date: String,
    }

    /// Attributes of a language node
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LanguageData {
        /// Language name
        pub label: String,
        /// Share of the codebase, 0-100
        pub percentage: f64,
    }

    /// Attributes of a branch node
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BranchData {
        /// Display label
        pub label: String,
        /// Branch name
        pub name: String,
        /// Head commit SHA
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub sha: Option<String>,
        /// Branch protection flag
        #[serde(default)]
        pub protected: bool,
        /// Commits shown on the branch card
        #[serde(default)]
        pub commits: Vec<String>,
        /// Activity heat level
        #[serde(default)]
        pub heat: u8,
        /// Free-form tags
        #[serde(default)]
        pub tags: Vec<String>,
        /// Number of changed files
        #[serde(default)]
        pub files_changed: u32,
        /// Contributor logins
        #[serde(default)]
        pub contributors: Vec<String>,
    }

    /// Attributes of a free-text annotation node
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AnnotationData {
        /// Annotation text
        pub text: String,
        /// Text color
        pub text_color: String,
        /// Box color
        pub box_color: String,
    }

    /// Kind-specific attribute bag, tagged by node kind
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "data", rename_all = "lowercase")]
    pub enum NodeData {
        /// Repository root
        Repository(RepositoryData),
        /// Commit
        Commit(CommitData),
        /// Deployment
        Deployment(DeploymentData),
        /// Language share
        Language(LanguageData),
        /// Branch
        Branch(BranchData),
        /// Free-text annotation
        Annotation(AnnotationData),
    }

    impl NodeData {
        /// The node kind this attribute bag belongs to
        #[must_use]
        pub fn kind(&self) -> NodeKind {
            match self {
                Self::Repository(_) => NodeKind::Repository,
                Self::Commit(_) => NodeKind::Commit,
                Self::Deployment(_) => NodeKind::Deployment,
                Self::Language(_) => NodeKind::Language,
                Self::Branch(_) => NodeKind::Branch,
                Self::Annotation(_) => NodeKind::Annotation,
            }
        }

        /// Display label, whatever the kind
        #[must_use]
        pub fn label(&self) -> &str {
            match self {
                Self::Repository(d) => &d.label,
                Self::Commit(d) => &d.label,
                Self::Deployment(d) => &d.label,
                Self::Language(d) => &d.label,
                Self::Branch(d) => &d.label,
                Self::Annotation(d) => &d.text,
            }
        }
    }

    /// A node of the repository graph
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Node {
        /// Unique within one graph
        pub id: String,
        /// Layout position
        pub position: Position,
        /// Kind and attributes
        #[serde(flatten)]
        pub data: NodeData,
    }

    impl Node {
        /// Kind of this node
        #[must_use]
        pub fn kind(&self) -> NodeKind {
            self.data.kind()
        }
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Arrow marker drawn at an edge end
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum MarkerType {
        /// Open arrow
        Arrow,
        /// Filled arrow
        ArrowClosed,
    }

    /// Stroke styling for an edge
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EdgeStyle {
        /// Stroke color
        pub stroke: String,
        /// Stroke width in pixels
        pub stroke_width: f64,
    }

    /// Directed connection between two nodes
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Edge {
        /// Unique within one graph
        pub id: String,
        /// Source node ID
        pub source: String,
        /// Target node ID
        pub target: String,
        /// Optional label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<String>,
        /// Animated stroke
        #[serde(default)]
        pub animated: bool,
        /// Marker at the target end
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub marker_end: Option<MarkerType>,
        /// Stroke styling
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub style: Option<EdgeStyle>,
    }

    impl Edge {
        /// Deterministic ID for the edge between two nodes
        #[must_use]
        pub fn generate_id(source: &str, target: &str) -> String {
            format!("edge-{source}-{target}")
        }
    }

    // =========================================================================
    // Shareable view state
    // =========================================================================

    /// Minimal snapshot of a view, carried in share links
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShareableState {
        /// Repository URL
        pub repo_url: String,
        /// Selected node
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub node_id: Option<String>,
        /// Viewport zoom, positive
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub zoom: Option<f64>,
        /// Viewport position
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub position: Option<Position>,
    }

    impl ShareableState {
        /// State pointing at a repository with no view details
        #[must_use]
        pub fn new(repo_url: impl Into<String>) -> Self {
            Self {
                repo_url: repo_url.into(),
                node_id: None,
                zoom: None,
                position: None,
            }
        }

        /// Whether every numeric field survives a JSON round-trip unchanged
        #[must_use]
        pub fn is_well_formed(&self) -> bool {
            let zoom_ok = self.zoom.map_or(true, |z| z.is_finite() && z > 0.0);
            let position_ok = self.position.map_or(true, |p| p.is_finite());
            zoom_ok && position_ok
        }
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Free-text note attached to a graph node, one per node id
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Annotation {
        /// Unique identifier: note:<hash of node id>
        pub id: String,
        /// Node this annotation belongs to
        pub node_id: String,
        /// Text content
        pub text: String,
        /// Text color
        pub text_color: String,
        /// Box color
        pub box_color: String,
        /// Offset from the node position
        pub offset: Position,
        /// Owning user
        pub user_id: String,
        /// First save
        pub created_at: DateTime<Utc>,
        /// Last save
        pub updated_at: DateTime<Utc>,
    }

    impl Annotation {
        /// Generate a deterministic ID for the annotation on a node
        #[must_use]
        pub fn generate_id(node_id: &str) -> String {
            let mut hasher = Sha256::new();
            hasher.update(node_id.as_bytes());
            let hash = hex::encode(hasher.finalize());
            format!("note:{}", &hash[..12])
        }
    }

    // =========================================================================
    // Raw GitHub payloads
    // =========================================================================

    /// Repository metadata (`GET /repos/{owner}/{repo}`)
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RepoMeta {
        /// Repository name
        #[serde(default)]
        pub name: String,
        /// `owner/name`
        #[serde(default)]
        pub full_name: String,
        /// Description
        #[serde(default)]
        pub description: Option<String>,
        /// Web URL
        #[serde(default)]
        pub html_url: String,
        /// Default branch
        #[serde(default)]
        pub default_branch: String,
        /// Star count
        #[serde(default)]
        pub stargazers_count: u64,
    }

    /// A GitHub Actions workflow
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Workflow {
        /// Workflow ID
        pub id: u64,
        /// Workflow name
        pub name: String,
        /// Workflow file path
        #[serde(default)]
        pub path: String,
        /// Workflow state
        #[serde(default)]
        pub state: String,
    }

    /// Author line of a commit
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CommitAuthor {
        /// Author name
        #[serde(default)]
        pub name: String,
        /// Authoring date
        #[serde(default)]
        pub date: String,
    }

    /// Git-level commit details
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CommitDetail {
        /// Commit message
        #[serde(default)]
        pub message: String,
        /// Author
        #[serde(default)]
        pub author: Option<CommitAuthor>,
    }

    /// A commit from the commit list
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Commit {
        /// Commit SHA
        pub sha: String,
        /// Commit details
        pub commit: CommitDetail,
    }

    /// A deployment, using the API's own field names
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RawDeployment {
        /// Deployment identifier
        pub id: u64,
        /// Target environment
        #[serde(default)]
        pub environment: String,
        /// Deployment state
        #[serde(default)]
        pub state: String,
        /// Creation timestamp
        #[serde(default)]
        pub created_at: String,
        /// Deployed ref
        #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
        pub git_ref: Option<String>,
    }

    /// Head commit reference of a branch
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BranchCommit {
        /// Commit SHA
        pub sha: String,
    }

    /// A branch from the branch list
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Branch {
        /// Branch name
        pub name: String,
        /// Head commit
        #[serde(default)]
        pub commit: Option<BranchCommit>,
        /// Protection flag
        #[serde(default)]
        pub protected: bool,
    }

    impl Branch {
        /// Branch with just a name
        #[must_use]
        pub fn named(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                commit: None,
                protected: false,
            }
        }
    }

    /// Everything the graph builder consumes for one repository
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RepoSnapshot {
        /// Repository metadata
        #[serde(default)]
        pub repo: RepoMeta,
        /// Actions workflows
        #[serde(default)]
        pub workflows: Vec<Workflow>,
        /// Recent commits
        #[serde(default)]
        pub commits: Vec<Commit>,
        /// Deployments
        #[serde(default)]
        pub deployments: Vec<RawDeployment>,
        /// Language name to byte count
        #[serde(default)]
        pub languages: BTreeMap<String, u64>,
        /// Branches
        #[serde(default)]
        pub branches: Vec<Branch>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
