// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph command - builds the repository graph and writes it out

use super::{api_client, Output};
use crate::config::Config;
use crate::github::{fetch_snapshot, parse_repo_url};
use crate::graph::{build_graph, language_shares, RepoGraph};
use crate::types::{NodeData, RepoSnapshot};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Graphviz DOT format
    Dot,
    /// Nodes and edges as JSON
    Json,
    /// Human-readable overview
    Summary,
}

impl GraphFormat {
    /// Parse format from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "json" => Some(Self::Json),
            "summary" | "text" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// Where the graph inputs come from
#[derive(Debug, Clone)]
pub enum Source {
    /// Fetch live from GitHub
    Repo(String),
    /// Read a snapshot saved by `repograph snapshot`
    Snapshot(PathBuf),
}

/// Run the graph command
pub fn run(
    config: &Config,
    out: Output,
    source: Source,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = GraphFormat::parse(format).ok_or_else(|| {
        anyhow::anyhow!("Unknown graph format: {}. Supported: dot, json, summary", format)
    })?;
    let format = if out.json { GraphFormat::Json } else { format };

    let snapshot = load_source(config, &source)?;
    let graph = build_graph(&snapshot);

    for dangling in graph.validate() {
        warn!("edge {} points at missing node {}", dangling.edge_id, dangling.missing);
    }
    info!("Built graph with {} nodes and {} edges", graph.node_count(), graph.edge_count());

    let content = match format {
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Json => graph.to_json()?,
        GraphFormat::Summary => summary(out, &snapshot, &graph),
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Wrote graph to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

/// Resolve a [`Source`] into builder inputs
pub fn load_source(config: &Config, source: &Source) -> Result<RepoSnapshot> {
    match source {
        Source::Repo(url) => {
            let (owner, name) = parse_repo_url(url)?;
            let fetch = api_client(config)?;
            fetch_snapshot(&fetch, &config.api_base, &owner, &name)
                .with_context(|| format!("Failed to fetch {owner}/{name}"))
        }
        Source::Snapshot(path) => read_snapshot(path),
    }
}

fn read_snapshot(path: &Path) -> Result<RepoSnapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn summary(out: Output, snapshot: &RepoSnapshot, graph: &RepoGraph) -> String {
    let mut text = String::new();
    let title = if snapshot.repo.full_name.is_empty() {
        "repository"
    } else {
        snapshot.repo.full_name.as_str()
    };
    let _ = writeln!(
        text,
        "{} ({} nodes, {} edges)",
        out.heading(title),
        graph.node_count(),
        graph.edge_count()
    );

    for node in &graph.nodes {
        let detail = match &node.data {
            NodeData::Branch(b) if b.protected => "protected".to_string(),
            NodeData::Deployment(d) => format!("{} {} {}", d.environment, d.status, d.date),
            _ => String::new(),
        };
        let _ = writeln!(
            text,
            "  {:<14} {:<10} {} {}",
            node.id,
            node.kind().code(),
            node.data.label(),
            out.dim(detail.trim())
        );
    }

    let shares = language_shares(&snapshot.languages);
    if !shares.is_empty() {
        let languages: Vec<String> = shares
            .iter()
            .map(|(name, share)| format!("{name} {share:.1}%"))
            .collect();
        let _ = writeln!(text, "  languages: {}", languages.join(", "));
    }

    text
}
