// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Snapshot command - saves the raw GitHub data for offline graph builds

use super::graph::{load_source, Source};
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Run the snapshot command
pub fn run(config: &Config, repo: &str, output: Option<PathBuf>) -> Result<()> {
    let snapshot = load_source(config, &Source::Repo(repo.to_string()))?;
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!(
                "Saved {} branches and {} deployments to {}",
                snapshot.branches.len(),
                snapshot.deployments.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
