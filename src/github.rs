// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! GitHub endpoints feeding the graph builder

use crate::fetch::{AuthFetch, FetchError};
use crate::types::{Branch, Commit, RawDeployment, RepoMeta, RepoSnapshot, Workflow};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

/// Public API root
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Page size for list endpoints
pub const PER_PAGE: u32 = 100;

/// A repository reference that could not be understood
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a GitHub repository reference: {0:?} (expected https://github.com/<owner>/<repo>)")]
pub struct RepoUrlError(pub String);

/// Split a repository URL into `(owner, name)`.
///
/// Accepts `https://github.com/owner/repo`, with or without scheme, a
/// trailing `.git`, a trailing slash or extra path segments, and bare
/// `owner/repo`.
pub fn parse_repo_url(input: &str) -> Result<(String, String), RepoUrlError> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    let path = match without_scheme.split_once('/') {
        Some((host, rest)) if host.eq_ignore_ascii_case("github.com")
            || host.eq_ignore_ascii_case("www.github.com") =>
        {
            rest
        }
        Some((host, _)) if host.contains('.') => return Err(RepoUrlError(input.to_string())),
        _ => without_scheme,
    };

    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
        return Err(RepoUrlError(input.to_string()));
    };
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return Err(RepoUrlError(input.to_string()));
    }

    Ok((owner.to_string(), name.to_string()))
}

#[derive(Deserialize)]
struct WorkflowList {
    #[serde(default)]
    workflows: Vec<Workflow>,
}

/// Fetch the six inputs of the graph builder for `owner/name`
pub fn fetch_snapshot(
    fetch: &AuthFetch,
    api_base: &str,
    owner: &str,
    name: &str,
) -> Result<RepoSnapshot, FetchError> {
    let base = format!("{}/repos/{}/{}", api_base.trim_end_matches('/'), owner, name);
    info!("Fetching {}/{}", owner, name);

    let repo: RepoMeta = fetch.get_json(&base)?;
    let workflows = fetch
        .get_json::<WorkflowList>(&format!("{base}/actions/workflows"))?
        .workflows;
    let commits: Vec<Commit> = fetch.get_json(&format!("{base}/commits?per_page={PER_PAGE}"))?;
    let deployments: Vec<RawDeployment> =
        fetch.get_json(&format!("{base}/deployments?per_page={PER_PAGE}"))?;
    let languages: BTreeMap<String, u64> = fetch.get_json(&format!("{base}/languages"))?;
    let branches: Vec<Branch> = fetch.get_json(&format!("{base}/branches?per_page={PER_PAGE}"))?;

    info!(
        "{}/{}: {} branches, {} deployments, {} commits, {} languages, {} workflows",
        owner,
        name,
        branches.len(),
        deployments.len(),
        commits.len(),
        languages.len(),
        workflows.len()
    );

    Ok(RepoSnapshot {
        repo,
        workflows,
        commits,
        deployments,
        languages,
        branches,
    })
}
