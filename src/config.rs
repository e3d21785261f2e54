// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Defaults, then an optional TOML file, then `REPOGRAPH_*` environment
//! variables, later sources winning.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fetch::DEFAULT_MAX_REAUTH;
use crate::github::DEFAULT_API_BASE;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "REPOGRAPH";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hyperpolymath", "repograph")
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for persistent data (annotations)
    pub data_dir: PathBuf,
    /// JSON file holding the API token
    pub token_file: PathBuf,
    /// GitHub REST API root
    pub api_base: String,
    /// Origin that share links point at
    pub share_origin: String,
    /// User-Agent sent to the API
    pub user_agent: String,
    /// Token prompts allowed per request
    pub max_reauth_attempts: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let dirs = project_dirs();
        Self {
            data_dir: dirs
                .as_ref()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".repograph")),
            token_file: dirs
                .as_ref()
                .map(|d| d.config_dir().join("credentials.json"))
                .unwrap_or_else(|| PathBuf::from(".repograph/credentials.json")),
            api_base: DEFAULT_API_BASE.to_string(),
            share_origin: "http://localhost:3000".to_string(),
            user_agent: format!("repograph/{}", env!("CARGO_PKG_VERSION")),
            max_reauth_attempts: DEFAULT_MAX_REAUTH,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Default location of the configuration file
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist; the default path is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(default) = default_path() {
                builder = builder.add_source(config::File::from(default.as_path()).required(false));
            }
        }
    }

    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}
