// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod annotate;
pub mod completions;
pub mod config;
pub mod graph;
pub mod share;
pub mod snapshot;
pub mod token;

use crate::config::Config;
use crate::credentials::FileCredentials;
use crate::fetch::{AuthFailure, AuthFetch, ReqwestTransport};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

/// How command output is rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// ANSI colors enabled
    pub color: bool,
    /// Machine-readable JSON instead of text
    pub json: bool,
}

impl Output {
    /// Emphasised heading
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Positive status
    #[must_use]
    pub fn good(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Muted detail
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Token prompt on the controlling terminal; declines when stdin is not one
pub fn terminal_prompt(failure: AuthFailure) -> Option<String> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return None;
    }

    let reason = match failure {
        AuthFailure::Unauthorized => "GitHub rejected the stored token.",
        AuthFailure::RateLimited => "GitHub API rate limit exceeded.",
    };
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "{reason} Enter a personal access token (input is visible, empty to skip): ");
    let _ = stderr.flush();

    let mut line = String::new();
    stdin.lock().read_line(&mut line).ok()?;
    let token = line.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Token store configured for this invocation
#[must_use]
pub fn credentials(config: &Config) -> FileCredentials {
    FileCredentials::new(&config.token_file)
}

/// Fetch wrapper over the real API, prompting on the terminal
pub fn api_client(config: &Config) -> Result<AuthFetch> {
    let transport = ReqwestTransport::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("Failed to create HTTP client")?;

    Ok(AuthFetch::new(transport, Arc::new(credentials(config)))
        .with_prompt(terminal_prompt)
        .with_max_reauth(config.max_reauth_attempts))
}
