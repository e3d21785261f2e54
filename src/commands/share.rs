// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Share command - create and open share links

use super::Output;
use crate::config::Config;
use crate::share;
use crate::types::{Position, ShareableState};
use anyhow::Result;

/// View details to pack into a link
#[derive(Debug, Clone, Default)]
pub struct ShareArgs {
    /// Selected node
    pub node: Option<String>,
    /// Viewport zoom
    pub zoom: Option<f64>,
    /// Viewport x
    pub x: Option<f64>,
    /// Viewport y
    pub y: Option<f64>,
    /// Print only the token
    pub token_only: bool,
}

/// Run share command
pub fn run(config: &Config, out: Output, action: &str, input: Option<String>, args: ShareArgs) -> Result<()> {
    match action {
        "create" | "encode" => {
            let repo_url = input.ok_or_else(|| anyhow::anyhow!("Repository URL is required"))?;

            let position = match (args.x, args.y) {
                (Some(x), Some(y)) => Some(Position::new(x, y)),
                (None, None) => None,
                _ => anyhow::bail!("--x and --y must be given together"),
            };

            let state = ShareableState {
                repo_url,
                node_id: args.node,
                zoom: args.zoom,
                position,
            };

            if args.token_only {
                println!("{}", share::encode(&state)?);
            } else {
                println!("{}", share::create_shareable_url(&config.share_origin, &state)?);
            }
        }

        "open" | "decode" => {
            let input = input.ok_or_else(|| anyhow::anyhow!("Share link or token is required"))?;
            let Some(state) = share::from_url(&input) else {
                anyhow::bail!("No shared view state could be restored from the link");
            };
            print_state(out, &state)?;
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: create, open", other);
        }
    }

    Ok(())
}

fn print_state(out: Output, state: &ShareableState) -> Result<()> {
    if out.json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!("{} {}", out.heading("repo:"), state.repo_url);
    if let Some(node) = &state.node_id {
        println!("  node: {node}");
    }
    if let Some(zoom) = state.zoom {
        println!("  zoom: {zoom}");
    }
    if let Some(position) = state.position {
        println!("  position: {}, {}", position.x, position.y);
    }
    Ok(())
}
