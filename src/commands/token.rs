// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Token commands - manage the stored GitHub token

use super::{credentials, Output};
use crate::config::Config;
use crate::credentials::CredentialProvider;
use anyhow::Result;

/// Run token command
pub fn run(config: &Config, out: Output, action: &str, value: Option<String>) -> Result<()> {
    let store = credentials(config);

    match action {
        "set" => {
            let value = value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("Token value is required"))?;
            store.set(&value)?;
            println!("{} token in {}", out.good("Stored"), store.path().display());
        }

        "clear" | "rm" => {
            store.clear()?;
            println!("Cleared token in {}", store.path().display());
        }

        "status" => {
            let token = store.get();
            if out.json {
                let status = serde_json::json!({
                    "stored": token.is_some(),
                    "token": token.as_deref().map(mask),
                    "path": store.path(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }
            match token {
                Some(token) => println!("{} ({})", out.good("Token stored"), mask(&token)),
                None => println!("No token stored; requests are anonymous"),
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: set, clear, status", other);
        }
    }

    Ok(())
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("...{visible}")
}
