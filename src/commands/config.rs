// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - show the effective configuration

use super::Output;
use crate::config::Config;
use anyhow::{Context, Result};

/// Print the whole configuration, or one key of it
pub fn run(config: &Config, out: Output, key: Option<&str>) -> Result<()> {
    if out.json {
        let value = serde_json::to_value(config).context("Failed to serialize configuration")?;
        let entry = match key {
            Some(key) => value
                .get(key)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?,
            None => value,
        };
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let Some(key) = key else {
        print!("{}", config.to_toml()?);
        return Ok(());
    };

    let value = toml::Value::try_from(config).context("Failed to serialize configuration")?;
    let entry = value
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;

    match entry {
        toml::Value::String(s) => println!("{s}"),
        other => println!("{other}"),
    }
    Ok(())
}
