// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Annotation commands - attach notes to graph nodes

use super::Output;
use crate::annotations::{AnnotationDraft, AnnotationStore, Upsert};
use crate::config::Config;
use anyhow::{Context, Result};

/// Arguments for `annotate set`
#[derive(Debug, Clone, Default)]
pub struct AnnotateArgs {
    /// Text content
    pub text: Option<String>,
    /// Text color
    pub text_color: Option<String>,
    /// Box color
    pub box_color: Option<String>,
    /// Offset x
    pub dx: Option<f64>,
    /// Offset y
    pub dy: Option<f64>,
    /// Author
    pub user: Option<String>,
}

/// Run annotate command
pub fn run(config: &Config, out: Output, action: &str, node: Option<String>, args: AnnotateArgs) -> Result<()> {
    let data_dir = &config.data_dir;
    let mut store = AnnotationStore::load(data_dir)
        .with_context(|| format!("Failed to load annotations from {}", data_dir.display()))?;

    match action {
        "set" | "add" | "edit" => {
            let node = node.ok_or_else(|| anyhow::anyhow!("Node ID is required"))?;
            let user = args
                .user
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "anonymous".to_string());

            // Edits start from the stored annotation; only given flags change it.
            let mut draft = match store.get(&node) {
                Some(existing) => AnnotationDraft::from(existing),
                None if args.text.is_some() => AnnotationDraft::new(String::new(), user),
                None => anyhow::bail!("--text is required for a new annotation"),
            };
            if let Some(text) = args.text {
                draft.text = text;
            }
            if let Some(color) = args.text_color {
                draft.text_color = color;
            }
            if let Some(color) = args.box_color {
                draft.box_color = color;
            }
            if let Some(dx) = args.dx {
                draft.offset.x = dx;
            }
            if let Some(dy) = args.dy {
                draft.offset.y = dy;
            }

            let outcome = store.upsert(&node, draft);
            store.save(data_dir)?;

            match outcome {
                Upsert::Created => println!("{} annotation on {}", out.good("Created"), node),
                Upsert::Updated => println!("{} annotation on {}", out.good("Updated"), node),
            }
        }

        "remove" | "delete" | "rm" => {
            let node = node.ok_or_else(|| anyhow::anyhow!("Node ID is required"))?;
            if store.remove(&node).is_some() {
                store.save(data_dir)?;
                println!("Removed annotation on {}", node);
            } else {
                println!("No annotation on {}", node);
            }
        }

        "list" | "ls" => {
            let annotations: Vec<_> = match &node {
                Some(node) => store.get(node).into_iter().collect(),
                None => store.list().iter().collect(),
            };

            if out.json {
                println!("{}", serde_json::to_string_pretty(&annotations)?);
                return Ok(());
            }

            if annotations.is_empty() {
                println!("No annotations. Use 'repograph annotate set <node> --text ...' to add one.");
                return Ok(());
            }

            println!("{}", out.heading(&format!("Annotations ({}):", annotations.len())));
            for annotation in annotations {
                println!(
                    "  {} {} {}",
                    annotation.node_id,
                    annotation.text,
                    out.dim(&format!("({}, {})", annotation.user_id, annotation.updated_at.format("%Y-%m-%d %H:%M")))
                );
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: set, remove, list", other);
        }
    }

    Ok(())
}
