// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Node annotations, at most one per node id

use crate::types::{Annotation, Position};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const STORE_FILE: &str = "annotations.json";

/// Default text color for new annotations
pub const DEFAULT_TEXT_COLOR: &str = "#1f2937";
/// Default box color for new annotations
pub const DEFAULT_BOX_COLOR: &str = "#fef08a";

/// Editable part of an annotation
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    /// Text content
    pub text: String,
    /// Text color
    pub text_color: String,
    /// Box color
    pub box_color: String,
    /// Offset from the node position
    pub offset: Position,
    /// Author
    pub user_id: String,
}

impl AnnotationDraft {
    /// Draft with default colors and no offset
    #[must_use]
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            box_color: DEFAULT_BOX_COLOR.to_string(),
            offset: Position::default(),
            user_id: user_id.into(),
        }
    }
}

impl From<&Annotation> for AnnotationDraft {
    fn from(annotation: &Annotation) -> Self {
        Self {
            text: annotation.text.clone(),
            text_color: annotation.text_color.clone(),
            box_color: annotation.box_color.clone(),
            offset: annotation.offset,
            user_id: annotation.user_id.clone(),
        }
    }
}

/// Whether an upsert created or replaced an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// First save for the node
    Created,
    /// Existing annotation edited
    Updated,
}

/// Annotations persisted as `annotations.json` in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    #[serde(default)]
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    /// Load the store from `dir`, empty if the file does not exist yet
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(STORE_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save the store to `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        let path = dir.join(STORE_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize annotations")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Create the annotation for `node_id`, or edit the existing one.
    ///
    /// Edits keep the original id, owner and creation time.
    pub fn upsert(&mut self, node_id: &str, draft: AnnotationDraft) -> Upsert {
        let now = Utc::now();
        if let Some(existing) = self.annotations.iter_mut().find(|a| a.node_id == node_id) {
            existing.text = draft.text;
            existing.text_color = draft.text_color;
            existing.box_color = draft.box_color;
            existing.offset = draft.offset;
            existing.updated_at = now;
            return Upsert::Updated;
        }

        self.annotations.push(Annotation {
            id: Annotation::generate_id(node_id),
            node_id: node_id.to_string(),
            text: draft.text,
            text_color: draft.text_color,
            box_color: draft.box_color,
            offset: draft.offset,
            user_id: draft.user_id,
            created_at: now,
            updated_at: now,
        });
        Upsert::Created
    }

    /// Delete the annotation on `node_id`
    pub fn remove(&mut self, node_id: &str) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.node_id == node_id)?;
        Some(self.annotations.remove(index))
    }

    /// Annotation on `node_id`
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.node_id == node_id)
    }

    /// All annotations in creation order
    #[must_use]
    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }
}
