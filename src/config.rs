// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutAxis, LayoutSpacing};

pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last mutation before a debounced save fires.
    pub save_debounce_ms: u64,
    pub axis: LayoutAxis,
    pub spacing: LayoutSpacing,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            axis: LayoutAxis::default(),
            spacing: LayoutSpacing::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&input)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConfigError, EditorConfig};
    use crate::layout::{LayoutAxis, LayoutSpacing};

    #[test]
    fn empty_object_yields_defaults() {
        let config = EditorConfig::from_json_str("{}").expect("config");
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.save_debounce(), Duration::from_millis(500));
        assert_eq!(config.axis, LayoutAxis::Downward);
        assert_eq!(config.spacing, LayoutSpacing::default());
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config = EditorConfig::from_json_str(
            r#"{"save_debounce_ms": 250, "axis": "rightward", "spacing": {"layer_gap": 60}}"#,
        )
        .expect("config");
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
        assert_eq!(config.axis, LayoutAxis::Rightward);
        assert_eq!(config.spacing.layer_gap, 60.0);
        assert_eq!(config.spacing.node_width, 220.0);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = EditorConfig::from_path("/definitely/not/here/colloquy.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("colloquy.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_axis_is_rejected() {
        assert!(matches!(
            EditorConfig::from_json_str(r#"{"axis": "sideways"}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
