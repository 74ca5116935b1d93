// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image configuration: automatic DPI scaling and stock icon sizing.
// Persisted as pretty-printed JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How logical images are scaled to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutoScale {
    /// Images are used at their native size.
    #[default]
    Off,
    /// Scale by `screen_dpi / 96`.
    Dpi,
    /// Scale by a fixed factor.
    Factor(f64),
}

/// Persistent image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Automatic scaling applied to images on request.
    pub auto_scale: AutoScale,
    /// Explicit stock icon size; snapped to 24, 32, or 48.
    pub stock_size: Option<u32>,
    /// Overrides the DPI reported by the screen metrics provider.
    pub screen_dpi: Option<u32>,
    /// Auto-scaled images are never shorter than this.
    pub min_auto_scale_height: u32,
    /// Scale factors within this distance of 1.0 leave images untouched.
    pub scale_tolerance: f64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            auto_scale: AutoScale::Off,
            stock_size: None,
            screen_dpi: None,
            min_auto_scale_height: 24,
            scale_tolerance: 0.01,
        }
    }
}

impl ImageConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
