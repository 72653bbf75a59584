use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Knobs for the SVG encoder. Geometry is in canvas units, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Padding added around the drawing's extent
    pub margin: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub arrowhead_length: f64,
    pub arrowhead_angle_deg: f64,
    pub selection_color: String,
    pub hover_color: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            margin: 50.0,
            min_width: 800.0,
            min_height: 600.0,
            arrowhead_length: 10.0,
            arrowhead_angle_deg: 30.0,
            selection_color: "#2563eb".to_string(),
            hover_color: "#60a5fa".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub encode: EncodeOptions,
    /// Style given to elements created in an editor session
    pub default_color: String,
    pub default_stroke_width: f64,
    pub default_font_size: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encode: EncodeOptions::default(),
            default_color: "#000000".to_string(),
            default_stroke_width: 2.0,
            default_font_size: 16.0,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json).context("invalid config JSON")?;
        if config.default_stroke_width < 0.0 {
            anyhow::bail!(
                "defaultStrokeWidth must be non-negative, got {}",
                config.default_stroke_width
            );
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in config {}", path.display()))
    }
}
