// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewer configuration.
//!
//! Settings come from an optional YAML file. Every field has a default, so
//! a file only needs the values it changes:
//!
//! ```yaml
//! brush:
//!   initial: 30
//! zoom:
//!   max: 4.0
//! ```

use crate::error::ConfigError;
use crate::models::fog::MAX_BRUSH_RADIUS;
use crate::util::geometry::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "fogmap.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    /// Height of the floor tab band above the map.
    pub tab_height: f32,
    pub tab_width: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            tab_height: 40.0,
            tab_width: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    /// Relative change per zoom step (0.1 = 10%).
    pub step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 3.0,
            step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub initial: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            initial: 20,
            min: 5,
            max: 50,
            step: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    /// Tileable fog image. Solid fog is used when it is missing.
    pub texture: Option<PathBuf>,
    /// Alpha multiplied into the texture's own alpha.
    pub overlay_alpha: u8,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            texture: Some(PathBuf::from("cloud_fog.png")),
            overlay_alpha: 180,
        }
    }
}

/// All viewer settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub zoom: ZoomConfig,
    pub brush: BrushConfig,
    pub fog: FogConfig,
}

impl ViewerConfig {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, `fogmap.yaml` in the working
    /// directory is used if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    log::debug!("No {} found, using default settings", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Reject bounds that cannot be honoured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.max && zoom.max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min <= max, got [{}, {}]",
                zoom.min, zoom.max
            )));
        }
        if !(zoom.step > 0.0 && zoom.step.is_finite()) {
            return Err(ConfigError::Invalid(format!("zoom step must be positive, got {}", zoom.step)));
        }

        let brush = &self.brush;
        if brush.min == 0 || brush.min > brush.max {
            return Err(ConfigError::Invalid(format!(
                "brush bounds must satisfy 0 < min <= max, got [{}, {}]",
                brush.min, brush.max
            )));
        }
        if brush.max > MAX_BRUSH_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "brush max {} exceeds the largest supported radius {}",
                brush.max, MAX_BRUSH_RADIUS
            )));
        }
        if !(brush.min..=brush.max).contains(&brush.initial) {
            return Err(ConfigError::Invalid(format!(
                "initial brush {} is outside [{}, {}]",
                brush.initial, brush.min, brush.max
            )));
        }

        let window = &self.window;
        if window.width <= 0.0 || window.height <= 0.0 || window.tab_height < 0.0 || window.tab_width <= 0.0 {
            return Err(ConfigError::Invalid("window sizes must be positive".to_string()));
        }
        Ok(())
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.zoom.min,
            max: self.zoom.max,
            step: self.zoom.step,
        }
    }
}
