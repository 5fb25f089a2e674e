//! Page configuration: background color, color defaults and panel specs
//!
//! A [`PageConfig`] is built once (from JSON or in code), validated, and then
//! passed by reference to everything that needs it. Nothing mutates it after
//! validation.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Background color used when a page config does not name one
pub const DEFAULT_BGCOLOR: &str = "#222";

/// Module location used by production builds
pub const PRODUCTION_MODULE_PATH: &str = "wasm/perlin-wave/perlin-wave_bg.wasm";

/// Static description of one rendering panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSpec {
    /// Identifier of the presentation surface this panel draws into
    pub id: String,
    /// Width divided by height
    #[serde(alias = "ratio")]
    pub aspect_ratio: f64,
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, alias = "color2", skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

impl PanelSpec {
    pub fn new(id: impl Into<String>, aspect_ratio: f64, primary_color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aspect_ratio,
            primary_color: Some(primary_color.into()),
            secondary_color: None,
        }
    }

    /// A spec that takes its colors from the page defaults
    pub fn uncolored(id: impl Into<String>, aspect_ratio: f64) -> Self {
        Self {
            id: id.into(),
            aspect_ratio,
            primary_color: None,
            secondary_color: None,
        }
    }

    pub fn with_secondary(mut self, color: impl Into<String>) -> Self {
        self.secondary_color = Some(color.into());
        self
    }

    /// Pick this panel's colors, falling back to page defaults per field.
    pub fn resolve_colors(&self, defaults: &ColorDefaults) -> Result<(String, Option<String>)> {
        let primary = self
            .primary_color
            .clone()
            .or_else(|| defaults.primary_color.clone())
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "panel '{}' has no primary color and the page sets no default",
                    self.id
                ))
            })?;
        let secondary = self
            .secondary_color
            .clone()
            .or_else(|| defaults.secondary_color.clone());
        Ok((primary, secondary))
    }
}

/// Page-level colors applied to panels that leave them out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorDefaults {
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, alias = "color2", skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

/// Which build of the page is running; decides where the module lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Module path for this mode. Development builds let the loader use its
    /// own default location.
    pub fn module_path(&self) -> Option<&'static str> {
        match self {
            BuildMode::Development => None,
            BuildMode::Production => Some(PRODUCTION_MODULE_PATH),
        }
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            other => Err(Error::ConfigError(format!("unknown build mode '{}'", other))),
        }
    }
}

/// Complete configuration for one page load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,
    #[serde(default)]
    pub defaults: ColorDefaults,
    #[serde(default)]
    pub panels: Vec<PanelSpec>,
    #[serde(default)]
    pub mode: BuildMode,
    /// Explicit module location; overrides the mode's path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

fn default_bgcolor() -> String {
    DEFAULT_BGCOLOR.to_string()
}

impl Default for PageConfig {
    /// The stock perlin-wave page: a thin control strip above the wave panel.
    fn default() -> Self {
        Self {
            bgcolor: default_bgcolor(),
            defaults: ColorDefaults::default(),
            panels: vec![
                PanelSpec::new("control", 15.0, "#c0e822"),
                PanelSpec::new("wave", 3.0, "#759203"),
            ],
            mode: BuildMode::default(),
            module: None,
        }
    }
}

impl PageConfig {
    /// Parse and validate a JSON page config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    /// Check every panel eagerly so bad ratios never reach the arithmetic.
    ///
    /// Colors are not checked here: a panel whose surface never resolves is
    /// allowed to have none. The builder checks colors of panels it emits.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for panel in &self.panels {
            if panel.id.trim().is_empty() {
                return Err(Error::ConfigError("panel id must not be empty".into()));
            }
            if !seen.insert(panel.id.as_str()) {
                return Err(Error::ConfigError(format!("duplicate panel id '{}'", panel.id)));
            }
            validate_aspect_ratio(&panel.id, panel.aspect_ratio)?;
        }
        Ok(())
    }

    /// Where to load the module from, if anywhere other than the loader default.
    pub fn module_location(&self) -> Option<&str> {
        self.module.as_deref().or_else(|| self.mode.module_path())
    }
}

pub(crate) fn validate_aspect_ratio(id: &str, ratio: f64) -> Result<()> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "panel '{}' has aspect ratio {}; it must be a positive number",
            id, ratio
        )))
    }
}
