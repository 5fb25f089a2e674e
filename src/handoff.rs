//! The run configuration passed to the module entry point

use std::io::Write;

use log::info;
use serde::{Deserialize, Serialize};

use crate::builder::PanelConfig;
use crate::module::LoadedModule;
use crate::{Error, Result};

/// One panel as the module reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePanel {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub color: String,
    /// Falls back to `color` when the panel has no secondary color
    pub color2: String,
}

impl From<&PanelConfig> for ModulePanel {
    fn from(p: &PanelConfig) -> Self {
        Self {
            id: p.id.clone(),
            width: p.width,
            height: p.height,
            color: p.primary_color.clone(),
            color2: p
                .secondary_color
                .clone()
                .unwrap_or_else(|| p.primary_color.clone()),
        }
    }
}

/// Argument of the module's `run` entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub bgcolor: String,
    pub panels: Vec<ModulePanel>,
}

impl RunConfig {
    pub fn new(bgcolor: impl Into<String>, panels: &[PanelConfig]) -> Self {
        Self {
            bgcolor: bgcolor.into(),
            panels: panels.iter().map(ModulePanel::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::RenderError(format!("cannot serialize run config: {}", e)))
    }
}

/// The module's entry point
pub trait RenderModule {
    fn run(&mut self, module: &LoadedModule, config: &RunConfig) -> Result<()>;
}

/// Writes the run configuration as JSON instead of starting a module.
///
/// Used by the CLI so another process (or a test) can pick the handoff up.
pub struct JsonHandoff<W: Write> {
    out: W,
}

impl<W: Write> JsonHandoff<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write(&mut self, config: &RunConfig) -> Result<()> {
        let json = config.to_json()?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> RenderModule for JsonHandoff<W> {
    fn run(&mut self, module: &LoadedModule, config: &RunConfig) -> Result<()> {
        info!(
            "handing {} panel(s) to {} (sha256 {})",
            config.panels.len(),
            module.source,
            module.short_digest()
        );
        self.write(config)
    }
}
