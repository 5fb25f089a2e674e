//! Wavepanels
//!
//! Page-side wiring for the perlin-wave animation: size the page's rendering
//! panels to their aspect ratios and hand them to the external WebAssembly
//! module that does the actual drawing.
//!
//! # Features
//!
//! - **html** (default): measure panels from a parsed HTML page
//! - **fetch** (default): load the module over HTTP as well as from disk
//!
//! # Example
//!
//! ```
//! use wavepanels::{MemorySurfaces, PageConfig, PanelConfigBuilder, PanelSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PageConfig {
//!     panels: vec![PanelSpec::new("wave", 3.0, "#759203")],
//!     ..Default::default()
//! };
//! let mut surfaces = MemorySurfaces::new().with_surface("wave", 600.0);
//!
//! let panels = PanelConfigBuilder::new(&config).build(&mut surfaces)?;
//! assert_eq!(panels[0].height, 200.0);
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

pub mod builder;
pub mod config;
pub mod error;
pub mod handoff;
pub mod module;
pub mod page;
pub mod surface;

// Measuring panels from a parsed page
#[cfg(feature = "html")]
pub mod rendering;

pub use builder::{build_panels, round_tenth, PanelConfig, PanelConfigBuilder};
pub use config::{BuildMode, ColorDefaults, PageConfig, PanelSpec};
pub use error::{Error, Result};
pub use handoff::{JsonHandoff, ModulePanel, RenderModule, RunConfig};
pub use module::{LoadedModule, ModuleLoader, ModuleSource, WasmLoader};
pub use page::{content_ready, ContentReady, Page, ReadySignal};
pub use surface::{MemorySurface, MemorySurfaces, PresentationSurface, SurfaceLookup};

#[cfg(feature = "html")]
pub use rendering::DocumentSurfaces;

/// Viewport dimensions used when laying out a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl FromStr for Viewport {
    type Err = Error;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::ConfigError(format!("viewport '{}' is not WIDTHxHEIGHT", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| Error::ConfigError(format!("viewport '{}': {}", s, e)))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}
