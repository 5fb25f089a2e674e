//! Presentation surfaces and the lookup capability used to find them
//!
//! A surface is anything rectangular that can report its rendered width and
//! accept a height: a DOM element, a parsed HTML element, or an in-memory fake.

use std::collections::HashMap;

/// A measurable, stylable region a panel renders into.
pub trait PresentationSurface {
    /// Current rendered width. Unrendered surfaces report `0.0`.
    fn width(&self) -> f64;

    /// Apply a layout height to the surface.
    fn set_height(&mut self, height: f64);
}

/// Maps panel identifiers to surfaces.
pub trait SurfaceLookup {
    fn resolve(&mut self, id: &str) -> Option<&mut dyn PresentationSurface>;
}

/// In-memory surface with a fixed width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySurface {
    pub width: f64,
    /// Last height applied, if any
    pub height: Option<f64>,
    /// Number of `set_height` calls received
    pub writes: usize,
}

impl MemorySurface {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            height: None,
            writes: 0,
        }
    }
}

impl PresentationSurface for MemorySurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn set_height(&mut self, height: f64) {
        self.height = Some(height);
        self.writes += 1;
    }
}

/// A lookup over in-memory surfaces, used in tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemorySurfaces {
    surfaces: HashMap<String, MemorySurface>,
}

impl MemorySurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, id: impl Into<String>, width: f64) -> Self {
        self.insert(id, width);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, width: f64) {
        self.surfaces.insert(id.into(), MemorySurface::new(width));
    }

    pub fn get(&self, id: &str) -> Option<&MemorySurface> {
        self.surfaces.get(id)
    }

    /// Total number of height writes across every surface
    pub fn total_writes(&self) -> usize {
        self.surfaces.values().map(|s| s.writes).sum()
    }
}

impl SurfaceLookup for MemorySurfaces {
    fn resolve(&mut self, id: &str) -> Option<&mut dyn PresentationSurface> {
        self.surfaces
            .get_mut(id)
            .map(|s| s as &mut dyn PresentationSurface)
    }
}
