/// Presentation surfaces backed by a parsed HTML page

use std::fmt::Write as _;

use scraper::Html;

use crate::rendering::layout::{layout_document, LayoutBox, LayoutNode};
use crate::surface::{PresentationSurface, SurfaceLookup};
use crate::Viewport;

/// An element of the page, measured by the layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSurface {
    node: LayoutNode,
    applied_height: Option<f64>,
}

impl ElementSurface {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn layout(&self) -> &LayoutBox {
        &self.node.lb
    }

    pub fn applied_height(&self) -> Option<f64> {
        self.applied_height
    }
}

impl PresentationSurface for ElementSurface {
    /// Border-box width, zero for unrendered elements.
    fn width(&self) -> f64 {
        if self.node.hidden {
            0.0
        } else {
            self.node.lb.rect.width
        }
    }

    fn set_height(&mut self, height: f64) {
        self.applied_height = Some(height);
        self.node.lb.rect.height = height;
    }
}

/// Every addressable element of a page, keyed by `id`
#[derive(Debug, Clone, Default)]
pub struct DocumentSurfaces {
    elements: Vec<ElementSurface>,
}

impl DocumentSurfaces {
    pub fn parse(html: &str, viewport: Viewport) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(&document, viewport)
    }

    pub fn from_document(document: &Html, viewport: Viewport) -> Self {
        let elements = layout_document(document, viewport)
            .into_iter()
            .map(|node| ElementSurface {
                node,
                applied_height: None,
            })
            .collect();
        Self { elements }
    }

    pub fn get(&self, id: &str) -> Option<&ElementSurface> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Heights written so far, in document order.
    pub fn applied_heights(&self) -> Vec<(&str, f64)> {
        self.elements
            .iter()
            .filter_map(|e| e.applied_height.map(|h| (e.id(), h)))
            .collect()
    }

    /// CSS rules carrying the applied heights, one per line.
    pub fn style_patch(&self) -> String {
        let mut css = String::new();
        for (id, height) in self.applied_heights() {
            let _ = writeln!(css, "#{} {{ height: {:.1}px; }}", id, height);
        }
        css
    }
}

impl SurfaceLookup for DocumentSurfaces {
    fn resolve(&mut self, id: &str) -> Option<&mut dyn PresentationSurface> {
        self.elements
            .iter_mut()
            .find(|e| e.node.id == id)
            .map(|e| e as &mut dyn PresentationSurface)
    }
}
