//! Page measurement: inline styles, block layout, and the HTML-backed
//! surface lookup built on top of them.

pub mod document;
pub mod layout;
pub mod style;

pub use document::{DocumentSurfaces, ElementSurface};
pub use layout::{layout_document, BoxModel, LayoutBox, LayoutNode, Rect};
