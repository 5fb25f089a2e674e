/// Block layout over a parsed page, sized from inline styles
///
/// Every rendered element is treated as a block: it fills its container's
/// content box unless it carries an explicit `width`, and children stack
/// vertically. Only elements with an `id` are reported, since those are the
/// ones panels can address.

use std::collections::HashSet;

use scraper::{ElementRef, Html};

use crate::rendering::style::{parse_length, InlineStyle};
use crate::Viewport;

/// Default `body` margin applied by browsers
pub const BODY_MARGIN: f64 = 8.0;

const UNRENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "noscript",
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxModel {
    pub margin: f64,
    pub border: f64,
    pub padding: f64,
}

/// Border box of an element plus the edges around its content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> f64 {
        let chrome = 2.0 * (self.box_model.border + self.box_model.padding);
        (self.rect.width - chrome).max(0.0)
    }
}

/// An addressable element and its computed box
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub tag: String,
    pub lb: LayoutBox,
    /// Whether the element (or an ancestor) is not rendered
    pub hidden: bool,
}

/// Lay out `document` inside `viewport`.
///
/// Returns one node per distinct `id`, in document order. When an id repeats,
/// the first element wins, matching `getElementById`. The tree is walked with
/// an explicit stack, so nesting depth is bounded only by memory.
pub fn layout_document(document: &Html, viewport: Viewport) -> Vec<LayoutNode> {
    let mut out = Recorder::default();
    let mut stack: Vec<OpenBlock> = Vec::new();

    // Height does not constrain block layout; content simply overflows.
    if let Some(root) = open_element(document.root_element(), 0.0, 0.0, viewport.width as f64, &mut out) {
        stack.push(root);
    }

    loop {
        let Some(top) = stack.last_mut() else { break };
        match top.children.next() {
            Some(child) => {
                let (x, y, available) = (top.inner_x, top.cursor, top.content_width);
                if let Some(block) = open_element(child, x, y, available, &mut out) {
                    stack.push(block);
                }
            }
            None => {
                let Some(done) = stack.pop() else { break };
                let outer = close_block(done, &mut out);
                if let Some(parent) = stack.last_mut() {
                    parent.cursor += outer;
                }
            }
        }
    }
    out.nodes
}

#[derive(Default)]
struct Recorder {
    nodes: Vec<LayoutNode>,
    seen: HashSet<String>,
}

impl Recorder {
    fn record(&mut self, el: &ElementRef, lb: LayoutBox, hidden: bool) -> Option<usize> {
        let id = el.value().attr("id")?;
        if !self.seen.insert(id.to_string()) {
            return None;
        }
        self.nodes.push(LayoutNode {
            id: id.to_string(),
            tag: el.value().name().to_string(),
            lb,
            hidden,
        });
        Some(self.nodes.len() - 1)
    }
}

/// A rendered element whose children are still being laid out
struct OpenBlock<'a> {
    children: Box<dyn Iterator<Item = ElementRef<'a>> + 'a>,
    style: InlineStyle,
    lb: LayoutBox,
    slot: Option<usize>,
    inner_x: f64,
    content_width: f64,
    start: f64,
    cursor: f64,
}

/// Size `el` at (`x`, `y`) inside a container `available` pixels wide.
/// Unrendered subtrees are recorded as hidden and yield no open block.
fn open_element<'a>(
    el: ElementRef<'a>,
    x: f64,
    y: f64,
    available: f64,
    out: &mut Recorder,
) -> Option<OpenBlock<'a>> {
    let tag = el.value().name();
    let style = InlineStyle::parse(el.value().attr("style").unwrap_or(""));

    if style.is_hidden() || UNRENDERED_TAGS.contains(&tag) {
        for descendant in el.descendants().filter_map(ElementRef::wrap) {
            let lb = LayoutBox {
                rect: Rect { x, y, ..Rect::default() },
                box_model: BoxModel::default(),
            };
            out.record(&descendant, lb, true);
        }
        return None;
    }

    let default_margin = if tag == "body" { BODY_MARGIN } else { 0.0 };
    let margin = style.edge("margin", available).unwrap_or(default_margin);
    let padding = style.edge("padding", available).unwrap_or(0.0);
    let border = style.edge("border-width", available).unwrap_or(0.0);
    let chrome = 2.0 * (padding + border);

    let mut content_width = style
        .length("width", available)
        .unwrap_or(available - 2.0 * margin - chrome);
    if let Some(max) = style.length("max-width", available) {
        content_width = content_width.min(max);
    }
    if let Some(min) = style.length("min-width", available) {
        content_width = content_width.max(min);
    }
    let content_width = content_width.max(0.0);

    let lb = LayoutBox {
        rect: Rect {
            x: x + margin,
            y: y + margin,
            width: content_width + chrome,
            height: 0.0,
        },
        box_model: BoxModel { margin, border, padding },
    };
    let slot = out.record(&el, lb, false);

    // Children stack inside the content box.
    let start = lb.rect.y + border + padding;
    Some(OpenBlock {
        children: Box::new(el.children().filter_map(ElementRef::wrap)),
        style,
        lb,
        slot,
        inner_x: lb.rect.x + border + padding,
        content_width,
        start,
        cursor: start,
    })
}

/// Finish a block once its children are placed; returns its margin-box height.
fn close_block(block: OpenBlock, out: &mut Recorder) -> f64 {
    let OpenBlock { style, mut lb, slot, start, cursor, .. } = block;
    let chrome = 2.0 * (lb.box_model.padding + lb.box_model.border);

    // Percentage heights of auto-height containers behave as auto.
    let content_height = style
        .get("height")
        .filter(|v| !v.trim_end().ends_with('%'))
        .and_then(|v| parse_length(v, 0.0))
        .unwrap_or(cursor - start)
        .max(0.0);
    lb.rect.height = content_height + chrome;
    if let Some(i) = slot {
        out.nodes[i].lb = lb;
    }

    lb.rect.height + 2.0 * lb.box_model.margin
}
