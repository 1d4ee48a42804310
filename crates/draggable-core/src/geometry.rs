//! Box metrics, container-relative coordinates and CSS translate serialization.
//!
//! Everything here is a pure function of a node's live layout, read through
//! the [`LayoutNode`] trait so the same math runs against a browser DOM or an
//! in-memory layout tree.

use kurbo::{Insets, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit appended to numeric translate coordinates.
pub const DEFAULT_UNIT: &str = "px";

/// Computed border, padding and margin widths of a node.
///
/// `x0`/`y0`/`x1`/`y1` are the left/top/right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxEdges {
    pub border: Insets,
    pub padding: Insets,
    pub margin: Insets,
}

impl Default for BoxEdges {
    fn default() -> Self {
        Self {
            border: Insets::ZERO,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
        }
    }
}

/// Layout queries a host element must answer.
///
/// Implementors are cheap handles (the host owns the element); equality is
/// element identity.
pub trait LayoutNode: Clone + PartialEq {
    /// Handle to the document that owns the node (may be an iframe document).
    type Document: Clone + 'static;

    /// The document this node belongs to.
    fn owner_document(&self) -> Self::Document;
    /// Width of the padding box.
    fn client_width(&self) -> f64;
    /// Height of the padding box.
    fn client_height(&self) -> f64;
    /// Left offset relative to the offset parent, margin included.
    fn offset_left(&self) -> f64;
    /// Top offset relative to the offset parent, margin included.
    fn offset_top(&self) -> f64;
    /// Current scroll position of the node's content.
    fn scroll_offset(&self) -> Vec2;
    /// Border box in viewport coordinates.
    fn bounding_client_rect(&self) -> Rect;
    /// Computed border, padding and margin widths.
    fn box_edges(&self) -> BoxEdges;
    /// Parent element, if any.
    fn parent_element(&self) -> Option<Self>;
    /// Nearest positioned ancestor, if any.
    fn offset_parent(&self) -> Option<Self>;
    /// Body of the owning document.
    fn document_body(&self) -> Option<Self>;
    /// Whether this node is its document's body.
    fn is_document_body(&self) -> bool;
    /// Whether this node matches a CSS selector.
    fn matches(&self, selector: &str) -> bool;
    /// First element in the owning document matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self>;
}

/// Border-box width without margin.
///
/// Margin is left out on purpose: `offset_left` already includes it.
pub fn outer_width<N: LayoutNode>(node: &N) -> f64 {
    let edges = node.box_edges();
    node.client_width() + edges.border.x0 + edges.border.x1
}

/// Border-box height without margin.
pub fn outer_height<N: LayoutNode>(node: &N) -> f64 {
    let edges = node.box_edges();
    node.client_height() + edges.border.y0 + edges.border.y1
}

/// Content-box width.
pub fn inner_width<N: LayoutNode>(node: &N) -> f64 {
    let edges = node.box_edges();
    node.client_width() - edges.padding.x0 - edges.padding.x1
}

/// Content-box height.
pub fn inner_height<N: LayoutNode>(node: &N) -> f64 {
    let edges = node.box_edges();
    node.client_height() - edges.padding.y0 - edges.padding.y1
}

/// Convert a viewport point into `container` coordinates, divided by `scale`.
///
/// The document body is treated as sitting at the viewport origin.
pub fn offset_from_container<N: LayoutNode>(client: Point, container: &N, scale: f64) -> Point {
    let origin = if container.is_document_body() {
        Point::ZERO
    } else {
        container.bounding_client_rect().origin()
    };
    let scroll = container.scroll_offset();

    Point::new(
        (client.x + scroll.x - origin.x) / scale,
        (client.y + scroll.y - origin.y) / scale,
    )
}

/// A CSS length used for the fixed position offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    /// Pixels; serialized with the default unit.
    Px(f64),
    /// Any CSS length or percentage, used verbatim (e.g. `"50%"`, `"2em"`).
    Css(String),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(value) => write!(f, "{}{}", Number(*value), DEFAULT_UNIT),
            Length::Css(value) => f.write_str(value),
        }
    }
}

/// Fixed translate term applied regardless of drag state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOffset {
    pub x: Length,
    pub y: Length,
}

/// Position already converted into unit-suffixed strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPosition {
    pub x: String,
    pub y: String,
}

/// The position a transform is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformPosition {
    Numeric(Point),
    Custom(CustomPosition),
}

impl From<Point> for TransformPosition {
    fn from(point: Point) -> Self {
        Self::Numeric(point)
    }
}

impl From<CustomPosition> for TransformPosition {
    fn from(position: CustomPosition) -> Self {
        Self::Custom(position)
    }
}

/// Serialize a position into a CSS `transform` value.
///
/// With `raw_unit` set the coordinates are written verbatim; otherwise
/// [`DEFAULT_UNIT`] is appended. An `offset` is prepended as a second
/// `translate` term.
pub fn to_transform(
    position: &TransformPosition,
    offset: Option<&PositionOffset>,
    raw_unit: bool,
) -> String {
    let unit = if raw_unit { "" } else { DEFAULT_UNIT };
    let translation = match position {
        TransformPosition::Numeric(point) => {
            format!("translate({}{unit},{}{unit})", Number(point.x), Number(point.y))
        }
        TransformPosition::Custom(custom) => {
            format!("translate({}{unit},{}{unit})", custom.x, custom.y)
        }
    };

    match offset {
        Some(offset) => format!("translate({}, {}){}", offset.x, offset.y, translation),
        None => translation,
    }
}

/// Formats a coordinate the way CSS expects: no trailing `.0`, no `-0`.
struct Number(f64);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
