//! Position math: bounds clamping, grid snapping, axis checks and event data.

use crate::error::{DragError, DragResult};
use crate::geometry::{LayoutNode, inner_height, inner_width, outer_height, outer_width};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Shorthand that bounds a node by its parent element.
pub const PARENT_BOUNDS: &str = "parent";

/// Limits on the position of a dragged node. Missing sides are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

impl Bounds {
    /// Bounds with all four sides set.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
        }
    }

    /// Clamp a point into these bounds.
    ///
    /// Right/bottom are applied before left/top, so when the box is
    /// inverted (right < left) the left/top side wins.
    pub fn clamp(&self, point: Point) -> Point {
        let mut x = point.x;
        let mut y = point.y;

        if let Some(right) = self.right {
            x = x.min(right);
        }
        if let Some(bottom) = self.bottom {
            y = y.min(bottom);
        }

        if let Some(left) = self.left {
            x = x.max(left);
        }
        if let Some(top) = self.top {
            y = y.max(top);
        }

        Point::new(x, y)
    }
}

/// How a draggable is bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoundsRepr", into = "BoundsRepr")]
pub enum DragBounds {
    /// Fixed numeric bounds.
    Box(Bounds),
    /// The node's parent element.
    Parent,
    /// The first element in the owning document matching a selector.
    Selector(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BoundsRepr {
    Box(Bounds),
    Named(String),
}

impl From<BoundsRepr> for DragBounds {
    fn from(repr: BoundsRepr) -> Self {
        match repr {
            BoundsRepr::Box(bounds) => DragBounds::Box(bounds),
            BoundsRepr::Named(name) if name == PARENT_BOUNDS => DragBounds::Parent,
            BoundsRepr::Named(selector) => DragBounds::Selector(selector),
        }
    }
}

impl From<DragBounds> for BoundsRepr {
    fn from(bounds: DragBounds) -> Self {
        match bounds {
            DragBounds::Box(bounds) => BoundsRepr::Box(bounds),
            DragBounds::Parent => BoundsRepr::Named(PARENT_BOUNDS.to_string()),
            DragBounds::Selector(selector) => BoundsRepr::Named(selector),
        }
    }
}

impl From<Bounds> for DragBounds {
    fn from(bounds: Bounds) -> Self {
        DragBounds::Box(bounds)
    }
}

impl DragBounds {
    /// Resolve into numeric bounds for `node`, reading live layout.
    pub fn resolve<N: LayoutNode>(&self, node: &N) -> DragResult<Bounds> {
        let bound_node = match self {
            DragBounds::Box(bounds) => return Ok(*bounds),
            DragBounds::Parent => node
                .parent_element()
                .ok_or_else(|| DragError::BoundsNotFound(PARENT_BOUNDS.to_string()))?,
            DragBounds::Selector(selector) => node
                .query_selector(selector)
                .ok_or_else(|| DragError::BoundsNotFound(selector.clone()))?,
        };

        let node_margin = node.box_edges().margin;
        let bound_padding = bound_node.box_edges().padding;
        let offset_left = node.offset_left();
        let offset_top = node.offset_top();

        Ok(Bounds {
            left: Some(-offset_left + bound_padding.x0 + node_margin.x0),
            top: Some(-offset_top + bound_padding.y0 + node_margin.y0),
            right: Some(
                inner_width(&bound_node) - outer_width(node) - offset_left + bound_padding.x1
                    - node_margin.x1,
            ),
            bottom: Some(
                inner_height(&bound_node) - outer_height(node) - offset_top + bound_padding.y1
                    - node_margin.y1,
            ),
        })
    }
}

/// Clamp `(x, y)` into `bounds`, resolving shorthand bounds against `node`.
///
/// With no bounds the point is returned unchanged.
pub fn resolve_bounds<N: LayoutNode>(
    bounds: Option<&DragBounds>,
    node: &N,
    point: Point,
) -> DragResult<Point> {
    match bounds {
        Some(bounds) => Ok(bounds.resolve(node)?.clamp(point)),
        None => Ok(point),
    }
}

/// Grid cell size per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Grid {
    pub x: f64,
    pub y: f64,
}

impl Grid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both cells are finite and positive.
    pub fn validate(&self) -> DragResult<()> {
        let valid = |cell: f64| cell.is_finite() && cell > 0.0;
        if valid(self.x) && valid(self.y) {
            Ok(())
        } else {
            Err(DragError::InvalidGrid {
                x: self.x,
                y: self.y,
            })
        }
    }
}

impl From<[f64; 2]> for Grid {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Grid> for [f64; 2] {
    fn from(grid: Grid) -> Self {
        [grid.x, grid.y]
    }
}

/// Round a pending delta to whole grid cells.
///
/// Snapping is applied to motion, not to absolute position, so alignment is
/// relative to where the drag started.
pub fn snap_to_grid(grid: Grid, pending: Vec2) -> Vec2 {
    Vec2::new(
        (pending.x / grid.x).round() * grid.x,
        (pending.y / grid.y).round() * grid.y,
    )
}

/// Axes a draggable may render motion on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Both,
    X,
    Y,
    None,
}

/// A single coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    X,
    Y,
}

/// Whether `axis` permits motion along `dimension`.
pub fn can_drag_axis(axis: Axis, dimension: Dimension) -> bool {
    match (axis, dimension) {
        (Axis::Both, _) => true,
        (Axis::X, Dimension::X) | (Axis::Y, Dimension::Y) => true,
        _ => false,
    }
}

impl Axis {
    pub fn can_drag_x(self) -> bool {
        can_drag_axis(self, Dimension::X)
    }

    pub fn can_drag_y(self) -> bool {
        can_drag_axis(self, Dimension::Y)
    }
}

/// Data handed to every drag callback.
///
/// `node` is a handle to the dragged element; the host owns the element.
#[derive(Debug, Clone, PartialEq)]
pub struct DraggableData<N> {
    pub node: N,
    pub x: f64,
    pub y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub last_x: f64,
    pub last_y: f64,
}

impl<N> DraggableData<N> {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn delta(&self) -> Vec2 {
        Vec2::new(self.delta_x, self.delta_y)
    }

    pub fn last_position(&self) -> Point {
        Point::new(self.last_x, self.last_y)
    }
}

/// Build the engine's event data for a position.
///
/// Without a previous position (the drag is just starting) the deltas are
/// zero and `last` equals the current position.
pub fn build_core_event_data<N>(position: Point, node: N, last: Option<Point>) -> DraggableData<N> {
    let last = last.unwrap_or(position);
    DraggableData {
        node,
        x: position.x,
        y: position.y,
        delta_x: position.x - last.x,
        delta_y: position.y - last.y,
        last_x: last.x,
        last_y: last.y,
    }
}

/// Rescale engine deltas and apply them to the draggable's own position.
pub fn build_draggable_event_data<N: Clone>(
    scale: f64,
    base: Point,
    core: &DraggableData<N>,
) -> DraggableData<N> {
    let delta_x = core.delta_x / scale;
    let delta_y = core.delta_y / scale;
    DraggableData {
        node: core.node.clone(),
        x: base.x + delta_x,
        y: base.y + delta_y,
        delta_x,
        delta_y,
        last_x: base.x,
        last_y: base.y,
    }
}
