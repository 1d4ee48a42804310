//! Policy layer over [`DraggableCore`]: axis locking, bounds with slack,
//! controlled/uncontrolled position and transform output.

use crate::config::{ClassNames, CoreConfig, DraggableConfig};
use crate::engine::{CoreHandler, DragControl, DragHandlers, DraggableCore, MountFlag};
use crate::error::DragResult;
use crate::geometry::{CustomPosition, LayoutNode, PositionOffset, TransformPosition, to_transform};
use crate::host::{ListenerHost, UserSelectHack};
use crate::input::PointerInput;
use crate::position::{Axis, Bounds, DragBounds, DraggableData, build_draggable_event_data};
use kurbo::{Point, Vec2};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Position bookkeeping of one draggable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DraggableState {
    pub dragging: bool,
    /// Set on the first accepted drag start and kept afterwards.
    pub dragged: bool,
    pub x: f64,
    pub y: f64,
    /// Motion swallowed by a bound, consumed first when the drag reverses.
    pub slack_x: f64,
    pub slack_y: f64,
}

impl DraggableState {
    fn at(position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn slack(&self) -> Vec2 {
        Vec2::new(self.slack_x, self.slack_y)
    }
}

/// Converts a numeric position into unit-suffixed coordinates.
pub type CustomUnit = Box<dyn Fn(Point) -> CustomPosition>;

/// Caller-owned position of a controlled draggable.
///
/// Clones share one value, so drag handlers can commit a new position while
/// the draggable is running them. A stop handler that sets it keeps the
/// element where it was dropped.
#[derive(Debug, Clone, Default)]
pub struct PositionHandle(Rc<Cell<Option<Point>>>);

impl PositionHandle {
    pub fn new(position: Option<Point>) -> Self {
        Self(Rc::new(Cell::new(position)))
    }

    pub fn get(&self) -> Option<Point> {
        self.0.get()
    }

    pub fn set(&self, position: Option<Point>) {
        self.0.set(position);
    }
}

/// The [`CoreHandler`] that applies wrapper policy before calling user handlers.
struct DragPolicy<N> {
    axis: Axis,
    bounds: Option<DragBounds>,
    /// Numeric bounds for the drag in progress.
    resolved_bounds: Option<Bounds>,
    default_position: Point,
    position: PositionHandle,
    /// Last handle value applied to `state`.
    seen_position: Option<Point>,
    position_offset: Option<PositionOffset>,
    scale: f64,
    class_names: ClassNames,
    custom_unit: Option<CustomUnit>,
    handlers: DragHandlers<N>,
    state: DraggableState,
}

impl<N> DragPolicy<N> {
    fn is_controlled(&self) -> bool {
        self.position.get().is_some()
    }

    /// Apply a position committed through the handle since the last check.
    fn reconcile(&mut self) {
        let current = self.position.get();
        if let Some(next) = current {
            if self.seen_position != Some(next) {
                self.state.x = next.x;
                self.state.y = next.y;
            }
        }
        self.seen_position = current;
    }

    fn bounds_for(&mut self, node: &N) -> DragResult<Option<Bounds>>
    where
        N: LayoutNode,
    {
        let Some(bounds) = &self.bounds else {
            return Ok(None);
        };
        if let Some(resolved) = self.resolved_bounds {
            return Ok(Some(resolved));
        }
        let resolved = bounds.resolve(node)?;
        self.resolved_bounds = Some(resolved);
        Ok(Some(resolved))
    }

    fn end_drag(&mut self) {
        self.state.dragging = false;
        self.state.slack_x = 0.0;
        self.state.slack_y = 0.0;
        self.resolved_bounds = None;
        self.seen_position = self.position.get();
        if let Some(position) = self.seen_position {
            self.state.x = position.x;
            self.state.y = position.y;
        }
    }
}

impl<N: LayoutNode> CoreHandler<N> for DragPolicy<N> {
    fn on_mouse_down(&mut self, event: &PointerInput<N>) {
        self.handlers.call_mouse_down(event);
    }

    fn on_start(&mut self, event: Option<&PointerInput<N>>, core: &DraggableData<N>) -> DragResult<DragControl> {
        self.reconcile();
        let data = build_draggable_event_data(self.scale, self.state.position(), core);
        if self.handlers.call_start(event, &data).is_cancel() {
            return Ok(DragControl::Cancel);
        }
        self.state.dragging = true;
        self.state.dragged = true;
        self.resolved_bounds = None;
        Ok(DragControl::Continue)
    }

    fn on_drag(&mut self, event: Option<&PointerInput<N>>, core: &DraggableData<N>) -> DragResult<DragControl> {
        if !self.state.dragging {
            return Ok(DragControl::Continue);
        }
        self.reconcile();

        let mut data = build_draggable_event_data(self.scale, self.state.position(), core);
        let mut next = DraggableState {
            x: data.x,
            y: data.y,
            slack_x: 0.0,
            slack_y: 0.0,
            ..self.state
        };

        if let Some(bounds) = self.bounds_for(&data.node)? {
            let unclamped = data.position();
            let clamped = bounds.clamp(unclamped + self.state.slack());

            next.x = clamped.x;
            next.y = clamped.y;
            next.slack_x = self.state.slack_x + (unclamped.x - clamped.x);
            next.slack_y = self.state.slack_y + (unclamped.y - clamped.y);

            // Report the motion that was actually realized.
            data.x = clamped.x;
            data.y = clamped.y;
            data.delta_x = clamped.x - self.state.x;
            data.delta_y = clamped.y - self.state.y;
        }

        if self.handlers.call_drag(event, &data).is_cancel() {
            return Ok(DragControl::Cancel);
        }
        self.state = next;
        self.reconcile();
        Ok(DragControl::Continue)
    }

    fn on_stop(&mut self, event: Option<&PointerInput<N>>, core: &DraggableData<N>) -> DragResult<DragControl> {
        if !self.state.dragging {
            return Ok(DragControl::Continue);
        }
        let data = build_draggable_event_data(self.scale, self.state.position(), core);
        let control = self.handlers.call_stop(event, &data);
        self.end_drag();
        Ok(control)
    }
}

/// A draggable element: engine plus position policy.
///
/// Uncontrolled (no `position`) it keeps its own position, seeded from
/// `default_position`. Controlled, it follows [`Draggable::set_position`] or
/// its [`PositionHandle`] and snaps back to that value when a drag stops.
pub struct Draggable<N: LayoutNode + 'static> {
    core: DraggableCore<N>,
    policy: DragPolicy<N>,
}

impl<N: LayoutNode + 'static> fmt::Debug for Draggable<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draggable")
            .field("core", &self.core)
            .field("axis", &self.policy.axis)
            .field("bounds", &self.policy.bounds)
            .field("position", &self.policy.position.get())
            .field("state", &self.policy.state)
            .field("handlers", &self.policy.handlers)
            .finish()
    }
}

impl<N: LayoutNode + 'static> Draggable<N> {
    pub fn new(
        config: DraggableConfig,
        handlers: DragHandlers<N>,
        listeners: Rc<dyn ListenerHost<N::Document>>,
        user_select: Rc<dyn UserSelectHack<N::Document>>,
    ) -> DragResult<Self> {
        config.validate()?;
        let DraggableConfig {
            core,
            axis,
            bounds,
            default_position,
            position,
            position_offset,
            class_names,
        } = config;

        let policy = DragPolicy {
            axis,
            bounds,
            resolved_bounds: None,
            default_position,
            position: PositionHandle::new(position),
            seen_position: position,
            position_offset,
            scale: core.scale,
            class_names,
            custom_unit: None,
            handlers,
            state: DraggableState::at(position.unwrap_or(default_position)),
        };
        let draggable = Self {
            // The wrapper divides deltas by the scale; the engine works unscaled.
            core: DraggableCore::new(CoreConfig { scale: 1.0, ..core }, listeners, user_select)?,
            policy,
        };
        draggable.warn_if_immovable();
        Ok(draggable)
    }

    /// Measure positions against `node` instead of the element's offset parent.
    pub fn with_offset_parent(mut self, node: N) -> Self {
        self.core.set_offset_parent(Some(node));
        self
    }

    /// Render positions through `convert` instead of pixels.
    pub fn with_custom_unit(mut self, convert: impl Fn(Point) -> CustomPosition + 'static) -> Self {
        self.policy.custom_unit = Some(Box::new(convert));
        self
    }

    pub fn core(&self) -> &DraggableCore<N> {
        &self.core
    }

    pub fn mount(&mut self, node: N) {
        self.core.mount(node);
    }

    /// Tear down the engine and clear the visual state flags.
    pub fn unmount(&mut self) {
        self.core.unmount();
        self.policy.end_drag();
        self.policy.state.dragged = false;
    }

    pub fn mount_flag(&self) -> MountFlag {
        self.core.mount_flag()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.core.set_disabled(disabled);
    }

    pub fn set_handlers(&mut self, handlers: DragHandlers<N>) {
        self.policy.handlers = handlers;
        self.warn_if_immovable();
    }

    pub fn set_axis(&mut self, axis: Axis) {
        self.policy.axis = axis;
    }

    pub fn set_bounds(&mut self, bounds: Option<DragBounds>) {
        self.policy.bounds = bounds;
        self.policy.resolved_bounds = None;
    }

    pub fn set_position_offset(&mut self, offset: Option<PositionOffset>) {
        self.policy.position_offset = offset;
    }

    /// Update the caller-owned position.
    ///
    /// A changed value overwrites the internal position, even mid-drag.
    /// `None` makes the draggable uncontrolled from its current position.
    pub fn set_position(&mut self, position: Option<Point>) {
        self.policy.position.set(position);
        self.policy.reconcile();
        self.warn_if_immovable();
    }

    /// Shared handle to the caller-owned position, writable from handlers.
    pub fn position_handle(&self) -> PositionHandle {
        self.policy.position.clone()
    }

    pub fn is_controlled(&self) -> bool {
        self.policy.is_controlled()
    }

    pub fn is_dragging(&self) -> bool {
        self.policy.state.dragging
    }

    pub fn has_dragged(&self) -> bool {
        self.policy.state.dragged
    }

    pub fn state(&self) -> &DraggableState {
        &self.policy.state
    }

    /// Position to draw the element at.
    pub fn rendered_position(&self) -> Point {
        let policy = &self.policy;
        let live = !policy.is_controlled() || policy.state.dragging;
        let fallback = policy.position.get().unwrap_or(policy.default_position);

        Point::new(
            if policy.axis.can_drag_x() && live {
                policy.state.x
            } else {
                fallback.x
            },
            if policy.axis.can_drag_y() && live {
                policy.state.y
            } else {
                fallback.y
            },
        )
    }

    /// Rendered position after custom unit conversion.
    pub fn transform_position(&self) -> TransformPosition {
        let position = self.rendered_position();
        match &self.policy.custom_unit {
            Some(convert) => convert(position).into(),
            None => position.into(),
        }
    }

    /// CSS `transform` value for the element.
    pub fn transform(&self) -> String {
        to_transform(
            &self.transform_position(),
            self.policy.position_offset.as_ref(),
            self.policy.custom_unit.is_some(),
        )
    }

    /// Class attribute: `extra` followed by the base and state classes.
    pub fn class_name(&self, extra: Option<&str>) -> String {
        let names = &self.policy.class_names;
        let state = &self.policy.state;
        let mut classes: Vec<&str> = extra.into_iter().filter(|class| !class.is_empty()).collect();
        classes.push(&names.base);
        if state.dragging {
            classes.push(&names.dragging);
        }
        if state.dragged {
            classes.push(&names.dragged);
        }
        classes.join(" ")
    }

    pub fn handle_mouse_down(&mut self, event: &mut PointerInput<N>) -> DragResult<()> {
        self.core.handle_mouse_down(event, &mut self.policy)
    }

    pub fn handle_touch_start(&mut self, event: &mut PointerInput<N>) -> DragResult<()> {
        self.core.handle_touch_start(event, &mut self.policy)
    }

    pub fn handle_mouse_up(&mut self, event: &PointerInput<N>) -> DragResult<()> {
        self.core.handle_mouse_up(event, &mut self.policy)
    }

    pub fn handle_touch_end(&mut self, event: &PointerInput<N>) -> DragResult<()> {
        self.core.handle_touch_end(event, &mut self.policy)
    }

    /// Document move event.
    pub fn handle_drag(&mut self, event: &PointerInput<N>) -> DragResult<()> {
        self.core.handle_drag(event, &mut self.policy)
    }

    /// Document stop event.
    pub fn handle_drag_stop(&mut self, event: &PointerInput<N>) -> DragResult<()> {
        self.core.handle_drag_stop(event, &mut self.policy)
    }

    /// End the current drag where it is.
    pub fn cancel(&mut self) -> DragResult<()> {
        self.core.cancel(&mut self.policy)
    }

    /// A controlled draggable without drag or stop handlers reverts every move.
    pub fn is_immovable(&self) -> bool {
        self.policy.is_controlled() && !self.policy.handlers.has_drag() && !self.policy.handlers.has_stop()
    }

    fn warn_if_immovable(&self) {
        if self.is_immovable() {
            log::warn!(
                "A `position` was applied to this draggable without drag handlers. \
                 This will make it effectively undraggable. Attach `on_drag` or `on_stop` \
                 handlers so you can adjust the `position` of this element."
            );
        }
    }
}
