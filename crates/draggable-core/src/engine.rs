//! The drag engine: turns raw pointer input on one node into a
//! start → move* → stop callback sequence.
//!
//! ## Usage
//!
//! 1) Create a [`DraggableCore`] with a config and the host capabilities.
//! 2) [`DraggableCore::mount`] it on the node that should be draggable.
//! 3) Route the node's `mousedown`/`touchstart` to [`DraggableCore::handle_mouse_down`]
//!    / [`DraggableCore::handle_touch_start`] and its `mouseup`/`touchend` to
//!    [`DraggableCore::handle_mouse_up`] / [`DraggableCore::handle_touch_end`].
//! 4) While dragging the engine asks the [`ListenerHost`] to route the owning
//!    document's move/stop events to [`DraggableCore::handle_drag`] and
//!    [`DraggableCore::handle_drag_stop`].
//! 5) [`DraggableCore::unmount`] when the node goes away.
//!
//! Every phase reports to a [`CoreHandler`]; returning [`DragControl::Cancel`]
//! from `on_start` or `on_drag` ends the gesture.

use crate::config::CoreConfig;
use crate::error::{DragError, DragResult};
use crate::geometry::{LayoutNode, offset_from_container};
use crate::host::{ListenerHost, UserSelectHack};
use crate::input::PointerInput;
use crate::modality::{DragEvents, InputModality, current_modality, set_modality};
use crate::position::{DraggableData, build_core_event_data, snap_to_grid};
use kurbo::Point;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// What a callback wants the engine to do next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragControl {
    #[default]
    Continue,
    /// Abort the gesture. Advisory only for `on_stop`.
    Cancel,
}

impl DragControl {
    pub fn is_cancel(self) -> bool {
        self == DragControl::Cancel
    }
}

/// Receives the engine's lifecycle callbacks.
///
/// `event` is `None` when the engine synthesized the phase itself, e.g. the
/// stop that follows a cancelled move.
pub trait CoreHandler<N> {
    /// Called for every mousedown/touchstart before any filtering.
    fn on_mouse_down(&mut self, _event: &PointerInput<N>) {}

    fn on_start(
        &mut self,
        event: Option<&PointerInput<N>>,
        data: &DraggableData<N>,
    ) -> DragResult<DragControl>;

    fn on_drag(
        &mut self,
        event: Option<&PointerInput<N>>,
        data: &DraggableData<N>,
    ) -> DragResult<DragControl>;

    fn on_stop(
        &mut self,
        event: Option<&PointerInput<N>>,
        data: &DraggableData<N>,
    ) -> DragResult<DragControl>;
}

/// A user callback for one drag phase.
pub type DragCallback<N> = Box<dyn FnMut(Option<&PointerInput<N>>, &DraggableData<N>) -> DragControl>;

/// Closure-backed [`CoreHandler`]. Missing callbacks always continue.
pub struct DragHandlers<N> {
    mouse_down: Option<Box<dyn FnMut(&PointerInput<N>)>>,
    start: Option<DragCallback<N>>,
    drag: Option<DragCallback<N>>,
    stop: Option<DragCallback<N>>,
}

impl<N> Default for DragHandlers<N> {
    fn default() -> Self {
        Self {
            mouse_down: None,
            start: None,
            drag: None,
            stop: None,
        }
    }
}

impl<N> fmt::Debug for DragHandlers<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragHandlers")
            .field("mouse_down", &self.mouse_down.is_some())
            .field("start", &self.start.is_some())
            .field("drag", &self.drag.is_some())
            .field("stop", &self.stop.is_some())
            .finish()
    }
}

impl<N> DragHandlers<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_mouse_down(mut self, f: impl FnMut(&PointerInput<N>) + 'static) -> Self {
        self.mouse_down = Some(Box::new(f));
        self
    }

    pub fn on_start(
        mut self,
        f: impl FnMut(Option<&PointerInput<N>>, &DraggableData<N>) -> DragControl + 'static,
    ) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_drag(
        mut self,
        f: impl FnMut(Option<&PointerInput<N>>, &DraggableData<N>) -> DragControl + 'static,
    ) -> Self {
        self.drag = Some(Box::new(f));
        self
    }

    pub fn on_stop(
        mut self,
        f: impl FnMut(Option<&PointerInput<N>>, &DraggableData<N>) -> DragControl + 'static,
    ) -> Self {
        self.stop = Some(Box::new(f));
        self
    }

    pub fn has_drag(&self) -> bool {
        self.drag.is_some()
    }

    pub fn has_stop(&self) -> bool {
        self.stop.is_some()
    }

    pub(crate) fn call_mouse_down(&mut self, event: &PointerInput<N>) {
        if let Some(f) = self.mouse_down.as_mut() {
            f(event);
        }
    }

    pub(crate) fn call_start(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragControl {
        self.start.as_mut().map_or(DragControl::Continue, |f| f(event, data))
    }

    pub(crate) fn call_drag(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragControl {
        self.drag.as_mut().map_or(DragControl::Continue, |f| f(event, data))
    }

    pub(crate) fn call_stop(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragControl {
        self.stop.as_mut().map_or(DragControl::Continue, |f| f(event, data))
    }
}

impl<N> CoreHandler<N> for DragHandlers<N> {
    fn on_mouse_down(&mut self, event: &PointerInput<N>) {
        self.call_mouse_down(event);
    }

    fn on_start(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragResult<DragControl> {
        Ok(self.call_start(event, data))
    }

    fn on_drag(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragResult<DragControl> {
        Ok(self.call_drag(event, data))
    }

    fn on_stop(&mut self, event: Option<&PointerInput<N>>, data: &DraggableData<N>) -> DragResult<DragControl> {
        Ok(self.call_stop(event, data))
    }
}

/// Shared mounted flag.
///
/// Clones observe the same flag, so a callback can report that the node was
/// unmounted while the engine is still inside that callback.
#[derive(Debug, Clone, Default)]
pub struct MountFlag(Rc<Cell<bool>>);

impl MountFlag {
    pub fn is_mounted(&self) -> bool {
        self.0.get()
    }

    /// Mark the node as gone. The engine tears down once control returns to it.
    pub fn unmount(&self) {
        self.0.set(false);
    }

    fn mount(&self) {
        self.0.set(true);
    }
}

/// Walk from `node` up to `base` looking for a `selector` match.
pub fn matches_selector_and_parents_to<N: LayoutNode>(node: &N, selector: &str, base: &N) -> bool {
    let mut current = Some(node.clone());
    while let Some(node) = current {
        if node.matches(selector) {
            return true;
        }
        if node == *base {
            return false;
        }
        current = node.parent_element();
    }
    false
}

/// Drag state machine for one node.
pub struct DraggableCore<N: LayoutNode + 'static> {
    config: CoreConfig,
    offset_parent: Option<N>,
    node: Option<N>,
    mounted: MountFlag,
    dragging: bool,
    /// Position of the previous event; `None` until a drag starts.
    last: Option<Point>,
    touch_identifier: Option<i32>,
    /// Document events attached for the current drag.
    attached: Option<DragEvents>,
    listeners: Rc<dyn ListenerHost<N::Document>>,
    user_select: Rc<dyn UserSelectHack<N::Document>>,
}

impl<N: LayoutNode + 'static> fmt::Debug for DraggableCore<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableCore")
            .field("config", &self.config)
            .field("mounted", &self.mounted.is_mounted())
            .field("dragging", &self.dragging)
            .field("last", &self.last)
            .field("touch_identifier", &self.touch_identifier)
            .field("attached", &self.attached)
            .finish()
    }
}

impl<N: LayoutNode + 'static> DraggableCore<N> {
    /// Create an unmounted engine.
    pub fn new(
        config: CoreConfig,
        listeners: Rc<dyn ListenerHost<N::Document>>,
        user_select: Rc<dyn UserSelectHack<N::Document>>,
    ) -> DragResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            offset_parent: None,
            node: None,
            mounted: MountFlag::default(),
            dragging: false,
            last: None,
            touch_identifier: None,
            attached: None,
            listeners,
            user_select,
        })
    }

    /// Measure positions against `node` instead of the dragged node's offset parent.
    pub fn with_offset_parent(mut self, node: N) -> Self {
        self.offset_parent = Some(node);
        self
    }

    pub fn set_offset_parent(&mut self, node: Option<N>) {
        self.offset_parent = node;
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect from the next event.
    pub fn set_config(&mut self, config: CoreConfig) -> DragResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_mounted(&self) -> bool {
        self.node.is_some() && self.mounted.is_mounted()
    }

    /// Identifier of the touch driving the current drag.
    pub fn touch_identifier(&self) -> Option<i32> {
        self.touch_identifier
    }

    /// Position recorded by the last accepted event of the current drag.
    pub fn last_position(&self) -> Option<Point> {
        self.last
    }

    /// A handle that can mark the node unmounted from inside a callback.
    pub fn mount_flag(&self) -> MountFlag {
        self.mounted.clone()
    }

    /// Attach the engine to `node`.
    pub fn mount(&mut self, node: N) {
        if self.node.is_some() {
            self.teardown();
        }
        self.node = Some(node);
        self.mounted.mount();
    }

    /// Detach from the node, ending any drag in progress.
    pub fn unmount(&mut self) {
        self.mounted.unmount();
        self.teardown();
    }

    /// `mousedown` on the node.
    pub fn handle_mouse_down(
        &mut self,
        event: &mut PointerInput<N>,
        handler: &mut dyn CoreHandler<N>,
    ) -> DragResult<()> {
        // A touchscreen laptop can switch back to the mouse at any time.
        set_modality(InputModality::Mouse);
        self.handle_drag_start(event, handler)
    }

    /// `touchstart` on the node.
    pub fn handle_touch_start(
        &mut self,
        event: &mut PointerInput<N>,
        handler: &mut dyn CoreHandler<N>,
    ) -> DragResult<()> {
        set_modality(InputModality::Touch);
        self.handle_drag_start(event, handler)
    }

    /// `mouseup` on the node.
    pub fn handle_mouse_up(&mut self, event: &PointerInput<N>, handler: &mut dyn CoreHandler<N>) -> DragResult<()> {
        set_modality(InputModality::Mouse);
        self.handle_drag_stop(event, handler)
    }

    /// `touchend` on the node.
    pub fn handle_touch_end(&mut self, event: &PointerInput<N>, handler: &mut dyn CoreHandler<N>) -> DragResult<()> {
        set_modality(InputModality::Touch);
        self.handle_drag_stop(event, handler)
    }

    /// Idle → Dragging, for the modality the caller just set.
    fn handle_drag_start(
        &mut self,
        event: &mut PointerInput<N>,
        handler: &mut dyn CoreHandler<N>,
    ) -> DragResult<()> {
        handler.on_mouse_down(event);

        if !self.config.allow_any_click && event.button().is_some_and(|button| !button.is_primary()) {
            return Ok(());
        }

        let node = self.mounted_node("DragStart")?;

        if self.config.disabled || !self.accepts_target(event, &node) {
            return Ok(());
        }

        // After handle/cancel so scrolling still works outside the handle.
        if event.is_touch() && !self.config.allow_mobile_scroll {
            event.prevent_default();
        }

        let touch_identifier = event.touch_identifier();
        let Some(position) = self.control_position(event, touch_identifier, &node) else {
            return Ok(());
        };

        let data = build_core_event_data(position, node.clone(), self.last);
        let control = handler.on_start(Some(&*event), &data)?;
        if !self.mounted.is_mounted() {
            log::debug!("Node unmounted during drag start");
            self.teardown();
            return Ok(());
        }
        if control.is_cancel() {
            log::debug!("Drag start cancelled by handler");
            return Ok(());
        }

        let document = node.owner_document();
        if self.config.enable_user_select_hack {
            self.user_select.enable(&document);
        }

        self.dragging = true;
        self.last = Some(position);
        self.touch_identifier = touch_identifier;

        let events = current_modality().events();
        if let Some(previous) = self.attached.replace(events) {
            if previous != events {
                self.listeners.remove_listeners(&document, previous);
            }
        }
        self.listeners.add_listeners(&document, events);

        log::debug!(
            "Drag started at ({}, {}) via {}",
            position.x,
            position.y,
            events.start
        );
        Ok(())
    }

    /// Dragging → Dragging, from a document move event.
    pub fn handle_drag(&mut self, event: &PointerInput<N>, handler: &mut dyn CoreHandler<N>) -> DragResult<()> {
        if !self.dragging {
            return Ok(());
        }
        let node = self.mounted_node("Drag")?;

        let Some(mut position) = self.control_position(event, self.touch_identifier, &node) else {
            return Ok(());
        };

        if let (Some(grid), Some(last)) = (self.config.grid, self.last) {
            let delta = snap_to_grid(grid, position - last);
            if delta.x == 0.0 && delta.y == 0.0 {
                return Ok(());
            }
            position = last + delta;
        }

        let data = build_core_event_data(position, node, self.last);
        let control = handler.on_drag(Some(event), &data)?;
        if control.is_cancel() || !self.mounted.is_mounted() {
            log::debug!("Drag cancelled during move");
            return self.cancel(handler);
        }

        self.last = Some(position);
        Ok(())
    }

    /// Dragging → Idle, from a stop event.
    pub fn handle_drag_stop(&mut self, event: &PointerInput<N>, handler: &mut dyn CoreHandler<N>) -> DragResult<()> {
        if !self.dragging {
            return Ok(());
        }
        let node = self.mounted_node("DragStop")?;

        let Some(position) = self.control_position(event, self.touch_identifier, &node) else {
            return Ok(());
        };
        self.finish_drag(Some(event), position, handler)
    }

    /// End the current drag at its last known position.
    ///
    /// Runs the same stop transition as a real stop event, with a zero delta
    /// and no event attached.
    pub fn cancel(&mut self, handler: &mut dyn CoreHandler<N>) -> DragResult<()> {
        if !self.dragging {
            return Ok(());
        }
        match self.last {
            Some(last) => self.finish_drag(None, last, handler),
            None => {
                self.reset_drag();
                Ok(())
            }
        }
    }

    fn finish_drag(
        &mut self,
        event: Option<&PointerInput<N>>,
        mut position: Point,
        handler: &mut dyn CoreHandler<N>,
    ) -> DragResult<()> {
        let node = self.node.clone().ok_or(DragError::NotMounted("DragStop"))?;

        if let (Some(grid), Some(last)) = (self.config.grid, self.last) {
            position = last + snap_to_grid(grid, position - last);
        }

        let data = build_core_event_data(position, node.clone(), self.last);
        let result = handler.on_stop(event, &data);

        // The transition completes whatever the handler returned.
        let document = node.owner_document();
        if self.config.enable_user_select_hack {
            self.user_select.disable(&document);
        }
        self.reset_drag();
        if let Some(events) = self.attached.take() {
            self.listeners.remove_listeners(&document, events);
        }
        if !self.mounted.is_mounted() {
            self.teardown();
        }

        log::debug!("Drag stopped at ({}, {})", position.x, position.y);
        if result?.is_cancel() {
            log::debug!("Stop handler returned Cancel; drag already ended");
        }
        Ok(())
    }

    fn reset_drag(&mut self) {
        self.dragging = false;
        self.last = None;
        self.touch_identifier = None;
    }

    /// Release everything held for the node.
    fn teardown(&mut self) {
        if let Some(node) = self.node.take() {
            let document = node.owner_document();
            // Both modalities: a browser quirk can deliver touch events
            // during a mouse drag or vice versa.
            self.listeners.remove_all_listeners(&document);
            if self.config.enable_user_select_hack {
                let user_select = Rc::clone(&self.user_select);
                // Deferred to avoid a forced reflow during teardown.
                self.listeners
                    .request_animation_frame(Box::new(move || user_select.disable(&document)));
            }
            log::debug!("Draggable node unmounted");
        }
        self.reset_drag();
        self.attached = None;
    }

    fn mounted_node(&self, phase: &'static str) -> DragResult<N> {
        match &self.node {
            Some(node) if self.mounted.is_mounted() => Ok(node.clone()),
            _ => Err(DragError::NotMounted(phase)),
        }
    }

    fn accepts_target(&self, event: &PointerInput<N>, node: &N) -> bool {
        let Some(target) = event.target.as_ref() else {
            return false;
        };
        if let Some(handle) = self.config.handle.as_deref() {
            if !matches_selector_and_parents_to(target, handle, node) {
                return false;
            }
        }
        if let Some(cancel) = self.config.cancel.as_deref() {
            if matches_selector_and_parents_to(target, cancel, node) {
                return false;
            }
        }
        true
    }

    /// Event position in offset-container coordinates.
    fn control_position(&self, event: &PointerInput<N>, touch_identifier: Option<i32>, node: &N) -> Option<Point> {
        let client = event.client_point(touch_identifier)?;
        let container = self
            .offset_parent
            .clone()
            .or_else(|| node.offset_parent())
            .or_else(|| node.document_body());
        let scale = self.config.scale;

        Some(match container {
            Some(container) => offset_from_container(client, &container, scale),
            None => Point::new(client.x / scale, client.y / scale),
        })
    }
}

impl<N: LayoutNode + 'static> Drop for DraggableCore<N> {
    fn drop(&mut self) {
        if self.node.is_some() {
            self.unmount();
        }
    }
}
