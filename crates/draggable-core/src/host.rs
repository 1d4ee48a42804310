//! Capabilities the engine needs from its host environment.
//!
//! The engine never touches a document directly. It asks the host to attach
//! or detach document-level listeners and to toggle the text-selection hack,
//! always passing the owning document of the dragged node so iframed nodes
//! work.

use crate::modality::{DragEvents, MOUSE_EVENTS, TOUCH_EVENTS};

/// Attaches the move/stop listeners that keep a drag alive outside the node.
pub trait ListenerHost<D> {
    /// Start routing `events.drag` and `events.stop` on `document` to the engine.
    fn add_listeners(&self, document: &D, events: DragEvents);

    /// Stop routing `events.drag` and `events.stop` on `document`.
    ///
    /// Must be a no-op for events that are not attached.
    fn remove_listeners(&self, document: &D, events: DragEvents);

    /// Run `task` before the next repaint.
    fn request_animation_frame(&self, task: Box<dyn FnOnce()>);

    /// Remove both mouse and touch listeners.
    fn remove_all_listeners(&self, document: &D) {
        self.remove_listeners(document, MOUSE_EVENTS);
        self.remove_listeners(document, TOUCH_EVENTS);
    }
}

/// Disables text selection across a document while dragging.
pub trait UserSelectHack<D> {
    fn enable(&self, document: &D);
    fn disable(&self, document: &D);
}

/// Host that does nothing; for engines driven entirely by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl<D> ListenerHost<D> for NoopHost {
    fn add_listeners(&self, _document: &D, _events: DragEvents) {}

    fn remove_listeners(&self, _document: &D, _events: DragEvents) {}

    fn request_animation_frame(&self, task: Box<dyn FnOnce()>) {
        task();
    }
}

impl<D> UserSelectHack<D> for NoopHost {
    fn enable(&self, _document: &D) {}

    fn disable(&self, _document: &D) {}
}
