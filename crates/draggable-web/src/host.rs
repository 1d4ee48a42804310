//! Document listeners, animation frames and the text-selection hack.

use crate::style::{STYLE_ELEMENT_ID, TRANSPARENT_SELECTION_CLASS, selection_stylesheet};
use draggable_core::host::{ListenerHost, UserSelectHack};
use draggable_core::modality::DragEvents;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Event};

pub(crate) type EventClosure = Closure<dyn FnMut(Event)>;

/// Routes the owning document's move/stop events to a draggable.
///
/// The closures are installed once the draggable exists, since they need a
/// handle back to it.
#[derive(Default)]
pub struct WebListenerHost {
    on_drag: RefCell<Option<EventClosure>>,
    on_stop: RefCell<Option<EventClosure>>,
}

impl WebListenerHost {
    pub(crate) fn install(&self, on_drag: EventClosure, on_stop: EventClosure) {
        *self.on_drag.borrow_mut() = Some(on_drag);
        *self.on_stop.borrow_mut() = Some(on_stop);
    }

    /// Drop the closures. Callers detach them from every document first.
    pub(crate) fn clear(&self) {
        self.on_drag.borrow_mut().take();
        self.on_stop.borrow_mut().take();
    }

    fn pairs(&self, events: DragEvents) -> [(&'static str, &RefCell<Option<EventClosure>>); 2] {
        [(events.drag, &self.on_drag), (events.stop, &self.on_stop)]
    }
}

impl ListenerHost<Document> for WebListenerHost {
    fn add_listeners(&self, document: &Document, events: DragEvents) {
        let options = AddEventListenerOptions::new();
        options.set_capture(true);
        options.set_passive(false);

        for (name, slot) in self.pairs(events) {
            let slot = slot.borrow();
            let Some(closure) = slot.as_ref() else {
                log::warn!("No handler installed for {name}");
                continue;
            };
            if let Err(err) = document.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            ) {
                log::error!("Failed to add {name} listener: {err:?}");
            }
        }
    }

    fn remove_listeners(&self, document: &Document, events: DragEvents) {
        for (name, slot) in self.pairs(events) {
            if let Some(closure) = slot.borrow().as_ref() {
                if let Err(err) = document.remove_event_listener_with_callback_and_bool(
                    name,
                    closure.as_ref().unchecked_ref(),
                    true,
                ) {
                    log::error!("Failed to remove {name} listener: {err:?}");
                }
            }
        }
    }

    fn request_animation_frame(&self, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            task();
            return;
        };
        let callback = Closure::once_into_js(move || task());
        if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {err:?}");
        }
    }
}

/// Hides text selection in a document while dragging.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebUserSelectHack;

impl WebUserSelectHack {
    fn ensure_stylesheet(document: &Document) -> Result<(), JsValue> {
        if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
            return Ok(());
        }
        let Some(head) = document.head() else {
            return Ok(());
        };
        let style = document.create_element("style")?;
        style.set_id(STYLE_ELEMENT_ID);
        style.set_attribute("type", "text/css")?;
        style.set_inner_html(&selection_stylesheet());
        head.append_child(&style)?;
        Ok(())
    }

    fn clear_selection(document: &Document) -> Result<(), JsValue> {
        let Some(window) = document.default_view().or_else(web_sys::window) else {
            return Ok(());
        };
        if let Some(selection) = window.get_selection()? {
            if selection.type_() != "Caret" {
                selection.remove_all_ranges()?;
            }
        }
        Ok(())
    }
}

impl UserSelectHack<Document> for WebUserSelectHack {
    fn enable(&self, document: &Document) {
        if let Err(err) = Self::ensure_stylesheet(document) {
            log::error!("Failed to inject selection stylesheet: {err:?}");
        }
        if let Some(body) = document.body() {
            if let Err(err) = body.class_list().add_1(TRANSPARENT_SELECTION_CLASS) {
                log::error!("Failed to disable selection: {err:?}");
            }
        }
    }

    fn disable(&self, document: &Document) {
        if let Some(body) = document.body() {
            if let Err(err) = body.class_list().remove_1(TRANSPARENT_SELECTION_CLASS) {
                log::error!("Failed to restore selection: {err:?}");
            }
        }
        if let Err(err) = Self::clear_selection(document) {
            log::debug!("Could not clear selection: {err:?}");
        }
    }
}
