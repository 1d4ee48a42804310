//! Wiring a [`Draggable`] to a live element.

use crate::dom::WebNode;
use crate::host::{EventClosure, WebListenerHost, WebUserSelectHack};
use draggable_core::input::{MouseButton, PointerInput, Touch};
use draggable_core::{DragError, DragHandlers, Draggable, DraggableConfig, MountFlag, PositionHandle};
use kurbo::Point;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, HtmlElement, MouseEvent, TouchEvent, TouchList};

type Shared = Rc<RefCell<Draggable<WebNode>>>;

/// Engine entry point an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    MouseDown,
    TouchStart,
    MouseUp,
    TouchEnd,
    Drag,
    DragStop,
}

fn touches(list: TouchList) -> Vec<Touch> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .map(|touch| {
            Touch::new(
                touch.identifier(),
                Point::new(f64::from(touch.client_x()), f64::from(touch.client_y())),
            )
        })
        .collect()
}

/// Convert a DOM mouse or touch event into engine input.
pub fn pointer_input(event: &Event, document: &Document) -> Option<PointerInput<WebNode>> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .map(|element| WebNode::in_document(element, document.clone()));

    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        return Some(PointerInput::mouse(
            MouseButton::from_index(mouse.button()),
            Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())),
            target,
        ));
    }
    let touch = event.dyn_ref::<TouchEvent>()?;
    Some(PointerInput::touch(
        touches(touch.target_touches()),
        touches(touch.changed_touches()),
        target,
    ))
}

/// Writes the draggable's transform and classes onto its element.
#[derive(Clone)]
struct Renderer {
    element: HtmlElement,
    /// Classes the element carried before mounting.
    class_name: String,
}

impl Renderer {
    fn render(&self, draggable: &Draggable<WebNode>) {
        if let Err(err) = self
            .element
            .style()
            .set_property("transform", &draggable.transform())
        {
            log::error!("Failed to set transform: {err:?}");
        }
        self.element
            .set_class_name(&draggable.class_name(Some(&self.class_name)));
    }
}

fn dispatch(shared: &Weak<RefCell<Draggable<WebNode>>>, renderer: &Renderer, route: Route, event: &Event) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Ok(mut draggable) = shared.try_borrow_mut() else {
        log::warn!("Ignoring {} while the draggable is busy", event.type_());
        return;
    };
    let Some(document) = renderer.element.owner_document() else {
        return;
    };
    let Some(mut input) = pointer_input(event, &document) else {
        return;
    };

    let result = match route {
        Route::MouseDown => draggable.handle_mouse_down(&mut input),
        Route::TouchStart => draggable.handle_touch_start(&mut input),
        Route::MouseUp => draggable.handle_mouse_up(&input),
        Route::TouchEnd => draggable.handle_touch_end(&input),
        Route::Drag => draggable.handle_drag(&input),
        Route::DragStop => draggable.handle_drag_stop(&input),
    };
    if input.is_default_prevented() {
        event.prevent_default();
    }
    if let Err(err) = result {
        log::error!("{err}");
    }
    renderer.render(&draggable);
}

fn listener(shared: &Shared, renderer: &Renderer, route: Route) -> EventClosure {
    let shared = Rc::downgrade(shared);
    let renderer = renderer.clone();
    Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        dispatch(&shared, &renderer, route, &event);
    }))
}

fn to_js(err: DragError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A draggable bound to a DOM element.
///
/// Listens on the element for drag starts and element-level stops, and on the
/// owning document for moves while a drag is active. Dropping it removes
/// every listener.
///
/// Handlers run while the draggable is borrowed; use [`WebDraggable::update`]
/// only outside of them. To commit a controlled position from a handler,
/// write to [`WebDraggable::position_handle`].
pub struct WebDraggable {
    shared: Shared,
    host: Rc<WebListenerHost>,
    renderer: Renderer,
    mount_flag: MountFlag,
    position: PositionHandle,
    element_listeners: Vec<(&'static str, EventClosure)>,
}

impl WebDraggable {
    /// Make `element` draggable.
    pub fn mount(
        element: HtmlElement,
        config: DraggableConfig,
        handlers: DragHandlers<WebNode>,
    ) -> Result<Self, JsValue> {
        let node = WebNode::new(element.clone().into())
            .ok_or_else(|| JsValue::from_str("Draggable element has no owner document"))?;
        let host = Rc::new(WebListenerHost::default());
        let mut draggable = Draggable::new(config, handlers, host.clone(), Rc::new(WebUserSelectHack))
            .map_err(to_js)?;
        draggable.mount(node);

        let renderer = Renderer {
            class_name: element.class_name(),
            element: element.clone(),
        };
        let mount_flag = draggable.mount_flag();
        let position = draggable.position_handle();
        let shared = Rc::new(RefCell::new(draggable));
        host.install(
            listener(&shared, &renderer, Route::Drag),
            listener(&shared, &renderer, Route::DragStop),
        );

        let mut mounted = Self {
            shared,
            host,
            renderer,
            mount_flag,
            position,
            element_listeners: Vec::new(),
        };
        for (name, route) in [
            ("mousedown", Route::MouseDown),
            ("mouseup", Route::MouseUp),
            ("touchstart", Route::TouchStart),
            ("touchend", Route::TouchEnd),
        ] {
            mounted.listen(name, route)?;
        }
        mounted.render();

        log::debug!("Mounted draggable on <{}>", element.tag_name().to_lowercase());
        Ok(mounted)
    }

    fn listen(&mut self, name: &'static str, route: Route) -> Result<(), JsValue> {
        let closure = listener(&self.shared, &self.renderer, route);
        let element = &self.renderer.element;
        if route == Route::TouchStart {
            // Must be able to preventDefault to stop the page scrolling.
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            element.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
        } else {
            element.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        }
        self.element_listeners.push((name, closure));
        Ok(())
    }

    pub fn element(&self) -> &HtmlElement {
        &self.renderer.element
    }

    /// Run `f` against the draggable and re-render.
    ///
    /// Returns `None` when called from inside a drag handler.
    pub fn update<R>(&self, f: impl FnOnce(&mut Draggable<WebNode>) -> R) -> Option<R> {
        let mut draggable = self.shared.try_borrow_mut().ok()?;
        let result = f(&mut draggable);
        self.renderer.render(&draggable);
        Some(result)
    }

    /// Set the caller-owned position of a controlled draggable.
    ///
    /// Inside a drag handler the value is committed when the handler returns.
    pub fn set_position(&self, position: Option<Point>) {
        if self.update(|draggable| draggable.set_position(position)).is_none() {
            self.position.set(position);
        }
    }

    /// Shared caller-owned position, writable from drag handlers.
    pub fn position_handle(&self) -> PositionHandle {
        self.position.clone()
    }

    fn render(&self) {
        if let Ok(draggable) = self.shared.try_borrow() {
            self.renderer.render(&draggable);
        }
    }

    /// Remove every listener and end any drag in progress.
    pub fn unmount(&mut self) {
        let element = &self.renderer.element;
        for (name, closure) in self.element_listeners.drain(..) {
            if let Err(err) =
                element.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            {
                log::error!("Failed to remove {name} listener: {err:?}");
            }
        }
        match self.shared.try_borrow_mut() {
            Ok(mut draggable) => {
                draggable.unmount();
                self.host.clear();
            }
            // Inside a handler: the engine tears down when the handler returns.
            Err(_) => self.mount_flag.unmount(),
        }
    }
}

impl Drop for WebDraggable {
    fn drop(&mut self) {
        if !self.element_listeners.is_empty() {
            self.unmount();
        }
    }
}
