//! Browser bindings for `draggable-core`.
//!
//! [`WebDraggable::mount`] makes an `HtmlElement` draggable: DOM mouse and
//! touch events drive the engine, and the resulting transform and state
//! classes are written back onto the element.

pub mod style;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod mount;

#[cfg(target_arch = "wasm32")]
pub use dom::WebNode;
#[cfg(target_arch = "wasm32")]
pub use host::{WebListenerHost, WebUserSelectHack};
#[cfg(target_arch = "wasm32")]
pub use mount::{WebDraggable, pointer_input};

/// Install the panic hook and route `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(level) {
        // A logger is already installed; keep it.
        log::debug!("Console logger not installed: {err}");
    }
}
