//! Shared input modality: which family of events drives drags right now.
//!
//! Hybrid devices can produce both mouse and touch input. The modality that
//! most recently started (or stopped) a drag decides which document events a
//! new drag listens to. The flag is shared by every draggable on the thread,
//! which in a browser is the whole page.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Event names for one input modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragEvents {
    pub start: &'static str,
    pub drag: &'static str,
    pub stop: &'static str,
}

pub const MOUSE_EVENTS: DragEvents = DragEvents {
    start: "mousedown",
    drag: "mousemove",
    stop: "mouseup",
};

pub const TOUCH_EVENTS: DragEvents = DragEvents {
    start: "touchstart",
    drag: "touchmove",
    stop: "touchend",
};

/// Pointer family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    #[default]
    Mouse,
    Touch,
}

impl InputModality {
    /// Event names listened to while dragging with this modality.
    pub fn events(self) -> DragEvents {
        match self {
            InputModality::Mouse => MOUSE_EVENTS,
            InputModality::Touch => TOUCH_EVENTS,
        }
    }
}

thread_local! {
    static CURRENT_MODALITY: Cell<InputModality> = const { Cell::new(InputModality::Mouse) };
}

/// The modality most recently observed.
pub fn current_modality() -> InputModality {
    CURRENT_MODALITY.with(Cell::get)
}

/// Record the modality of the input that just arrived.
pub fn set_modality(modality: InputModality) {
    CURRENT_MODALITY.with(|current| {
        if current.get() != modality {
            log::debug!("Input modality switched to {:?}", modality);
            current.set(modality);
        }
    });
}
