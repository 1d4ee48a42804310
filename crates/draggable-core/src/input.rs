//! Normalized pointer input for mouse and touch events.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(i16),
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other),
        }
    }

    /// Whether this is the primary (usually left) button.
    pub fn is_primary(self) -> bool {
        self == MouseButton::Left
    }
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// Identifier that stays stable for the lifetime of the touch.
    pub identifier: i32,
    /// Position in viewport coordinates.
    pub client: Point,
}

impl Touch {
    pub fn new(identifier: i32, client: Point) -> Self {
        Self { identifier, client }
    }
}

/// Device-specific part of a pointer input.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerKind {
    Mouse {
        button: MouseButton,
        client: Point,
    },
    Touch {
        /// Touches still on the target element.
        target_touches: Vec<Touch>,
        /// Touches that changed in this event.
        changed_touches: Vec<Touch>,
    },
}

/// Pointer event type for unified mouse/touch handling.
///
/// `target` is the element the event was dispatched to; `None` when the
/// event did not originate from an element.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput<N> {
    pub kind: PointerKind,
    pub target: Option<N>,
    default_prevented: bool,
}

impl<N> PointerInput<N> {
    /// A mouse event at `client` (viewport coordinates).
    pub fn mouse(button: MouseButton, client: Point, target: Option<N>) -> Self {
        Self {
            kind: PointerKind::Mouse { button, client },
            target,
            default_prevented: false,
        }
    }

    /// A touch event.
    pub fn touch(target_touches: Vec<Touch>, changed_touches: Vec<Touch>, target: Option<N>) -> Self {
        Self {
            kind: PointerKind::Touch {
                target_touches,
                changed_touches,
            },
            target,
            default_prevented: false,
        }
    }

    pub fn is_touch(&self) -> bool {
        matches!(self.kind, PointerKind::Touch { .. })
    }

    /// The pressed button, for mouse input.
    pub fn button(&self) -> Option<MouseButton> {
        match self.kind {
            PointerKind::Mouse { button, .. } => Some(button),
            PointerKind::Touch { .. } => None,
        }
    }

    /// Ask the host to suppress the browser's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Identifier of the touch that started this gesture, if any.
    pub fn touch_identifier(&self) -> Option<i32> {
        match &self.kind {
            PointerKind::Mouse { .. } => None,
            PointerKind::Touch {
                target_touches,
                changed_touches,
            } => target_touches
                .first()
                .or_else(|| changed_touches.first())
                .map(|touch| touch.identifier),
        }
    }

    /// Find the touch with `identifier`, looking at target touches first.
    pub fn find_touch(&self, identifier: i32) -> Option<&Touch> {
        match &self.kind {
            PointerKind::Mouse { .. } => None,
            PointerKind::Touch {
                target_touches,
                changed_touches,
            } => target_touches
                .iter()
                .chain(changed_touches.iter())
                .find(|touch| touch.identifier == identifier),
        }
    }

    /// Viewport position for the tracked touch (or the mouse).
    ///
    /// Returns `None` when a touch is tracked but this event does not carry
    /// it; such events belong to another finger.
    pub fn client_point(&self, touch_identifier: Option<i32>) -> Option<Point> {
        if let Some(identifier) = touch_identifier {
            return self.find_touch(identifier).map(|touch| touch.client);
        }
        match &self.kind {
            PointerKind::Mouse { client, .. } => Some(*client),
            PointerKind::Touch {
                target_touches,
                changed_touches,
            } => target_touches
                .first()
                .or_else(|| changed_touches.first())
                .map(|touch| touch.client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Input = PointerInput<()>;

    #[test]
    fn test_button_from_index() {
        assert_eq!(MouseButton::from_index(0), MouseButton::Left);
        assert_eq!(MouseButton::from_index(2), MouseButton::Right);
        assert_eq!(MouseButton::from_index(4), MouseButton::Other(4));
        assert!(MouseButton::Left.is_primary());
        assert!(!MouseButton::Middle.is_primary());
    }

    #[test]
    fn test_mouse_point_ignores_touch_lookup() {
        let input = Input::mouse(MouseButton::Left, Point::new(3.0, 4.0), None);
        assert_eq!(input.client_point(None), Some(Point::new(3.0, 4.0)));
        assert_eq!(input.touch_identifier(), None);
        // A tracked touch can never match a mouse event.
        assert_eq!(input.client_point(Some(1)), None);
    }

    #[test]
    fn test_touch_identifier_prefers_target_touches() {
        let input = Input::touch(
            vec![Touch::new(7, Point::new(1.0, 1.0))],
            vec![Touch::new(9, Point::new(2.0, 2.0))],
            None,
        );
        assert_eq!(input.touch_identifier(), Some(7));

        let ended = Input::touch(vec![], vec![Touch::new(9, Point::new(2.0, 2.0))], None);
        assert_eq!(ended.touch_identifier(), Some(9));
    }

    #[test]
    fn test_touch_point_for_tracked_identifier() {
        let input = Input::touch(
            vec![Touch::new(1, Point::new(10.0, 10.0))],
            vec![Touch::new(2, Point::new(20.0, 30.0))],
            None,
        );
        assert_eq!(input.client_point(Some(2)), Some(Point::new(20.0, 30.0)));
        assert_eq!(input.client_point(Some(5)), None);
    }

    #[test]
    fn test_prevent_default() {
        let mut input = Input::touch(vec![Touch::new(1, Point::ZERO)], vec![], None);
        assert!(!input.is_default_prevented());
        input.prevent_default();
        assert!(input.is_default_prevented());
    }
}
