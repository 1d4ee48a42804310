//! Error types for drag handling.

use thiserror::Error;

/// Errors raised while configuring or driving a draggable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragError {
    /// A bounds selector did not resolve to an element.
    #[error("Bounds selector \"{0}\" could not find an element.")]
    BoundsNotFound(String),
    /// A drag phase was handled while no element was mounted.
    #[error("<DraggableCore> not mounted on {0}!")]
    NotMounted(&'static str),
    /// Grid cells must be finite and positive on both axes.
    #[error("Invalid grid cell size: ({x}, {y})")]
    InvalidGrid { x: f64, y: f64 },
    /// Scale must be finite and positive.
    #[error("Invalid scale: {0}")]
    InvalidScale(f64),
}

/// Result type for drag operations.
pub type DragResult<T> = Result<T, DragError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_message_names_selector() {
        let err = DragError::BoundsNotFound(".missing".to_string());
        assert_eq!(
            err.to_string(),
            "Bounds selector \".missing\" could not find an element."
        );
    }

    #[test]
    fn test_not_mounted_message_names_phase() {
        let err = DragError::NotMounted("DragStart");
        assert_eq!(err.to_string(), "<DraggableCore> not mounted on DragStart!");
    }
}
