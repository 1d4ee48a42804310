//! Configuration records for the engine and the draggable wrapper.
//!
//! Both records deserialize with every field optional, falling back to the
//! defaults below. Callbacks, the offset parent node and custom unit
//! conversion are not data and are set on the engine/wrapper directly.

use crate::error::{DragError, DragResult};
use crate::geometry::PositionOffset;
use crate::position::{Axis, DragBounds, Grid};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Options for [`DraggableCore`](crate::DraggableCore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Accept drags started with any mouse button, not only the primary one.
    pub allow_any_click: bool,
    /// Let touch drags scroll the page instead of calling `preventDefault`.
    pub allow_mobile_scroll: bool,
    /// Ignore every drag start while set.
    pub disabled: bool,
    /// Disable text selection across the document while dragging.
    pub enable_user_select_hack: bool,
    /// Divisor applied to pointer coordinates (for scaled containers).
    pub scale: f64,
    /// Snap incremental motion to this cell size.
    pub grid: Option<Grid>,
    /// Selector a drag must start on (the target or one of its ancestors).
    pub handle: Option<String>,
    /// Selector a drag must not start on.
    pub cancel: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            allow_any_click: false,
            allow_mobile_scroll: false,
            disabled: false,
            enable_user_select_hack: true,
            scale: 1.0,
            grid: None,
            handle: None,
            cancel: None,
        }
    }
}

impl CoreConfig {
    /// Reject grids and scales the position math cannot use.
    pub fn validate(&self) -> DragResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(DragError::InvalidScale(self.scale));
        }
        if let Some(grid) = self.grid {
            grid.validate()?;
        }
        Ok(())
    }
}

/// Class names toggled on a draggable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub base: String,
    pub dragging: String,
    pub dragged: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            base: "draggable".to_string(),
            dragging: "draggable-dragging".to_string(),
            dragged: "draggable-dragged".to_string(),
        }
    }
}

/// Options for [`Draggable`](crate::Draggable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraggableConfig {
    #[serde(flatten)]
    pub core: CoreConfig,
    /// Axes whose motion is rendered.
    pub axis: Axis,
    /// Limits on the rendered position.
    pub bounds: Option<DragBounds>,
    /// Starting position when uncontrolled.
    pub default_position: Point,
    /// Caller-owned position; setting it makes the draggable controlled.
    pub position: Option<Point>,
    /// Extra translate applied regardless of drag state.
    pub position_offset: Option<PositionOffset>,
    pub class_names: ClassNames,
}

impl Default for DraggableConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            axis: Axis::Both,
            bounds: None,
            default_position: Point::ZERO,
            position: None,
            position_offset: None,
            class_names: ClassNames::default(),
        }
    }
}

impl DraggableConfig {
    pub fn validate(&self) -> DragResult<()> {
        self.core.validate()
    }

    /// Whether the caller owns the position.
    pub fn is_controlled(&self) -> bool {
        self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Length;

    #[test]
    fn test_core_defaults() {
        let config = CoreConfig::default();
        assert!(!config.allow_any_click);
        assert!(!config.disabled);
        assert!(config.enable_user_select_hack);
        assert!((config.scale - 1.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: DraggableConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DraggableConfig::default());
        assert!(!config.is_controlled());
    }

    #[test]
    fn test_parse_full_config() {
        let config: DraggableConfig = serde_json::from_str(
            r#"{
                "axis": "x",
                "bounds": "parent",
                "grid": [25, 25],
                "handle": ".handle",
                "scale": 2,
                "position": {"x": 10, "y": 20},
                "position_offset": {"x": "-50%", "y": 4}
            }"#,
        )
        .unwrap();

        assert_eq!(config.axis, Axis::X);
        assert_eq!(config.bounds, Some(DragBounds::Parent));
        assert_eq!(config.core.grid, Some(Grid::new(25.0, 25.0)));
        assert_eq!(config.core.handle.as_deref(), Some(".handle"));
        assert!((config.core.scale - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.position, Some(Point::new(10.0, 20.0)));
        assert!(config.is_controlled());
        let offset = config.position_offset.unwrap();
        assert_eq!(offset.x, Length::Css("-50%".to_string()));
        assert_eq!(offset.y, Length::Px(4.0));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let config = CoreConfig {
            scale: 0.0,
            ..CoreConfig::default()
        };
        assert_eq!(config.validate(), Err(DragError::InvalidScale(0.0)));
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let config = CoreConfig {
            grid: Some(Grid::new(10.0, -1.0)),
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(DragError::InvalidGrid { .. })));
    }
}
