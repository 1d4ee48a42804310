//! Draggable core: the drag state machine and position pipeline.
//!
//! [`DraggableCore`] turns pointer input on one node into start/move/stop
//! callbacks. [`Draggable`] layers axis locking, bounds, grid snapping and
//! controlled positioning on top and produces a CSS transform for the host to
//! apply. Layout queries and document listeners go through the
//! [`LayoutNode`], [`ListenerHost`] and [`UserSelectHack`] traits, so the same
//! code drives a browser DOM or an in-memory tree.

pub mod config;
pub mod draggable;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod input;
pub mod modality;
pub mod position;

#[cfg(test)]
mod testing;

pub use config::{ClassNames, CoreConfig, DraggableConfig};
pub use draggable::{CustomUnit, Draggable, DraggableState, PositionHandle};
pub use engine::{CoreHandler, DragCallback, DragControl, DragHandlers, DraggableCore, MountFlag};
pub use error::{DragError, DragResult};
pub use geometry::{BoxEdges, CustomPosition, LayoutNode, Length, PositionOffset, TransformPosition};
pub use host::{ListenerHost, NoopHost, UserSelectHack};
pub use input::{MouseButton, PointerInput, PointerKind, Touch};
pub use modality::{DragEvents, InputModality};
pub use position::{Axis, Bounds, DragBounds, DraggableData, Grid};

/// Re-export kurbo for downstream users.
pub use kurbo;
