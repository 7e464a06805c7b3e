//! Interactive view state consumed by a renderer: the pan/zoom projection
//! controller for the world map and the drag-driven timeline.

pub mod map_controller;
pub mod timeline;

pub use map_controller::*;
pub use timeline::*;
