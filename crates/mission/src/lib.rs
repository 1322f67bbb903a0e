//! Mission crate: turns a shape request and a flight plan into the full waypoint stream.

pub mod assembler;
pub mod phases;
pub mod plan;

pub use facade::*;
pub use offboard_shapes as shapes;

mod facade;
