//! Offboard shape planner.
//!
//! Generates time-stamped NED waypoint tables that take a multicopter from the
//! ground, through a fixed sequence of transit and hold phases, into a
//! parameterised aerial figure. The heavy lifting lives in the workspace
//! crates; this facade lets the binaries and integration tests reach them
//! through one import.

pub use offboard_config as config;
pub use offboard_core as model;
pub use offboard_export as export;
pub use offboard_mission as mission;
pub use offboard_shapes as shapes;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
