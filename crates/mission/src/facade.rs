//! Re-exported APIs for consumers of the mission crate.

pub use crate::assembler::{TrajectoryAssembler, generate};
pub use crate::phases::{Motion, Phase, PhaseSequencer, step_count};
pub use crate::plan::{FlightPlan, Maneuver, PlanError};
pub use offboard_config::{FlightPlanConfig, ShapeRequest};
pub use offboard_core::{
    Direction, FlightMode, InvalidConfiguration, SampleSink, TrajectorySample,
};
pub use offboard_shapes::{Curve, Shape, ShapeCurve, ShapeKind};
