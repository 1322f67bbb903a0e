//! Top-level driver: request in, one full pass over a sink out.

use offboard_config::{FlightPlanConfig, ShapeRequest};
use offboard_core::{SampleSink, TrajectorySample};
use offboard_export::summary::{PhaseRecord, TrajectorySummary};
use offboard_shapes::{ShapeCurve, ShapeKind};
use tracing::info;

use crate::phases::PhaseSequencer;
use crate::plan::{FlightPlan, Maneuver, PlanError};

/// A fully validated generation run.
///
/// Construction performs every configuration check, so once an assembler
/// exists, writing it can only fail on the sink itself.
#[derive(Debug, Clone)]
pub struct TrajectoryAssembler {
    shape: ShapeKind,
    sequencer: PhaseSequencer<ShapeCurve>,
}

impl TrajectoryAssembler {
    pub fn new(request: &ShapeRequest, flight: &FlightPlanConfig) -> Result<Self, PlanError> {
        let maneuver = Maneuver::from_request(request)?;
        let plan = FlightPlan::from_config(flight)?;
        let shape = maneuver.curve.kind();
        Ok(Self {
            shape,
            sequencer: PhaseSequencer::new(plan, maneuver)?,
        })
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn sequencer(&self) -> &PhaseSequencer<ShapeCurve> {
        &self.sequencer
    }

    pub fn samples(&self) -> impl Iterator<Item = TrajectorySample> + '_ {
        self.sequencer.samples()
    }

    /// Phase breakdown for the JSON sidecar.
    pub fn summary(&self) -> TrajectorySummary {
        TrajectorySummary {
            shape: self.shape.name().to_string(),
            sample_count: self.sequencer.len(),
            total_duration_s: self.sequencer.total_duration_s(),
            entry_transit: self.sequencer.has_entry_transit(),
            phases: self
                .sequencer
                .phases()
                .iter()
                .map(|phase| PhaseRecord {
                    mode: phase.mode.tag(),
                    label: phase.mode.label().to_string(),
                    start_index: phase.start_index,
                    steps: phase.steps,
                    start_time_s: phase.start_time_s,
                    duration_s: phase.duration_s,
                })
                .collect(),
        }
    }

    /// Write the header and every sample in index order. Returns the row count.
    pub fn write_to<S: SampleSink + ?Sized>(&self, sink: &mut S) -> Result<usize, PlanError> {
        sink.write_header()?;
        let mut rows = 0;
        for sample in self.samples() {
            sink.write_sample(&sample)?;
            rows += 1;
        }
        sink.finish()?;
        info!(shape = %self.shape, rows, "trajectory written");
        Ok(rows)
    }
}

/// Validate, sequence and write in one call.
pub fn generate<S: SampleSink + ?Sized>(
    request: &ShapeRequest,
    flight: &FlightPlanConfig,
    sink: &mut S,
) -> Result<usize, PlanError> {
    TrajectoryAssembler::new(request, flight)?.write_to(sink)
}
