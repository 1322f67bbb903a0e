//! Phase sequencer: climb, holds, repositioning and shape flight stitched into
//! one globally indexed sample stream.
//!
//! The phase table is laid out once, up front, by folding a cursor (next sample
//! index, elapsed seconds) over the ordered legs. Sampling is then a pure lookup
//! per phase, so the stream can be replayed any number of times.

use offboard_core::vector::{self, Vector3};
use offboard_core::{FlightMode, InvalidConfiguration, KinematicState, TrajectorySample};
use offboard_shapes::{Curve, ManeuverParams};
use tracing::{debug, info};

use crate::plan::{FlightPlan, Maneuver};

/// Number of whole steps that fit in `duration_s`. Degenerate inputs give zero;
/// `None` when the count does not fit in a `usize`.
pub fn step_count(duration_s: f64, step_time_s: f64) -> Option<usize> {
    let steps = (duration_s / step_time_s).floor();
    if steps.is_nan() || steps <= 0.0 {
        Some(0)
    } else if steps < usize::MAX as f64 {
        Some(steps as usize)
    } else {
        None
    }
}

/// How a phase moves the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Straight line; first sample on `from`, last on `to`.
    ///
    /// `velocity` is the nominal leg velocity (`speed` along the leg). Positions
    /// are spread over `steps - 1` intervals so the leg lands on `to`, which
    /// makes the per-step displacement slightly larger than `velocity * step`
    /// whenever the step count was floored.
    Linear {
        from: Vector3,
        to: Vector3,
        velocity: Vector3,
    },
    Hold { at: Vector3 },
    /// Shape curve translated north/east by `offset`.
    Maneuver { offset: [f64; 2] },
}

/// A contiguous, mode-tagged slice of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub mode: FlightMode,
    pub start_index: usize,
    pub start_time_s: f64,
    pub duration_s: f64,
    pub steps: usize,
    pub motion: Motion,
}

impl Phase {
    /// One past the last index this phase emits.
    pub fn end_index(&self) -> usize {
        self.start_index + self.steps
    }
}

struct Leg {
    mode: FlightMode,
    duration_s: f64,
    motion: Motion,
}

impl Leg {
    fn linear(mode: FlightMode, from: Vector3, to: Vector3, speed: f64) -> Self {
        let delta = vector::sub(&to, &from);
        let distance = vector::norm(&delta);
        let velocity = if distance > 0.0 {
            delta.map(|c| c / distance * speed)
        } else {
            vector::ZERO
        };
        Self {
            mode,
            duration_s: distance / speed,
            motion: Motion::Linear { from, to, velocity },
        }
    }

    fn hold(mode: FlightMode, at: Vector3, duration_s: f64) -> Self {
        Self {
            mode,
            duration_s,
            motion: Motion::Hold { at },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PhaseCursor {
    next_index: usize,
    elapsed_s: f64,
}

impl PhaseCursor {
    fn place(
        self,
        leg: Leg,
        step_time_s: f64,
    ) -> Result<(Phase, PhaseCursor), InvalidConfiguration> {
        let too_many = || {
            let field = match leg.mode {
                FlightMode::Maneuver => "maneuver_time",
                _ => "step_time",
            };
            InvalidConfiguration::new(
                field,
                format!(
                    "too many samples: {} s of {} at {step_time_s} s per step",
                    leg.duration_s,
                    leg.mode.label()
                ),
            )
        };
        let steps = step_count(leg.duration_s, step_time_s).ok_or_else(too_many)?;
        let next_index = self.next_index.checked_add(steps).ok_or_else(too_many)?;
        let phase = Phase {
            mode: leg.mode,
            start_index: self.next_index,
            start_time_s: self.elapsed_s,
            duration_s: leg.duration_s,
            steps,
            motion: leg.motion,
        };
        let next = PhaseCursor {
            next_index,
            elapsed_s: self.elapsed_s + leg.duration_s,
        };
        Ok((phase, next))
    }
}

/// Ordered, restartable source of trajectory samples for one run.
#[derive(Debug, Clone)]
pub struct PhaseSequencer<C> {
    maneuver: Maneuver<C>,
    params: ManeuverParams,
    step_time_s: f64,
    entry: [f64; 2],
    phases: Vec<Phase>,
}

impl<C: Curve> PhaseSequencer<C> {
    /// Lay out the phase table. Fails only when the run has more samples than
    /// can be indexed.
    pub fn new(plan: FlightPlan, maneuver: Maneuver<C>) -> Result<Self, InvalidConfiguration> {
        let params = maneuver.params(&plan);
        let first = maneuver.curve.sample(0, &params);
        let entry = [first.position[0], first.position[1]];

        let hover = plan.hover_point();
        let start = plan.start_point();
        let mut legs = vec![
            Leg::linear(FlightMode::Climb, vector::ZERO, hover, plan.climb_rate_m_s),
            Leg::hold(FlightMode::HoldAltitude, hover, plan.hold_time_s),
            Leg::linear(FlightMode::TransitToStart, hover, start, plan.move_speed_m_s),
            Leg::hold(FlightMode::HoldStart, start, plan.hold_time_s),
        ];
        if entry != [0.0, 0.0] {
            let entry_point = [start[0] + entry[0], start[1] + entry[1], start[2]];
            info!(
                start_x = start[0],
                start_y = start[1],
                entry_x = entry_point[0],
                entry_y = entry_point[1],
                "maneuver entry differs from start, adding transit"
            );
            legs.push(Leg::linear(
                FlightMode::TransitToEntry,
                start,
                entry_point,
                plan.move_speed_m_s,
            ));
            legs.push(Leg::hold(FlightMode::HoldEntry, entry_point, plan.hold_time_s));
        }
        legs.push(Leg {
            mode: FlightMode::Maneuver,
            duration_s: maneuver.maneuver_time_s,
            motion: Motion::Maneuver { offset: plan.start },
        });

        let (phases, _) = legs.into_iter().try_fold(
            (Vec::with_capacity(7), PhaseCursor::default()),
            |(mut phases, cursor), leg| {
                let (phase, next) = cursor.place(leg, plan.step_time_s)?;
                debug!(
                    mode = phase.mode.tag(),
                    start_index = phase.start_index,
                    steps = phase.steps,
                    start_time_s = phase.start_time_s,
                    "phase placed"
                );
                phases.push(phase);
                Ok::<_, InvalidConfiguration>((phases, next))
            },
        )?;

        Ok(Self {
            maneuver,
            params,
            step_time_s: plan.step_time_s,
            entry,
            phases,
        })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Local position of the curve's first step, evaluated once.
    pub fn entry_offset(&self) -> [f64; 2] {
        self.entry
    }

    pub fn has_entry_transit(&self) -> bool {
        self.phases
            .iter()
            .any(|phase| phase.mode == FlightMode::TransitToEntry)
    }

    /// Total number of samples the stream yields.
    pub fn len(&self) -> usize {
        self.phases.last().map(Phase::end_index).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the real (untruncated) phase durations.
    pub fn total_duration_s(&self) -> f64 {
        self.phases.iter().map(|phase| phase.duration_s).sum()
    }

    /// Every sample in index order. Each call starts over from index zero.
    pub fn samples(&self) -> impl Iterator<Item = TrajectorySample> + '_ {
        self.phases
            .iter()
            .flat_map(move |phase| (0..phase.steps).map(move |i| self.sample(phase, i)))
    }

    fn sample(&self, phase: &Phase, i: usize) -> TrajectorySample {
        let state = match phase.motion {
            Motion::Linear { from, to, velocity } => {
                let fraction = if phase.steps > 1 {
                    i as f64 / (phase.steps - 1) as f64
                } else {
                    0.0
                };
                KinematicState {
                    position: vector::lerp(&from, &to, fraction),
                    velocity,
                    acceleration: vector::ZERO,
                }
            }
            Motion::Hold { at } => KinematicState::at_rest(at),
            Motion::Maneuver { offset } => {
                let mut state = self.maneuver.curve.sample(i, &self.params);
                state.position[0] += offset[0];
                state.position[1] += offset[1];
                state
            }
        };

        TrajectorySample {
            index: phase.start_index + i,
            time_s: phase.start_time_s + i as f64 * self.step_time_s,
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            yaw: 0.0,
            mode: phase.mode,
            led: match phase.motion {
                Motion::Maneuver { .. } => self.maneuver.led,
                _ => None,
            },
        }
    }
}
