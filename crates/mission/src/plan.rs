//! Validated runtime forms of the plan-file records.

use offboard_config::{FlightPlanConfig, ShapeRequest};
use offboard_core::vector::Vector3;
use offboard_core::{Direction, InvalidConfiguration, validate};
use offboard_shapes::{ManeuverParams, ShapeCurve, ShapeExtras, ShapeKind};

/// Top-level planning error.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    InvalidConfiguration(#[from] InvalidConfiguration),
    #[error("failed to write trajectory: {0}")]
    Sink(#[from] std::io::Error),
}

/// Flight plan with every field range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPlan {
    /// North/east offset of the shape origin from the launch point (m).
    pub start: [f64; 2],
    pub initial_altitude_m: f64,
    pub climb_rate_m_s: f64,
    pub move_speed_m_s: f64,
    pub hold_time_s: f64,
    pub step_time_s: f64,
}

impl FlightPlan {
    pub fn from_config(config: &FlightPlanConfig) -> Result<Self, InvalidConfiguration> {
        Ok(Self {
            start: [
                validate::finite("start_x", config.start_x)?,
                validate::finite("start_y", config.start_y)?,
            ],
            initial_altitude_m: validate::positive("initial_altitude", config.initial_altitude)?,
            climb_rate_m_s: validate::positive("climb_rate", config.climb_rate)?,
            move_speed_m_s: validate::positive("move_speed", config.move_speed)?,
            hold_time_s: validate::non_negative("hold_time", config.hold_time)?,
            step_time_s: validate::positive("step_time", config.step_time)?,
        })
    }

    /// Directly above the launch point at flight altitude.
    pub fn hover_point(&self) -> Vector3 {
        [0.0, 0.0, -self.initial_altitude_m]
    }

    /// Shape origin at flight altitude.
    pub fn start_point(&self) -> Vector3 {
        [self.start[0], self.start[1], -self.initial_altitude_m]
    }
}

/// The shape-flight phase: a curve plus how it is flown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maneuver<C> {
    pub curve: C,
    pub size_m: f64,
    pub direction: Direction,
    pub maneuver_time_s: f64,
    pub led: Option<[f64; 3]>,
}

impl<C> Maneuver<C> {
    pub fn new(curve: C, size_m: f64, direction: Direction, maneuver_time_s: f64) -> Self {
        Self {
            curve,
            size_m,
            direction,
            maneuver_time_s,
            led: None,
        }
    }

    pub fn params(&self, plan: &FlightPlan) -> ManeuverParams {
        ManeuverParams {
            maneuver_time_s: self.maneuver_time_s,
            size_m: self.size_m,
            direction: self.direction,
            altitude_m: plan.initial_altitude_m,
            step_time_s: plan.step_time_s,
        }
    }
}

impl Maneuver<ShapeCurve> {
    /// Resolve and validate a shape request. The shape name is checked first.
    pub fn from_request(request: &ShapeRequest) -> Result<Self, InvalidConfiguration> {
        let kind: ShapeKind = request.shape_name.parse()?;
        let shape = kind.resolve(&ShapeExtras {
            turns: request.turns,
            points: request.points,
            end_altitude: request.end_altitude,
        })?;
        let direction = Direction::try_from(request.direction)?;
        let size_m = validate::positive("diameter", request.diameter)?;
        let maneuver_time_s = validate::positive("maneuver_time", request.maneuver_time)?;
        let led = match request.led {
            Some(rgb) if rgb.iter().all(|c| c.is_finite()) => Some(rgb),
            Some(rgb) => {
                return Err(InvalidConfiguration::new(
                    "led",
                    format!("colour components must be finite, got {rgb:?}"),
                ));
            }
            None => None,
        };

        Ok(Self {
            led,
            ..Self::new(shape.curve(), size_m, direction, maneuver_time_s)
        })
    }
}
