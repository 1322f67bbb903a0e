//! Core kinematic types and shared primitives for the offboard shape planner workspace.
//!
//! Positions use a local NED frame anchored at the launch point: x points north,
//! y points east and z points down, so altitude shows up as a negative z.

pub mod jet;

pub use jet::Jet;

use std::fmt;
use std::io;

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres, m/s or m/s² depending on context.
    pub type Vector3 = [f64; 3];

    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Point a fraction `f` of the way from `a` to `b`.
    #[inline]
    pub fn lerp(a: &Vector3, b: &Vector3, f: f64) -> Vector3 {
        add(a, &scale(&sub(b, a), f))
    }
}

use vector::Vector3;

/// Rejected input, naming the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid configuration for `{field}`: {reason}")]
pub struct InvalidConfiguration {
    pub field: String,
    pub reason: String,
}

impl InvalidConfiguration {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Field validation helpers shared by the shape library and the mission planner.
pub mod validate {
    use super::InvalidConfiguration;

    pub fn finite(field: &str, value: f64) -> Result<f64, InvalidConfiguration> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(InvalidConfiguration::new(
                field,
                format!("must be a finite number, got {value}"),
            ))
        }
    }

    pub fn positive(field: &str, value: f64) -> Result<f64, InvalidConfiguration> {
        if finite(field, value)? > 0.0 {
            Ok(value)
        } else {
            Err(InvalidConfiguration::new(
                field,
                format!("must be greater than zero, got {value}"),
            ))
        }
    }

    pub fn non_negative(field: &str, value: f64) -> Result<f64, InvalidConfiguration> {
        if finite(field, value)? >= 0.0 {
            Ok(value)
        } else {
            Err(InvalidConfiguration::new(
                field,
                format!("must not be negative, got {value}"),
            ))
        }
    }
}

/// Traversal sense of a shape. `Forward` flies clockwise as seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// `+1.0` for forward, `-1.0` for reverse.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = InvalidConfiguration;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Reverse),
            other => Err(InvalidConfiguration::new(
                "direction",
                format!("must be 1 or -1, got {other}"),
            )),
        }
    }
}

/// Phase tag carried by every sample and consumed by the offboard controller.
///
/// Tags 80, 90 and 100 (end hold, return, landing) are reserved by the consumer
/// and never produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightMode {
    Climb,
    HoldAltitude,
    TransitToStart,
    HoldStart,
    TransitToEntry,
    HoldEntry,
    Maneuver,
}

impl FlightMode {
    pub const ALL: [FlightMode; 7] = [
        FlightMode::Climb,
        FlightMode::HoldAltitude,
        FlightMode::TransitToStart,
        FlightMode::HoldStart,
        FlightMode::TransitToEntry,
        FlightMode::HoldEntry,
        FlightMode::Maneuver,
    ];

    /// Integer tag written to the `mode` column.
    pub const fn tag(self) -> u16 {
        match self {
            FlightMode::Climb => 10,
            FlightMode::HoldAltitude => 20,
            FlightMode::TransitToStart => 30,
            FlightMode::HoldStart => 40,
            FlightMode::TransitToEntry => 50,
            FlightMode::HoldEntry => 60,
            FlightMode::Maneuver => 70,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FlightMode::Climb => "climb",
            FlightMode::HoldAltitude => "hold_altitude",
            FlightMode::TransitToStart => "transit_to_start",
            FlightMode::HoldStart => "hold_start",
            FlightMode::TransitToEntry => "transit_to_entry",
            FlightMode::HoldEntry => "hold_entry",
            FlightMode::Maneuver => "maneuver",
        }
    }
}

impl TryFrom<u16> for FlightMode {
    type Error = u16;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        FlightMode::ALL
            .into_iter()
            .find(|mode| mode.tag() == tag)
            .ok_or(tag)
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.tag())
    }
}

/// Position, velocity and acceleration at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
}

impl KinematicState {
    /// Stationary state at `position`.
    pub fn at_rest(position: Vector3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// One row of the waypoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Global, gapless row index.
    pub index: usize,
    pub time_s: f64,
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub yaw: f64,
    pub mode: FlightMode,
    /// RGB colour, only set while the shape is being flown.
    pub led: Option<[f64; 3]>,
}

/// Consumer of the ordered sample stream.
pub trait SampleSink {
    fn write_header(&mut self) -> io::Result<()>;

    fn write_sample(&mut self, sample: &TrajectorySample) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SampleSink for Vec<TrajectorySample> {
    fn write_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_sample(&mut self, sample: &TrajectorySample) -> io::Result<()> {
        self.push(*sample);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tags_round_trip_through_u16() {
        for mode in FlightMode::ALL {
            assert_eq!(FlightMode::try_from(mode.tag()), Ok(mode));
        }
        assert_eq!(FlightMode::try_from(80), Err(80));
    }

    #[test]
    fn direction_accepts_only_unit_signs() {
        assert_eq!(Direction::try_from(1), Ok(Direction::Forward));
        assert_eq!(Direction::try_from(-1), Ok(Direction::Reverse));
        let err = Direction::try_from(0).unwrap_err();
        assert_eq!(err.field, "direction");
    }

    #[test]
    fn validators_name_the_field() {
        let err = validate::positive("step_time", 0.0).unwrap_err();
        assert_eq!(err.field, "step_time");
        assert!(validate::non_negative("hold_time", 0.0).is_ok());
        assert!(validate::finite("start_x", f64::NAN).is_err());
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        let a = [0.0, 0.0, -10.0];
        let b = [4.0, -2.0, -10.0];
        assert_eq!(vector::lerp(&a, &b, 0.0), a);
        assert_eq!(vector::lerp(&a, &b, 1.0), b);
        assert_eq!(vector::norm(&[3.0, 4.0, 0.0]), 5.0);
    }
}
