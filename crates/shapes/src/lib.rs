//! Shape curve library.
//!
//! Every supported shape is a pure function of the discrete step index that
//! returns the local-frame kinematic state (position offset from the shape's
//! own origin, velocity and acceleration). [`ShapeKind`] is the registry that
//! maps the wire name of a shape to the extra parameters it needs, and
//! [`ShapeKind::resolve`] turns a name plus raw parameters into a ready
//! [`Shape`].

mod polyline;
mod smooth;

use std::fmt;
use std::str::FromStr;

use offboard_core::{Direction, InvalidConfiguration, KinematicState, validate};

/// Maneuver-wide inputs shared by every shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverParams {
    /// Total time allotted to fly the shape once (seconds).
    pub maneuver_time_s: f64,
    /// Characteristic extent of the shape (metres).
    pub size_m: f64,
    pub direction: Direction,
    /// Altitude above the launch point the shape is flown at (metres, positive up).
    pub altitude_m: f64,
    pub step_time_s: f64,
}

impl ManeuverParams {
    /// Time since maneuver start at `step`.
    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.step_time_s
    }
}

/// Anything the phase sequencer can fly as its final phase.
pub trait Curve {
    /// Local-frame state at the given discrete step.
    fn sample(&self, step: usize, params: &ManeuverParams) -> KinematicState;
}

/// Shape-specific parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraParam {
    Turns,
    Points,
    EndAltitude,
}

impl ExtraParam {
    pub const ALL: [ExtraParam; 3] = [ExtraParam::Turns, ExtraParam::Points, ExtraParam::EndAltitude];

    pub const fn name(self) -> &'static str {
        match self {
            ExtraParam::Turns => "turns",
            ExtraParam::Points => "points",
            ExtraParam::EndAltitude => "end_altitude",
        }
    }
}

/// Raw, unvalidated shape-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeExtras {
    pub turns: Option<u32>,
    pub points: Option<u32>,
    pub end_altitude: Option<f64>,
}

impl ShapeExtras {
    fn is_set(&self, param: ExtraParam) -> bool {
        match param {
            ExtraParam::Turns => self.turns.is_some(),
            ExtraParam::Points => self.points.is_some(),
            ExtraParam::EndAltitude => self.end_altitude.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    EightShape,
    Circle,
    Square,
    Helix,
    HeartShape,
    InfinityShape,
    SpiralSquare,
    StarShape,
    Zigzag,
    SineWave,
}

struct RegistryEntry {
    kind: ShapeKind,
    name: &'static str,
    params: &'static [ExtraParam],
}

const REGISTRY: [RegistryEntry; 10] = [
    RegistryEntry {
        kind: ShapeKind::EightShape,
        name: "eight_shape",
        params: &[],
    },
    RegistryEntry {
        kind: ShapeKind::Circle,
        name: "circle",
        params: &[],
    },
    RegistryEntry {
        kind: ShapeKind::Square,
        name: "square",
        params: &[],
    },
    RegistryEntry {
        kind: ShapeKind::Helix,
        name: "helix",
        params: &[ExtraParam::EndAltitude, ExtraParam::Turns],
    },
    RegistryEntry {
        kind: ShapeKind::HeartShape,
        name: "heart_shape",
        params: &[],
    },
    RegistryEntry {
        kind: ShapeKind::InfinityShape,
        name: "infinity_shape",
        params: &[],
    },
    RegistryEntry {
        kind: ShapeKind::SpiralSquare,
        name: "spiral_square",
        params: &[ExtraParam::Turns],
    },
    RegistryEntry {
        kind: ShapeKind::StarShape,
        name: "star_shape",
        params: &[ExtraParam::Points],
    },
    RegistryEntry {
        kind: ShapeKind::Zigzag,
        name: "zigzag",
        params: &[ExtraParam::Turns],
    },
    RegistryEntry {
        kind: ShapeKind::SineWave,
        name: "sine_wave",
        params: &[ExtraParam::Turns],
    },
];

impl ShapeKind {
    pub fn all() -> impl Iterator<Item = ShapeKind> {
        REGISTRY.iter().map(|entry| entry.kind)
    }

    fn entry(self) -> &'static RegistryEntry {
        // rows are declared in variant order
        &REGISTRY[self as usize]
    }

    /// Wire name used in plan files and on the command line.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Extra parameters this shape requires; all others are rejected.
    pub fn extra_params(self) -> &'static [ExtraParam] {
        self.entry().params
    }

    /// Check `extras` against this shape's schema and build the curve.
    pub fn resolve(self, extras: &ShapeExtras) -> Result<Shape, InvalidConfiguration> {
        let schema = self.extra_params();
        if let Some(missing) = schema.iter().find(|param| !extras.is_set(**param)) {
            return Err(InvalidConfiguration::new(
                missing.name(),
                format!("required by shape '{}' but missing", self.name()),
            ));
        }
        if let Some(extra) = ExtraParam::ALL
            .iter()
            .find(|param| !schema.contains(*param) && extras.is_set(**param))
        {
            return Err(InvalidConfiguration::new(
                extra.name(),
                format!("not accepted by shape '{}'", self.name()),
            ));
        }

        let shape = match self {
            ShapeKind::EightShape => Shape::EightShape,
            ShapeKind::Circle => Shape::Circle,
            ShapeKind::Square => Shape::Square,
            ShapeKind::Helix => Shape::Helix {
                end_altitude: end_altitude(extras)?,
                turns: turns(extras)?,
            },
            ShapeKind::HeartShape => Shape::HeartShape,
            ShapeKind::InfinityShape => Shape::InfinityShape,
            ShapeKind::SpiralSquare => Shape::SpiralSquare {
                turns: turns(extras)?,
            },
            ShapeKind::StarShape => Shape::StarShape {
                points: points(extras)?,
            },
            ShapeKind::Zigzag => Shape::Zigzag {
                turns: turns(extras)?,
            },
            ShapeKind::SineWave => Shape::SineWave {
                turns: turns(extras)?,
            },
        };
        Ok(shape)
    }
}

impl FromStr for ShapeKind {
    type Err = InvalidConfiguration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .find(|entry| entry.name == s)
            .map(|entry| entry.kind)
            .ok_or_else(|| {
                let known: Vec<&str> = REGISTRY.iter().map(|entry| entry.name).collect();
                InvalidConfiguration::new(
                    "shape_name",
                    format!("unknown shape '{s}' (expected one of: {})", known.join(", ")),
                )
            })
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Upper bound on `turns`. Polyline shapes hold a few vertices per turn.
pub const MAX_TURNS: u32 = 1_000;

/// Upper bound on star `points`.
pub const MAX_POINTS: u32 = 1_000;

fn turns(extras: &ShapeExtras) -> Result<u32, InvalidConfiguration> {
    match extras.turns {
        Some(turns @ 1..=MAX_TURNS) => Ok(turns),
        Some(turns) => Err(InvalidConfiguration::new(
            "turns",
            format!("must be between 1 and {MAX_TURNS}, got {turns}"),
        )),
        None => Err(InvalidConfiguration::new("turns", "missing")),
    }
}

fn points(extras: &ShapeExtras) -> Result<u32, InvalidConfiguration> {
    match extras.points {
        Some(points @ 3..=MAX_POINTS) => Ok(points),
        Some(points) => Err(InvalidConfiguration::new(
            "points",
            format!("must be between 3 and {MAX_POINTS}, got {points}"),
        )),
        None => Err(InvalidConfiguration::new("points", "missing")),
    }
}

fn end_altitude(extras: &ShapeExtras) -> Result<f64, InvalidConfiguration> {
    let value = extras
        .end_altitude
        .ok_or_else(|| InvalidConfiguration::new("end_altitude", "missing"))?;
    validate::finite("end_altitude", value)
}

/// Resolve a shape by wire name in one go.
pub fn resolve(name: &str, extras: &ShapeExtras) -> Result<Shape, InvalidConfiguration> {
    name.parse::<ShapeKind>()?.resolve(extras)
}

/// A shape together with its validated extra parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    EightShape,
    Circle,
    Square,
    /// Climbs or descends linearly from the flight altitude to `end_altitude`.
    Helix { end_altitude: f64, turns: u32 },
    HeartShape,
    InfinityShape,
    SpiralSquare { turns: u32 },
    StarShape { points: u32 },
    Zigzag { turns: u32 },
    SineWave { turns: u32 },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::EightShape => ShapeKind::EightShape,
            Shape::Circle => ShapeKind::Circle,
            Shape::Square => ShapeKind::Square,
            Shape::Helix { .. } => ShapeKind::Helix,
            Shape::HeartShape => ShapeKind::HeartShape,
            Shape::InfinityShape => ShapeKind::InfinityShape,
            Shape::SpiralSquare { .. } => ShapeKind::SpiralSquare,
            Shape::StarShape { .. } => ShapeKind::StarShape,
            Shape::Zigzag { .. } => ShapeKind::Zigzag,
            Shape::SineWave { .. } => ShapeKind::SineWave,
        }
    }
}

impl Shape {
    /// Prepare the shape for sampling. Polyline paths are built here, once.
    pub fn curve(self) -> ShapeCurve {
        let path = match self {
            Shape::Square => Some(polyline::square()),
            Shape::SpiralSquare { turns } => Some(polyline::spiral_square(turns)),
            Shape::StarShape { points } => Some(polyline::star(points)),
            Shape::Zigzag { turns } => Some(polyline::zigzag(turns)),
            _ => None,
        };
        ShapeCurve { shape: self, path }
    }
}

/// A resolved shape ready to be sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCurve {
    shape: Shape,
    path: Option<polyline::Polyline>,
}

impl ShapeCurve {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

impl Curve for ShapeCurve {
    fn sample(&self, step: usize, params: &ManeuverParams) -> KinematicState {
        let t = params.time_at(step);
        let local = match self.shape {
            Shape::EightShape => smooth::eight(t, params),
            Shape::Circle => smooth::circle(t, params),
            Shape::Helix {
                end_altitude,
                turns,
            } => smooth::helix(t, params, end_altitude, turns),
            Shape::HeartShape => smooth::heart(t, params),
            Shape::InfinityShape => smooth::infinity(t, params),
            Shape::SineWave { turns } => smooth::sine_wave(t, params, turns),
            Shape::Square
            | Shape::SpiralSquare { .. }
            | Shape::StarShape { .. }
            | Shape::Zigzag { .. } => match &self.path {
                Some(path) => path.sample(t, params),
                None => KinematicState::at_rest([0.0, 0.0, -params.altitude_m]),
            },
        };
        mirror(local, params.direction)
    }
}

/// Reverse traversal mirrors the shape across the north axis.
fn mirror(mut state: KinematicState, direction: Direction) -> KinematicState {
    let sign = direction.sign();
    state.position[1] *= sign;
    state.velocity[1] *= sign;
    state.acceleration[1] *= sign;
    state
}
