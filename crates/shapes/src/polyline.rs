//! Straight-segment shapes flown at constant speed along their perimeter.

use std::f64::consts::PI;

use offboard_core::KinematicState;

use crate::ManeuverParams;

/// Inner/outer radius ratio of a regular five-pointed star, used for every star.
const STAR_INNER_RATIO: f64 = 0.381_966;

/// Unit headings in clockwise order: north, east, south, west.
const HEADINGS: [[f64; 2]; 4] = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];

/// Path through unit-size vertices; scaled by the maneuver size when sampled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Polyline {
    vertices: Vec<[f64; 2]>,
    /// Arc length from the first vertex to each vertex.
    cumulative: Vec<f64>,
}

impl Polyline {
    fn open(vertices: Vec<[f64; 2]>) -> Self {
        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut run = 0.0;
        cumulative.push(run);
        for pair in vertices.windows(2) {
            run += (pair[1][0] - pair[0][0]).hypot(pair[1][1] - pair[0][1]);
            cumulative.push(run);
        }
        Self {
            vertices,
            cumulative,
        }
    }

    fn closed(mut vertices: Vec<[f64; 2]>) -> Self {
        if let Some(&first) = vertices.first() {
            vertices.push(first);
        }
        Self::open(vertices)
    }

    #[cfg(test)]
    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// State after flying for `t` seconds, covering the whole path in the maneuver time.
    pub(crate) fn sample(&self, t: f64, params: &ManeuverParams) -> KinematicState {
        let z = -params.altitude_m;
        let scale = params.size_m;
        let unit_length = self.length();
        let start = self.vertices.first().copied().unwrap_or([0.0, 0.0]);
        if unit_length <= 0.0 || self.vertices.len() < 2 {
            return KinematicState::at_rest([start[0] * scale, start[1] * scale, z]);
        }

        let speed = unit_length * scale / params.maneuver_time_s;
        let s = (speed * t / scale).clamp(0.0, unit_length);
        // first vertex strictly past `s`, so the segment before it has positive length
        let past = self.cumulative.partition_point(|&c| c <= s);
        let i = past.saturating_sub(1).min(self.vertices.len() - 2);
        let (a, b) = (self.vertices[i], self.vertices[i + 1]);
        let len = self.cumulative[i + 1] - self.cumulative[i];
        if len <= 0.0 {
            return KinematicState::at_rest([b[0] * scale, b[1] * scale, z]);
        }

        let f = ((s - self.cumulative[i]) / len).min(1.0);
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        KinematicState {
            position: [(a[0] + dx * f) * scale, (a[1] + dy * f) * scale, z],
            velocity: [dx / len * speed, dy / len * speed, 0.0],
            acceleration: [0.0, 0.0, 0.0],
        }
    }
}

/// Unit square centred on the origin, starting at its north-west corner.
pub(crate) fn square() -> Polyline {
    let h = 0.5;
    Polyline::closed(vec![[h, -h], [h, h], [-h, h], [-h, -h]])
}

/// Square spiral growing outward from the origin, one leg per heading change.
pub(crate) fn spiral_square(turns: u32) -> Polyline {
    let legs = 4 * turns as usize;
    let unit = 1.0 / (2.0 * f64::from(turns));
    let mut vertices = Vec::with_capacity(legs + 1);
    let mut at = [0.0, 0.0];
    vertices.push(at);
    for k in 0..legs {
        let heading = HEADINGS[k % 4];
        let len = unit * (k / 2 + 1) as f64;
        at = [at[0] + heading[0] * len, at[1] + heading[1] * len];
        vertices.push(at);
    }
    Polyline::open(vertices)
}

/// Star polygon with its first tip due north.
pub(crate) fn star(points: u32) -> Polyline {
    let outer = 0.5;
    let inner = outer * STAR_INNER_RATIO;
    let corners = 2 * points as usize;
    let vertices = (0..corners)
        .map(|k| {
            let angle = PI * k as f64 / f64::from(points);
            let radius = if k % 2 == 0 { outer } else { inner };
            [radius * angle.cos(), radius * angle.sin()]
        })
        .collect();
    Polyline::closed(vertices)
}

/// Saw-tooth advancing one unit north, each turn one excursion east and back.
pub(crate) fn zigzag(turns: u32) -> Polyline {
    let legs = 2 * turns as usize;
    let width = 0.25;
    let vertices = (0..=legs)
        .map(|k| {
            let x = k as f64 / legs as f64;
            let y = if k % 2 == 1 { width } else { 0.0 };
            [x, y]
        })
        .collect();
    Polyline::open(vertices)
}
