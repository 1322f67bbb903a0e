//! Shapes with a smooth closed-form parametrisation.
//!
//! Each function builds x(t) and y(t) from a [`Jet`] seeded at the sample
//! time, so the returned velocity and acceleration are exact derivatives.

use std::f64::consts::TAU;

use offboard_core::{Jet, KinematicState};

use crate::ManeuverParams;

/// Angular rate that completes `revolutions` over the maneuver.
fn phase(t: f64, params: &ManeuverParams, revolutions: f64) -> Jet {
    Jet::time(t) * (TAU * revolutions / params.maneuver_time_s)
}

fn planar(x: Jet, y: Jet, altitude_m: f64) -> KinematicState {
    KinematicState {
        position: [x.value, y.value, -altitude_m],
        velocity: [x.rate, y.rate, 0.0],
        acceleration: [x.accel, y.accel, 0.0],
    }
}

pub(crate) fn circle(t: f64, params: &ManeuverParams) -> KinematicState {
    let r = params.size_m * 0.5;
    let phi = phase(t, params, 1.0);
    planar(phi.cos() * r, phi.sin() * r, params.altitude_m)
}

/// Lemniscate of Gerono with its crossing point at the origin and lobes along north.
pub(crate) fn eight(t: f64, params: &ManeuverParams) -> KinematicState {
    let r = params.size_m * 0.5;
    let phi = phase(t, params, 1.0);
    planar(phi.sin() * r, (phi * 2.0).sin() * (r * 0.5), params.altitude_m)
}

/// Lemniscate of Bernoulli with lobes along east.
pub(crate) fn infinity(t: f64, params: &ManeuverParams) -> KinematicState {
    let r = params.size_m * 0.5;
    let phi = phase(t, params, 1.0);
    let (s, c) = (phi.sin(), phi.cos());
    let denom = s * s + 1.0;
    planar((s * c) * r / denom, c * r / denom, params.altitude_m)
}

/// Classic heart curve, 32 units wide before scaling, point facing south.
pub(crate) fn heart(t: f64, params: &ManeuverParams) -> KinematicState {
    let k = params.size_m / 32.0;
    let phi = phase(t, params, 1.0);
    let s = phi.sin();
    let x = phi.cos() * 13.0 - (phi * 2.0).cos() * 5.0 - (phi * 3.0).cos() * 2.0 - (phi * 4.0).cos();
    let y = s * s * s * 16.0;
    planar(x * k, y * k, params.altitude_m)
}

pub(crate) fn helix(
    t: f64,
    params: &ManeuverParams,
    end_altitude: f64,
    turns: u32,
) -> KinematicState {
    let r = params.size_m * 0.5;
    let phi = phase(t, params, f64::from(turns));
    let climb = (end_altitude - params.altitude_m) / params.maneuver_time_s;
    let (x, y) = (phi.cos() * r, phi.sin() * r);
    let z = -(Jet::time(t) * climb + params.altitude_m);
    KinematicState {
        position: [x.value, y.value, z.value],
        velocity: [x.rate, y.rate, z.rate],
        acceleration: [x.accel, y.accel, z.accel],
    }
}

/// Advances north over `size` while oscillating east by a quarter of it.
pub(crate) fn sine_wave(t: f64, params: &ManeuverParams, turns: u32) -> KinematicState {
    let amplitude = params.size_m * 0.25;
    let x = Jet::time(t) * (params.size_m / params.maneuver_time_s);
    let y = phase(t, params, f64::from(turns)).sin() * amplitude;
    planar(x, y, params.altitude_m)
}
