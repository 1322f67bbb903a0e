//! Plan-file models and loaders for the offboard shape planner.
//!
//! These are raw, serde-facing records. Range checks and shape-parameter
//! validation happen when the mission planner converts them into runtime types.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Which shape to fly and how big, fast and in which sense to fly it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ShapeRequest {
    pub shape_name: String,
    pub diameter: f64,
    /// `1` for clockwise seen from above, `-1` for the mirrored shape.
    #[serde(default = "default_direction")]
    pub direction: i32,
    pub maneuver_time: f64,
    #[serde(default)]
    pub turns: Option<u32>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub end_altitude: Option<f64>,
    /// RGB colour to show while the shape is flown.
    #[serde(default)]
    pub led: Option<[f64; 3]>,
}

impl ShapeRequest {
    /// Request with no shape-specific parameters and forward direction.
    pub fn new(shape_name: impl Into<String>, diameter: f64, maneuver_time: f64) -> Self {
        Self {
            shape_name: shape_name.into(),
            diameter,
            direction: default_direction(),
            maneuver_time,
            turns: None,
            points: None,
            end_altitude: None,
            led: None,
        }
    }
}

fn default_direction() -> i32 {
    1
}

/// Take-off, repositioning and discretisation settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FlightPlanConfig {
    /// North offset of the shape origin from the launch point (m).
    pub start_x: f64,
    /// East offset of the shape origin from the launch point (m).
    pub start_y: f64,
    pub initial_altitude: f64,
    pub climb_rate: f64,
    pub move_speed: f64,
    pub hold_time: f64,
    pub step_time: f64,
}

impl Default for FlightPlanConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            initial_altitude: 15.0,
            climb_rate: 1.0,
            move_speed: 2.0,
            hold_time: 4.0,
            step_time: 0.1,
        }
    }
}

/// One generation run as stored on disk.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlanFile {
    pub shape: ShapeRequest,
    #[serde(default)]
    pub flight: FlightPlanConfig,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Errors that can occur while loading plan files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read plan: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load a plan from a `.toml` file, or from YAML for any other extension.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<PlanFile, ConfigError> {
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).expect("create plan");
        file.write_all(body.as_bytes()).expect("write plan");
        path
    }

    #[test]
    fn toml_plan_fills_flight_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "heart.toml",
            r#"
output = "shapes/active.csv"

[shape]
shape_name = "heart_shape"
diameter = 30.0
maneuver_time = 90.0
"#,
        );
        let plan = load_plan(&path).expect("toml plan");
        assert_eq!(plan.shape.shape_name, "heart_shape");
        assert_eq!(plan.shape.direction, 1);
        assert_eq!(plan.shape.turns, None);
        assert_eq!(plan.flight, FlightPlanConfig::default());
        assert_eq!(plan.output, Some(PathBuf::from("shapes/active.csv")));
    }

    #[test]
    fn yaml_plan_carries_extras_and_partial_flight() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "helix.yaml",
            r#"
shape:
  shape_name: helix
  diameter: 10.0
  direction: -1
  maneuver_time: 60.0
  turns: 3
  end_altitude: 20.0
  led: [255.0, 0.0, 0.0]
flight:
  start_x: 5.0
  step_time: 0.5
"#,
        );
        let plan = load_plan(&path).expect("yaml plan");
        assert_eq!(plan.shape.direction, -1);
        assert_eq!(plan.shape.turns, Some(3));
        assert_eq!(plan.shape.end_altitude, Some(20.0));
        assert_eq!(plan.shape.led, Some([255.0, 0.0, 0.0]));
        assert_eq!(plan.flight.start_x, 5.0);
        assert_eq!(plan.flight.step_time, 0.5);
        assert_eq!(plan.flight.climb_rate, 1.0);
        assert!(plan.output.is_none());
    }

    #[test]
    fn malformed_plan_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "bad.toml", "[shape]\ndiameter = \"wide\"\n");
        assert!(matches!(load_plan(&path), Err(ConfigError::Toml(_))));
        assert!(matches!(
            load_plan(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
