use anyhow::{Context, anyhow};
use clap::Parser;
use offboard_planner::config::{FlightPlanConfig, PlanFile, ShapeRequest, load_plan};
use offboard_planner::export::summary::write_summary;
use offboard_planner::export::table::{CsvSink, writer_for_path};
use offboard_planner::mission::TrajectoryAssembler;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Generate an offboard waypoint table (CSV) for one aerial shape.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Offboard trajectory generator (NED waypoint table)"
)]
struct Cli {
    /// Plan file (.toml, .yaml or .yml); explicit flags override its values
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Shape name, e.g. circle, eight_shape, helix
    #[arg(long)]
    shape: Option<String>,

    /// Characteristic size of the shape in metres
    #[arg(long)]
    diameter: Option<f64>,

    /// Traversal direction: 1 (clockwise from above) or -1
    #[arg(long, allow_negative_numbers = true)]
    direction: Option<i32>,

    /// Duration of the shape flight in seconds
    #[arg(long)]
    maneuver_time: Option<f64>,

    /// Turns for helix, spiral_square, zigzag and sine_wave
    #[arg(long)]
    turns: Option<u32>,

    /// Tip count for star
    #[arg(long)]
    points: Option<u32>,

    /// Final altitude of the helix in metres
    #[arg(long, allow_negative_numbers = true)]
    end_altitude: Option<f64>,

    /// LED colour during the shape as r,g,b
    #[arg(long, value_delimiter = ',')]
    led: Option<Vec<f64>>,

    /// North offset of the shape origin in metres
    #[arg(long, allow_negative_numbers = true)]
    start_x: Option<f64>,

    /// East offset of the shape origin in metres
    #[arg(long, allow_negative_numbers = true)]
    start_y: Option<f64>,

    /// Flight altitude in metres
    #[arg(long)]
    initial_altitude: Option<f64>,

    /// Climb rate in m/s
    #[arg(long)]
    climb_rate: Option<f64>,

    /// Transit speed in m/s
    #[arg(long)]
    move_speed: Option<f64>,

    /// Hover time between phases in seconds
    #[arg(long)]
    hold_time: Option<f64>,

    /// Sample period in seconds
    #[arg(long)]
    step_time: Option<f64>,

    /// Output CSV file (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional JSON summary of the phase table
    #[arg(long)]
    summary: Option<PathBuf>,
}

const DEFAULT_OUTPUT: &str = "shapes/active.csv";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("offboard_mission=info".parse()?)
                .add_directive("offboard_generate=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let plan = match &cli.plan {
        Some(path) => Some(
            load_plan(path).with_context(|| format!("failed to load plan {}", path.display()))?,
        ),
        None => None,
    };

    let request = shape_request(&cli, plan.as_ref())?;
    let flight = flight_config(&cli, plan.as_ref());
    let output = cli
        .output
        .clone()
        .or_else(|| plan.as_ref().and_then(|p| p.output.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    // Validate everything before touching the output path.
    let assembler = TrajectoryAssembler::new(&request, &flight)?;

    let writer = writer_for_path(&output)
        .with_context(|| format!("failed to open {}", output.display()))?;
    let mut sink = CsvSink::new(writer);
    let rows = assembler.write_to(&mut sink)?;
    info!(rows, output = %output.display(), "waypoint table ready");

    if let Some(path) = &cli.summary {
        write_summary(path, &assembler.summary())
            .with_context(|| format!("failed to write summary {}", path.display()))?;
        info!(summary = %path.display(), "summary written");
    }
    Ok(())
}

fn shape_request(cli: &Cli, plan: Option<&PlanFile>) -> anyhow::Result<ShapeRequest> {
    let mut request = match plan {
        Some(plan) => plan.shape.clone(),
        None => {
            let name = cli
                .shape
                .clone()
                .ok_or_else(|| anyhow!("--shape is required without --plan"))?;
            let diameter = cli
                .diameter
                .ok_or_else(|| anyhow!("--diameter is required without --plan"))?;
            let maneuver_time = cli
                .maneuver_time
                .ok_or_else(|| anyhow!("--maneuver-time is required without --plan"))?;
            ShapeRequest::new(name, diameter, maneuver_time)
        }
    };

    if let Some(name) = &cli.shape {
        request.shape_name = name.clone();
    }
    if let Some(diameter) = cli.diameter {
        request.diameter = diameter;
    }
    if let Some(direction) = cli.direction {
        request.direction = direction;
    }
    if let Some(maneuver_time) = cli.maneuver_time {
        request.maneuver_time = maneuver_time;
    }
    request.turns = cli.turns.or(request.turns);
    request.points = cli.points.or(request.points);
    request.end_altitude = cli.end_altitude.or(request.end_altitude);
    if let Some(led) = &cli.led {
        let rgb: [f64; 3] = led
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("--led expects three comma-separated values, got {led:?}"))?;
        request.led = Some(rgb);
    }
    Ok(request)
}

fn flight_config(cli: &Cli, plan: Option<&PlanFile>) -> FlightPlanConfig {
    let base = plan.map(|p| p.flight.clone()).unwrap_or_default();
    FlightPlanConfig {
        start_x: cli.start_x.unwrap_or(base.start_x),
        start_y: cli.start_y.unwrap_or(base.start_y),
        initial_altitude: cli.initial_altitude.unwrap_or(base.initial_altitude),
        climb_rate: cli.climb_rate.unwrap_or(base.climb_rate),
        move_speed: cli.move_speed.unwrap_or(base.move_speed),
        hold_time: cli.hold_time.unwrap_or(base.hold_time),
        step_time: cli.step_time.unwrap_or(base.step_time),
    }
}
