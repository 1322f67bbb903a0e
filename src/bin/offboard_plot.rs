use anyhow::Context;
use clap::Parser;
use offboard_planner::export::table::read_samples;
use offboard_planner::model::{FlightMode, TrajectorySample};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::fs::{self, File};
use std::io::BufReader;
use std::ops::Range;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a waypoint table as a top-down track and an altitude profile"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/trajectory.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file =
        File::open(&cli.input).with_context(|| format!("failed to open {}", cli.input.display()))?;
    let samples = read_samples(BufReader::new(file))?;
    if samples.is_empty() {
        return Err(anyhow::anyhow!("No samples in the provided CSV"));
    }

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let root = BitMapBackend::new(&cli.output, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (track_area, profile_area) = root.split_horizontally(cli.width / 2);

    // Top-down: east to the right, north up.
    {
        let east = span(samples.iter().map(|s| s.position[1]));
        let north = span(samples.iter().map(|s| s.position[0]));
        let mut chart = ChartBuilder::on(&track_area)
            .margin(20)
            .build_cartesian_2d(east.clone(), north.clone())?;
        draw_frame(&mut chart, &east, &north)?;
        for (mode, points) in runs(&samples, |s| (s.position[1], s.position[0])) {
            chart.draw_series(LineSeries::new(
                points,
                ShapeStyle::from(&mode_color(mode)).stroke_width(2),
            ))?;
        }
        if let Some(entry) = samples.iter().find(|s| s.mode == FlightMode::Maneuver) {
            chart.draw_series(std::iter::once(Circle::new(
                (entry.position[1], entry.position[0]),
                5,
                BLACK.filled(),
            )))?;
        }
    }

    {
        let time = span(samples.iter().map(|s| s.time_s));
        let altitude = span(samples.iter().map(|s| -s.position[2]));
        let mut chart = ChartBuilder::on(&profile_area)
            .margin(20)
            .build_cartesian_2d(time.clone(), altitude.clone())?;
        draw_frame(&mut chart, &time, &altitude)?;
        for (mode, points) in runs(&samples, |s| (s.time_s, -s.position[2])) {
            chart.draw_series(LineSeries::new(
                points,
                ShapeStyle::from(&mode_color(mode)).stroke_width(2),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Axis range with a small margin; never empty.
fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return -1.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}

/// Split the track into consecutive same-mode runs. Each run starts at the
/// last point of the previous one so the drawn line stays connected.
fn runs(
    samples: &[TrajectorySample],
    project: impl Fn(&TrajectorySample) -> (f64, f64),
) -> Vec<(FlightMode, Vec<(f64, f64)>)> {
    let mut out: Vec<(FlightMode, Vec<(f64, f64)>)> = Vec::new();
    for chunk in samples.chunk_by(|a, b| a.mode == b.mode) {
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(chunk.len() + 1);
        if let Some(last) = out.last().and_then(|(_, prev)| prev.last()) {
            points.push(*last);
        }
        points.extend(chunk.iter().map(&project));
        out.push((chunk[0].mode, points));
    }
    out
}

fn draw_frame<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    x: &Range<f64>,
    y: &Range<f64>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let grey = RGBColor(200, 200, 200);
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x.start, y.start), (x.end, y.end)],
        ShapeStyle::from(&grey).stroke_width(1),
    )))?;
    // zero lines
    if x.start < 0.0 && x.end > 0.0 {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, y.start), (0.0, y.end)],
            ShapeStyle::from(&grey).stroke_width(1),
        )))?;
    }
    if y.start < 0.0 && y.end > 0.0 {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x.start, 0.0), (x.end, 0.0)],
            ShapeStyle::from(&grey).stroke_width(1),
        )))?;
    }
    Ok(())
}

fn mode_color(mode: FlightMode) -> RGBColor {
    match mode {
        FlightMode::Climb => RGBColor(30, 120, 200),
        FlightMode::HoldAltitude => RGBColor(120, 120, 120),
        FlightMode::TransitToStart => RGBColor(40, 170, 90),
        FlightMode::HoldStart => RGBColor(90, 90, 90),
        FlightMode::TransitToEntry => RGBColor(230, 160, 20),
        FlightMode::HoldEntry => RGBColor(60, 60, 60),
        FlightMode::Maneuver => RGBColor(210, 50, 40),
    }
}
