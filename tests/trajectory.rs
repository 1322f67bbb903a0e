use offboard_planner::export::table::{CsvSink, read_samples};
use offboard_planner::mission::{
    FlightMode, FlightPlanConfig, PlanError, SampleSink, ShapeRequest, TrajectoryAssembler,
    TrajectorySample, generate,
};

fn circle_flight() -> FlightPlanConfig {
    FlightPlanConfig {
        start_x: 0.0,
        start_y: 0.0,
        initial_altitude: 10.0,
        climb_rate: 1.0,
        move_speed: 2.0,
        hold_time: 2.0,
        step_time: 1.0,
    }
}

fn circle_samples() -> Vec<TrajectorySample> {
    let mut sink: Vec<TrajectorySample> = Vec::new();
    generate(
        &ShapeRequest::new("circle", 10.0, 36.0),
        &circle_flight(),
        &mut sink,
    )
    .expect("circle run");
    sink
}

fn count(samples: &[TrajectorySample], mode: FlightMode) -> usize {
    samples.iter().filter(|s| s.mode == mode).count()
}

fn csv_bytes(request: &ShapeRequest, flight: &FlightPlanConfig) -> Vec<u8> {
    let mut sink = CsvSink::new(Vec::new());
    generate(request, flight, &mut sink).expect("csv run");
    sink.into_inner().expect("csv bytes")
}

#[test]
fn circle_scenario_phase_counts() {
    let samples = circle_samples();
    assert_eq!(count(&samples, FlightMode::Climb), 10);
    assert_eq!(count(&samples, FlightMode::HoldAltitude), 2);
    assert_eq!(count(&samples, FlightMode::TransitToStart), 0);
    assert_eq!(count(&samples, FlightMode::HoldStart), 2);
    assert_eq!(count(&samples, FlightMode::TransitToEntry), 2);
    assert_eq!(count(&samples, FlightMode::HoldEntry), 2);
    assert_eq!(count(&samples, FlightMode::Maneuver), 36);
    assert_eq!(samples.len(), 54);
}

#[test]
fn indices_are_contiguous_and_modes_never_go_back() {
    let samples = circle_samples();
    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(sample.index, i);
        assert_eq!(sample.yaw, 0.0);
    }
    for pair in samples.windows(2) {
        assert!(pair[0].mode.tag() <= pair[1].mode.tag());
    }
}

#[test]
fn timestamps_advance_by_step_within_phases() {
    let samples = circle_samples();
    for pair in samples.windows(2) {
        let dt = pair[1].time_s - pair[0].time_s;
        if pair[0].mode == pair[1].mode {
            assert!((dt - 1.0).abs() < 1e-9, "dt {dt} inside {:?}", pair[0].mode);
        } else {
            assert!(dt >= 1.0 - 1e-9 && dt < 2.0, "dt {dt} across boundary");
        }
    }
    let entry_hold = samples
        .iter()
        .find(|s| s.mode == FlightMode::HoldEntry)
        .expect("entry hold");
    // 10 s climb + 2 s hold + 2 s hold + 2.5 s transit
    assert!((entry_hold.time_s - 16.5).abs() < 1e-9);
}

#[test]
fn climb_runs_from_ground_to_altitude() {
    let samples = circle_samples();
    let climb: Vec<_> = samples
        .iter()
        .filter(|s| s.mode == FlightMode::Climb)
        .collect();
    assert_eq!(climb[0].position, [0.0, 0.0, 0.0]);
    let last = climb.last().expect("climb samples");
    assert!((last.position[2] + 10.0).abs() <= 1.0);
    assert!(climb.iter().all(|s| s.velocity == [0.0, 0.0, -1.0]));
    assert!(climb.iter().all(|s| s.led.is_none()));
}

#[test]
fn shape_flight_starts_at_cached_entry() {
    let flight = FlightPlanConfig {
        start_x: 3.0,
        start_y: -4.0,
        ..circle_flight()
    };
    let assembler =
        TrajectoryAssembler::new(&ShapeRequest::new("circle", 10.0, 36.0), &flight)
            .expect("assembler");
    assert_eq!(assembler.sequencer().entry_offset(), [5.0, 0.0]);
    let first = assembler
        .samples()
        .find(|s| s.mode == FlightMode::Maneuver)
        .expect("shape flight");
    assert!((first.position[0] - 8.0).abs() < 1e-9);
    assert!((first.position[1] + 4.0).abs() < 1e-9);
    assert_eq!(first.position[2], -10.0);
}

#[test]
fn shapes_starting_at_origin_skip_entry_transit() {
    let mut sink: Vec<TrajectorySample> = Vec::new();
    generate(
        &ShapeRequest::new("eight_shape", 10.0, 20.0),
        &circle_flight(),
        &mut sink,
    )
    .expect("eight run");
    assert_eq!(count(&sink, FlightMode::TransitToEntry), 0);
    assert_eq!(count(&sink, FlightMode::HoldEntry), 0);
    assert_eq!(count(&sink, FlightMode::Maneuver), 20);
}

#[test]
fn positions_stay_continuous_across_phase_boundaries() {
    let flight = FlightPlanConfig {
        start_x: 6.0,
        start_y: 8.0,
        step_time: 0.1,
        ..circle_flight()
    };
    let mut request = ShapeRequest::new("heart_shape", 16.0, 40.0);
    request.direction = -1;
    let mut sink: Vec<TrajectorySample> = Vec::new();
    generate(&request, &flight, &mut sink).expect("heart run");
    for pair in sink.windows(2) {
        let jump: f64 = (0..3)
            .map(|k| (pair[1].position[k] - pair[0].position[k]).powi(2))
            .sum::<f64>()
            .sqrt();
        // a few steps at move speed
        assert!(jump < 2.0 * 0.1 * 2.0 + 0.5, "jump {jump} at {}", pair[1].index);
    }
}

#[test]
fn runs_are_byte_identical() {
    let mut request = ShapeRequest::new("star_shape", 12.0, 30.0);
    request.points = Some(5);
    request.led = Some([255.0, 0.0, 128.0]);
    let first = csv_bytes(&request, &circle_flight());
    let second = csv_bytes(&request, &circle_flight());
    assert_eq!(first, second);

    let back = read_samples(first.as_slice()).expect("re-read");
    // star tip sits 6 m north of the origin: a 3 s entry transit
    assert_eq!(back.len(), 10 + 2 + 2 + 3 + 2 + 30);
    let shape: Vec<_> = back
        .iter()
        .filter(|s| s.mode == FlightMode::Maneuver)
        .collect();
    assert!(shape.iter().all(|s| s.led == Some([255.0, 0.0, 128.0])));
}

#[test]
fn unknown_shape_writes_nothing() {
    let mut sink = CsvSink::new(Vec::new());
    let err = generate(
        &ShapeRequest::new("triangle", 10.0, 36.0),
        &circle_flight(),
        &mut sink,
    )
    .unwrap_err();
    match err {
        PlanError::InvalidConfiguration(e) => assert_eq!(e.field, "shape_name"),
        other => panic!("unexpected error {other}"),
    }
    assert!(sink.into_inner().expect("bytes").is_empty());
}

#[test]
fn helix_without_extras_names_the_parameter() {
    let err = TrajectoryAssembler::new(&ShapeRequest::new("helix", 10.0, 36.0), &circle_flight())
        .unwrap_err();
    match err {
        PlanError::InvalidConfiguration(e) => assert_eq!(e.field, "end_altitude"),
        other => panic!("expected configuration error, got {other:?}"),
    }

    let mut request = ShapeRequest::new("helix", 10.0, 36.0);
    request.turns = Some(3);
    request.end_altitude = Some(20.0);
    let assembler = TrajectoryAssembler::new(&request, &circle_flight()).expect("helix");
    let last = assembler.samples().last().expect("samples");
    assert_eq!(last.mode, FlightMode::Maneuver);
    assert!(last.position[2] < -19.0 && last.position[2] > -20.0);
}

#[test]
fn sink_errors_surface_as_plan_errors() {
    struct Broken;
    impl SampleSink for Broken {
        fn write_header(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn write_sample(&mut self, _sample: &TrajectorySample) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }
    let err = generate(
        &ShapeRequest::new("circle", 10.0, 36.0),
        &circle_flight(),
        &mut Broken,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::Sink(_)));
}

#[test]
fn bundled_plans_assemble() {
    let mut seen = 0;
    for entry in std::fs::read_dir("configs/plans").expect("plans dir") {
        let path = entry.expect("dir entry").path();
        let plan = offboard_planner::config::load_plan(&path).expect("plan loads");
        let assembler =
            TrajectoryAssembler::new(&plan.shape, &plan.flight).expect("plan validates");
        assert!(!assembler.sequencer().is_empty(), "{}", path.display());
        seen += 1;
    }
    assert!(seen >= 3);
}
