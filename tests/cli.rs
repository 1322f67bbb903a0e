use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;

#[test]
fn generate_writes_table_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("out/circle.csv");
    let summary_path = dir.path().join("out/circle.json");

    Command::cargo_bin("offboard_generate")
        .expect("offboard_generate bin")
        .args([
            "--shape",
            "circle",
            "--diameter",
            "10",
            "--maneuver-time",
            "36",
            "--direction",
            "-1",
            "--initial-altitude",
            "10",
            "--hold-time",
            "2",
            "--step-time",
            "1",
            "--output",
            csv_path.to_str().unwrap(),
            "--summary",
            summary_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&csv_path).expect("csv");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("idx,t,px,py,pz,vx,vy,vz,ax,ay,az,yaw,mode,ledr,ledg,ledb")
    );
    assert_eq!(lines.count(), 54);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).expect("summary")).unwrap();
    assert_eq!(summary["shape"], "circle");
    assert_eq!(summary["sample_count"], 54);
    assert_eq!(summary["entry_transit"], true);
}

#[test]
fn generate_streams_to_stdout() {
    Command::cargo_bin("offboard_generate")
        .expect("offboard_generate bin")
        .args([
            "--shape",
            "eight_shape",
            "--diameter",
            "8",
            "--maneuver-time",
            "5",
            "--step-time",
            "0.5",
            "--output",
            "-",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("idx,t,px,py,pz"))
        .stdout(predicate::str::contains(",70,nan,nan,nan"));
}

#[test]
fn generate_reads_plan_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    let csv_path = dir.path().join("spiral.csv");
    let mut file = File::create(&plan_path).expect("plan create");
    writeln!(
        file,
        "[shape]\nshape_name = \"spiral_square\"\ndiameter = 8.0\nmaneuver_time = 12.0\nturns = 2\nled = [0.0, 255.0, 0.0]\n\n[flight]\ninitial_altitude = 5.0\nhold_time = 1.0\nstep_time = 0.5"
    )
    .unwrap();

    Command::cargo_bin("offboard_generate")
        .expect("offboard_generate bin")
        .args([
            "--plan",
            plan_path.to_str().unwrap(),
            "--output",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&csv_path).expect("csv");
    assert!(text.lines().any(|l| l.ends_with(",70,0,255,0")));
}

#[test]
fn generate_rejects_unknown_shape_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("never.csv");

    Command::cargo_bin("offboard_generate")
        .expect("offboard_generate bin")
        .args([
            "--shape",
            "triangle",
            "--diameter",
            "10",
            "--maneuver-time",
            "36",
            "--output",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shape_name"));

    assert!(!csv_path.exists());
}

#[test]
fn plot_renders_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("heart.csv");
    let png_path = dir.path().join("plots/heart.png");

    Command::cargo_bin("offboard_generate")
        .expect("offboard_generate bin")
        .args([
            "--shape",
            "heart_shape",
            "--diameter",
            "16",
            "--maneuver-time",
            "20",
            "--start-x",
            "-4",
            "--start-y",
            "3",
            "--output",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    Command::cargo_bin("offboard_plot")
        .expect("offboard_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "200",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}
