//! Export helpers for the waypoint table (CSV) and run summary (JSON).

pub mod table {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Read, Write};
    use std::path::Path;
    use std::str::FromStr;

    use csv::{ReaderBuilder, StringRecord, Writer};
    use offboard_core::{FlightMode, SampleSink, TrajectorySample};
    use thiserror::Error;

    /// Column order of the waypoint table.
    pub const HEADER: [&str; 16] = [
        "idx", "t", "px", "py", "pz", "vx", "vy", "vz", "ax", "ay", "az", "yaw", "mode", "ledr",
        "ledg", "ledb",
    ];

    /// Placeholder for LED columns outside the shape.
    pub const MISSING: &str = "nan";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Sink that writes the waypoint table as CSV.
    pub struct CsvSink<W: Write> {
        writer: Writer<W>,
    }

    impl<W: Write> CsvSink<W> {
        pub fn new(inner: W) -> Self {
            Self {
                writer: Writer::from_writer(inner),
            }
        }

        /// Flush and hand back the underlying writer.
        pub fn into_inner(self) -> io::Result<W> {
            self.writer.into_inner().map_err(|err| err.into_error())
        }
    }

    impl<W: Write> SampleSink for CsvSink<W> {
        fn write_header(&mut self) -> io::Result<()> {
            self.writer.write_record(HEADER)?;
            Ok(())
        }

        fn write_sample(&mut self, sample: &TrajectorySample) -> io::Result<()> {
            self.writer.write_record(row(sample))?;
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.writer.flush()
        }
    }

    fn number(v: f64) -> String {
        // keep "-0" out of the table
        if v == 0.0 { "0".to_string() } else { v.to_string() }
    }

    fn row(sample: &TrajectorySample) -> Vec<String> {
        let mut fields = Vec::with_capacity(HEADER.len());
        fields.push(sample.index.to_string());
        fields.push(number(sample.time_s));
        for v in sample
            .position
            .iter()
            .chain(&sample.velocity)
            .chain(&sample.acceleration)
        {
            fields.push(number(*v));
        }
        fields.push(number(sample.yaw));
        fields.push(sample.mode.tag().to_string());
        match sample.led {
            Some(rgb) => fields.extend(rgb.iter().map(|c| number(*c))),
            None => fields.extend(std::iter::repeat_n(MISSING.to_string(), 3)),
        }
        fields
    }

    /// Problems found while re-reading a persisted table.
    #[derive(Debug, Error)]
    pub enum TableError {
        #[error("failed to read CSV: {0}")]
        Csv(#[from] csv::Error),
        #[error("unexpected header '{0}'")]
        Header(String),
        #[error("line {line}: invalid value '{value}' in column '{column}'")]
        Field {
            line: usize,
            column: &'static str,
            value: String,
        },
        #[error("line {line}: unknown mode tag {tag}")]
        Mode { line: usize, tag: u16 },
    }

    /// Re-read a waypoint table, e.g. for plotting.
    pub fn read_samples<R: Read>(reader: R) -> Result<Vec<TrajectorySample>, TableError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        if !headers.iter().eq(HEADER) {
            return Err(TableError::Header(headers.iter().collect::<Vec<_>>().join(",")));
        }

        let mut samples = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let line = row + 2;
            let cell = |col: usize| -> Result<f64, TableError> { parse(&record, col, line) };
            let tag: u16 = parse(&record, 12, line)?;
            let mode = FlightMode::try_from(tag).map_err(|tag| TableError::Mode { line, tag })?;
            let led = [cell(13)?, cell(14)?, cell(15)?];
            samples.push(TrajectorySample {
                index: parse(&record, 0, line)?,
                time_s: cell(1)?,
                position: [cell(2)?, cell(3)?, cell(4)?],
                velocity: [cell(5)?, cell(6)?, cell(7)?],
                acceleration: [cell(8)?, cell(9)?, cell(10)?],
                yaw: cell(11)?,
                mode,
                led: led.iter().all(|c| c.is_finite()).then_some(led),
            });
        }
        Ok(samples)
    }

    fn parse<T: FromStr>(record: &StringRecord, col: usize, line: usize) -> Result<T, TableError> {
        let raw = record.get(col).unwrap_or("");
        raw.trim().parse().map_err(|_| TableError::Field {
            line,
            column: HEADER[col],
            value: raw.to_string(),
        })
    }

}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    /// One phase of the run as listed in the sidecar.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct PhaseRecord {
        pub mode: u16,
        pub label: String,
        pub start_index: usize,
        pub steps: usize,
        pub start_time_s: f64,
        pub duration_s: f64,
    }

    /// Envelope describing a generated trajectory.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct TrajectorySummary {
        pub shape: String,
        pub sample_count: usize,
        pub total_duration_s: f64,
        pub entry_transit: bool,
        pub phases: Vec<PhaseRecord>,
    }

    /// Write the summary as pretty-printed JSON, creating parent directories.
    pub fn write_summary(path: &Path, summary: &TrajectorySummary) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(path)?, summary)?;
        Ok(())
    }

}
