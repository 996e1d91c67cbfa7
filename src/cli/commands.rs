use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::classifiers::{evaluate, KnnClassifier};
use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::{AlertSignal, DeviceSnapshot, FeatureVector};
use crate::processors::{
    classified_record, AggregatorService, Dataset, DatasetBuilder, GridMapper, IngestMode,
    PeakReducer, ReadingWindow, StreamingAggregator,
};
use crate::readers::{RecordParser, TrainingReader};
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::utils::{generate_default_dataset_dir, GridQuantizer};
use crate::writers::{write_dataset, AlertSink, ClassifiedRecordWriter, DatasetFiles, LineAlertSink};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Map { input, grid_size } => {
            if let Some(grid_size) = grid_size {
                settings.grid_size = grid_size;
            }
            settings.check()?;

            let mapper = GridMapper::new(settings.quantizer()?);
            let stdout = io::stdout();
            let (written, rejected) =
                map_readings(open_input(input.as_deref())?, &mapper, stdout.lock())?;
            info!(written, rejected, "map finished");
        }

        Commands::Aggregate {
            input,
            output_dir,
            grid_size,
            single,
            delimiter,
        } => {
            if let Some(grid_size) = grid_size {
                settings.grid_size = grid_size;
            }
            if let Some(delimiter) = delimiter {
                settings.output_delimiter = delimiter;
            }
            if single {
                settings.ingest_mode = IngestMode::Single;
            }
            settings.check()?;

            let progress = ProgressReporter::new_spinner("Aggregating measurements...", quiet);
            let aggregator = aggregate_stream(
                open_input(input.as_deref())?,
                settings.ingest_mode,
                Some(&progress),
            )?;
            progress.finish_with_message(&format!(
                "Aggregated {} devices",
                aggregator.len()
            ));

            let dataset = DatasetBuilder::new(settings.quantizer()?).build(&aggregator);
            let output_dir = output_dir.unwrap_or_else(generate_default_dataset_dir);
            let files = write_dataset(&dataset, &output_dir, settings.delimiter()?)?;

            println!("{}", aggregation_summary(&aggregator, &dataset, &files));
        }

        Commands::Inspect {
            device,
            input,
            single,
        } => {
            if single {
                settings.ingest_mode = IngestMode::Single;
            }

            let aggregator =
                aggregate_stream(open_input(input.as_deref())?, settings.ingest_mode, None)?;
            let snapshot = aggregator.snapshot(&device)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Peaks { input } => {
            let mut reducer = PeakReducer::new();
            for line in non_blank_lines(open_input(input.as_deref())?) {
                let line = line?;
                if let Err(e) = reducer.ingest_line(&line) {
                    skip_record(e, &line)?;
                }
            }

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for peak in reducer.peaks() {
                writeln!(out, "{}", peak.to_line())?;
            }
            info!(rejected = reducer.rejected(), "peaks finished");
        }

        Commands::Summarize { input, window_size } => {
            if let Some(window_size) = window_size {
                settings.window_size = window_size;
            }
            settings.check()?;

            let stdout = io::stdout();
            let (emitted, rejected) = summarize_stream(
                open_input(input.as_deref())?,
                settings.window_size,
                stdout.lock(),
            )?;
            info!(emitted, rejected, "summarize finished");
        }

        Commands::Classify { training, input } => {
            let classifier = train_classifier(&training, &settings)?;
            let mut sink = LineAlertSink::new(io::stdout(), settings.alert_topic.clone());
            let (classified, rejected) =
                classify_stream(open_input(input.as_deref())?, &classifier, &mut sink)?;
            info!(classified, rejected, "classify finished");
        }

        Commands::Monitor {
            training,
            input,
            records_out,
        } => {
            let classifier = train_classifier(&training, &settings)?;
            let quantizer = settings.quantizer()?;
            let delimiter = settings.delimiter()?;
            let mode = settings.ingest_mode;
            let topic = settings.alert_topic.clone();
            let input = open_input(input.as_deref())?;

            let outcome = tokio::task::spawn_blocking(move || -> Result<MonitorOutcome> {
                let mut records = match records_out {
                    Some(path) => Some(ClassifiedRecordWriter::create(&path, delimiter)?),
                    None => None,
                };
                let mut sink = LineAlertSink::new(io::stdout(), topic);
                let service = AggregatorService::spawn(StreamingAggregator::with_mode(mode));

                let outcome = monitor_stream(
                    input,
                    &service,
                    &classifier,
                    &quantizer,
                    &mut sink,
                    records.as_mut(),
                )?;
                if let Some(records) = records.as_mut() {
                    records.flush()?;
                }
                service.shutdown()?;
                Ok(outcome)
            })
            .await??;

            info!(
                processed = outcome.processed,
                rejected = outcome.rejected,
                alerts = outcome.alerts,
                "monitor finished"
            );
        }

        Commands::Evaluate {
            training,
            test,
            max_workers,
        } => {
            let classifier = train_classifier(&training, &settings)?;
            let test_samples = TrainingReader::new()
                .with_delimiter(settings.delimiter()?)
                .read_samples(&test)?;

            let progress = ProgressReporter::new_spinner("Scoring test samples...", quiet);
            let report = tokio::task::spawn_blocking(move || {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(max_workers.max(1))
                    .build()
                    .map_err(|e| ProcessingError::Concurrency(e.to_string()))?;
                pool.install(|| evaluate(&classifier, &test_samples))
            })
            .await??;
            progress.finish_with_message("Evaluation complete");

            println!("{}", report.summary());
        }
    }

    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn non_blank_lines<R: BufRead>(input: R) -> impl Iterator<Item = io::Result<String>> {
    input.lines().filter(|line| match line {
        Ok(line) => !line.trim().is_empty(),
        Err(_) => true,
    })
}

/// Record-level errors are logged and skipped, anything else aborts
fn skip_record(error: ProcessingError, line: &str) -> Result<()> {
    if error.is_record_error() {
        debug!(error = %error, line, "skipping record");
        Ok(())
    } else {
        Err(error)
    }
}

fn train_classifier(path: &Path, settings: &Settings) -> Result<KnnClassifier> {
    let samples = TrainingReader::new()
        .with_delimiter(settings.delimiter()?)
        .read_samples(path)?;
    let mut classifier = KnnClassifier::with_neighbors(settings.neighbors)?;
    classifier.fit(samples)?;
    Ok(classifier)
}

/// Write one quantized measurement line per valid raw reading.
/// Returns (written, rejected).
pub fn map_readings<R: BufRead, W: Write>(
    input: R,
    mapper: &GridMapper,
    mut output: W,
) -> Result<(u64, u64)> {
    let mut written = 0;
    let mut rejected = 0;

    for line in non_blank_lines(input) {
        let line = line?;
        match mapper.map_line(&line) {
            Ok(measurement) => {
                writeln!(output, "{}", measurement.to_line())?;
                written += 1;
            }
            Err(e) => {
                skip_record(e, &line)?;
                rejected += 1;
            }
        }
    }

    output.flush()?;
    Ok((written, rejected))
}

pub fn aggregate_stream<R: BufRead>(
    input: R,
    mode: IngestMode,
    progress: Option<&ProgressReporter>,
) -> Result<StreamingAggregator> {
    let mut aggregator = StreamingAggregator::with_mode(mode);

    for line in non_blank_lines(input) {
        let line = line?;
        if let Err(e) = aggregator.ingest_line(&line) {
            if !e.is_record_error() {
                return Err(e);
            }
        }
        if let Some(progress) = progress {
            progress.increment(1);
        }
    }

    info!(
        devices = aggregator.len(),
        accepted = aggregator.accepted(),
        rejected = aggregator.rejected(),
        "aggregation finished"
    );
    Ok(aggregator)
}

/// Emit an averaged-reading line for every closed hour and for the trailing
/// window at end of input. Returns (emitted, rejected).
pub fn summarize_stream<R: BufRead, W: Write>(
    input: R,
    window_size: usize,
    mut output: W,
) -> Result<(u64, u64)> {
    let parser = RecordParser::new();
    let mut window = ReadingWindow::with_capacity(window_size);
    let mut emitted = 0;
    let mut rejected = 0;

    for line in non_blank_lines(input) {
        let line = line?;
        let reading = match parser.parse_instant_reading(&line) {
            Ok(reading) => reading,
            Err(e) => {
                skip_record(e, &line)?;
                rejected += 1;
                continue;
            }
        };
        if let Some(summary) = window.push(reading) {
            writeln!(output, "{}", summary.to_line())?;
            emitted += 1;
        }
    }

    if let Some(summary) = window.summarize() {
        writeln!(output, "{}", summary.to_line())?;
        emitted += 1;
    }

    output.flush()?;
    Ok((emitted, rejected))
}

/// Emit one alert signal per averaged reading. Returns (classified, rejected).
pub fn classify_stream<R: BufRead, S: AlertSink>(
    input: R,
    classifier: &KnnClassifier,
    sink: &mut S,
) -> Result<(u64, u64)> {
    let parser = RecordParser::new();
    let mut classified = 0;
    let mut rejected = 0;

    for line in non_blank_lines(input) {
        let line = line?;
        match parser.parse_averaged_reading(&line) {
            Ok(reading) => {
                let class_label = classifier.predict(&reading.features())?;
                sink.emit(AlertSignal::from(class_label))?;
                classified += 1;
            }
            Err(e) => {
                skip_record(e, &line)?;
                rejected += 1;
            }
        }
    }

    Ok((classified, rejected))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorOutcome {
    pub processed: u64,
    pub rejected: u64,
    pub alerts: u64,
}

/// Features of a device's running aggregate, location snapped to the grid
pub fn snapshot_features(snapshot: &DeviceSnapshot, quantizer: &GridQuantizer) -> FeatureVector {
    let location = quantizer.location(snapshot.avg_latitude, snapshot.avg_longitude);
    [
        snapshot.min_temperature,
        snapshot.max_temperature,
        location.latitude,
        location.longitude,
    ]
}

/// Feed measurements through the aggregation service and classify the
/// updated device after each one.
pub fn monitor_stream<R, S, W>(
    input: R,
    service: &AggregatorService,
    classifier: &KnnClassifier,
    quantizer: &GridQuantizer,
    sink: &mut S,
    mut records: Option<&mut ClassifiedRecordWriter<W>>,
) -> Result<MonitorOutcome>
where
    R: BufRead,
    S: AlertSink,
    W: Write,
{
    let parser = RecordParser::new();
    let mut outcome = MonitorOutcome::default();

    for line in non_blank_lines(input) {
        let line = line?;
        let measurement = match parser.parse_measurement(&line) {
            Ok(measurement) => measurement,
            Err(e) => {
                skip_record(e, &line)?;
                outcome.rejected += 1;
                continue;
            }
        };

        let device_id = measurement.device_id.clone();
        service.submit(measurement)?;
        service.flush()?;

        let snapshot = service.snapshot(&device_id)?;
        let class_label = classifier.predict(&snapshot_features(&snapshot, quantizer))?;
        let signal = AlertSignal::from(class_label);
        sink.emit(signal)?;

        if let Some(records) = records.as_deref_mut() {
            records.write(&classified_record(&snapshot, class_label, quantizer))?;
        }

        outcome.processed += 1;
        if signal == AlertSignal::On {
            outcome.alerts += 1;
        }
    }

    Ok(outcome)
}

pub fn aggregation_summary(
    aggregator: &StreamingAggregator,
    dataset: &Dataset,
    files: &DatasetFiles,
) -> String {
    let mut summary = String::new();

    summary.push_str("=== Aggregation Summary ===\n");
    summary.push_str(&format!("Records Accepted: {}\n", aggregator.accepted()));
    summary.push_str(&format!("Records Rejected: {}\n", aggregator.rejected()));
    summary.push_str(&format!("Devices: {}\n", aggregator.len()));
    summary.push_str(&format!(
        "Training Rows: {} -> {}\n",
        dataset.training.len(),
        files.training.display()
    ));
    summary.push_str(&format!(
        "Test Rows: {} -> {}\n",
        dataset.test.len(),
        files.test.display()
    ));

    summary
}

