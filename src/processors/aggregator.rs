use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{DeviceAggregate, DeviceSnapshot, Measurement};
use crate::readers::RecordParser;

/// How a measurement's `occurrence_count` feeds the running sums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Each measurement is one sample
    Single,
    /// Each measurement stands for `occurrence_count` identical samples
    #[default]
    Weighted,
}

impl IngestMode {
    fn weight(&self, measurement: &Measurement) -> u32 {
        match self {
            IngestMode::Single => 1,
            IngestMode::Weighted => measurement.occurrence_count,
        }
    }
}

/// Per-device running aggregation over a measurement stream
pub struct StreamingAggregator {
    devices: HashMap<String, DeviceAggregate>,
    mode: IngestMode,
    parser: RecordParser,
    accepted: u64,
    rejected: u64,
}

impl StreamingAggregator {
    pub fn new() -> Self {
        Self::with_mode(IngestMode::default())
    }

    pub fn with_mode(mode: IngestMode) -> Self {
        Self {
            devices: HashMap::new(),
            mode,
            parser: RecordParser::new(),
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn mode(&self) -> IngestMode {
        self.mode
    }

    pub fn ingest(&mut self, measurement: &Measurement) {
        let weight = self.mode.weight(measurement);

        match self.devices.get_mut(&measurement.device_id) {
            Some(aggregate) => aggregate.add(measurement, weight),
            None => {
                self.devices.insert(
                    measurement.device_id.clone(),
                    DeviceAggregate::seed(measurement, weight),
                );
            }
        }
        self.accepted += 1;
    }

    /// Parse and ingest one delimited record.
    ///
    /// A record that fails to parse is counted as rejected and leaves every
    /// aggregate untouched; the error is returned for the caller to log.
    pub fn ingest_line(&mut self, line: &str) -> Result<()> {
        match self.parser.parse_measurement(line) {
            Ok(measurement) => {
                self.ingest(&measurement);
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                debug!(error = %e, line, "rejected measurement record");
                Err(e)
            }
        }
    }

    /// Ingest every non-blank line, returning how many were rejected
    pub fn ingest_lines<'a, I>(&mut self, lines: I) -> u64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let before = self.rejected;
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let _ = self.ingest_line(line);
        }
        self.rejected - before
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceAggregate> {
        self.devices.get(device_id)
    }

    pub fn snapshot(&self, device_id: &str) -> Result<DeviceSnapshot> {
        self.devices
            .get(device_id)
            .map(DeviceAggregate::snapshot)
            .ok_or_else(|| ProcessingError::UnknownDevice {
                device_id: device_id.to_string(),
            })
    }

    /// Snapshots of every device, ordered by device id
    pub fn snapshots(&self) -> Vec<DeviceSnapshot> {
        let mut snapshots: Vec<DeviceSnapshot> =
            self.devices.values().map(DeviceAggregate::snapshot).collect();
        snapshots.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        snapshots
    }

    pub fn device_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Default for StreamingAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn measurement(device: &str, temperature: f64) -> Measurement {
        Measurement::new(device, 12, 0, temperature, -25.5, -49.25).unwrap()
    }

    #[test]
    fn test_mean_min_max_are_order_independent() {
        let temperatures = [18.0, 22.0, 30.0, 11.5, 26.25];
        let mut forward = StreamingAggregator::new();
        let mut backward = StreamingAggregator::new();

        for t in temperatures {
            forward.ingest(&measurement("A", t));
        }
        for t in temperatures.iter().rev() {
            backward.ingest(&measurement("A", *t));
        }

        let mean = temperatures.iter().sum::<f64>() / temperatures.len() as f64;
        for aggregator in [&forward, &backward] {
            let snapshot = aggregator.snapshot("A").unwrap();
            assert!((snapshot.avg_temperature - mean).abs() < 1e-9);
            assert_eq!(snapshot.min_temperature, 11.5);
            assert_eq!(snapshot.max_temperature, 30.0);
            assert_eq!(snapshot.count, 5);
        }
    }

    #[test]
    fn test_devices_are_kept_apart() {
        let mut aggregator = StreamingAggregator::new();
        aggregator.ingest(&measurement("A", 10.0));
        aggregator.ingest(&measurement("B", 30.0));
        aggregator.ingest(&measurement("A", 20.0));

        assert_eq!(aggregator.len(), 2);
        assert_eq!(aggregator.device_ids(), vec!["A", "B"]);
        assert_eq!(aggregator.snapshot("A").unwrap().avg_temperature, 15.0);
        assert_eq!(aggregator.snapshot("B").unwrap().avg_temperature, 30.0);
    }

    #[test]
    fn test_unknown_device() {
        let aggregator = StreamingAggregator::new();
        assert!(aggregator.get("ghost").is_none());
        assert!(matches!(
            aggregator.snapshot("ghost"),
            Err(ProcessingError::UnknownDevice { device_id }) if device_id == "ghost"
        ));
    }

    #[test]
    fn test_malformed_line_leaves_aggregates_untouched() {
        let mut aggregator = StreamingAggregator::new();
        aggregator
            .ingest_line("A\t12\t0\t18.0\t-25.5\t-49.25\t1")
            .unwrap();
        let before = aggregator.get("A").cloned();

        let result = aggregator.ingest_line("A\t12\t0\twarm\t-25.5\t-49.25\t1");
        assert!(matches!(result, Err(ProcessingError::MalformedRecord { .. })));
        assert!(aggregator.ingest_line("B\t12\t0\t\t-25.5\t-49.25\t1").is_err());

        assert_eq!(aggregator.get("A").cloned(), before);
        assert!(aggregator.get("B").is_none());
        assert_eq!(aggregator.accepted(), 1);
        assert_eq!(aggregator.rejected(), 2);
    }

    #[test]
    fn test_extreme_heat_reading_becomes_new_max() {
        let mut aggregator = StreamingAggregator::new();
        aggregator
            .ingest_line("A\t12\t0\t30.0\t-25.5\t-49.25\t1")
            .unwrap();
        aggregator
            .ingest_line("A\t12\t5\t65.0\t-25.5\t-49.25\t1")
            .unwrap();
        aggregator
            .ingest_line("A\t12\t10\t-55.0\t-25.5\t-49.25\t1")
            .unwrap();

        let snapshot = aggregator.snapshot("A").unwrap();
        assert_eq!(aggregator.accepted(), 3);
        assert_eq!(aggregator.rejected(), 0);
        assert_eq!(snapshot.max_temperature, 65.0);
        assert_eq!(snapshot.min_temperature, -55.0);
    }

    #[test]
    fn test_weighted_and_single_modes() {
        let lines = [
            "A\t10\t0\t20.0\t-25.5\t-49.25\t3",
            "A\t14\t0\t10.0\t-25.5\t-49.25\t1",
        ];

        let mut weighted = StreamingAggregator::with_mode(IngestMode::Weighted);
        assert_eq!(weighted.ingest_lines(lines), 0);
        let snapshot = weighted.snapshot("A").unwrap();
        assert_eq!(snapshot.count, 4);
        assert_eq!(snapshot.avg_temperature, 17.5);
        assert_eq!(snapshot.avg_hour, 11.0);

        let mut single = StreamingAggregator::with_mode(IngestMode::Single);
        assert_eq!(single.ingest_lines(lines), 0);
        let snapshot = single.snapshot("A").unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.avg_temperature, 15.0);
        assert_eq!(snapshot.avg_hour, 12.0);
    }

    #[test]
    fn test_ingest_lines_skips_blank_lines() {
        let mut aggregator = StreamingAggregator::new();
        let rejected = aggregator.ingest_lines(["", "  ", "A;1;2;3.0;0.0;0.0;1", "bad"]);
        assert_eq!(rejected, 1);
        assert_eq!(aggregator.accepted(), 1);
    }
}
