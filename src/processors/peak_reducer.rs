use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::Measurement;
use crate::readers::RecordParser;

/// Highest temperature seen for a device and where it was measured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    pub device_id: String,
    pub temperature: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Peak {
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}, {}",
            self.device_id, self.temperature, self.latitude, self.longitude
        )
    }
}

/// Reduce stage keeping the per-device maximum temperature.
/// On equal maxima the earlier location is kept.
pub struct PeakReducer {
    peaks: HashMap<String, Peak>,
    parser: RecordParser,
    rejected: u64,
}

impl PeakReducer {
    pub fn new() -> Self {
        Self {
            peaks: HashMap::new(),
            parser: RecordParser::new(),
            rejected: 0,
        }
    }

    pub fn ingest(&mut self, measurement: &Measurement) {
        match self.peaks.get_mut(&measurement.device_id) {
            Some(peak) if peak.temperature < measurement.temperature => {
                peak.temperature = measurement.temperature;
                peak.latitude = measurement.latitude;
                peak.longitude = measurement.longitude;
            }
            Some(_) => {}
            None => {
                self.peaks.insert(
                    measurement.device_id.clone(),
                    Peak {
                        device_id: measurement.device_id.clone(),
                        temperature: measurement.temperature,
                        latitude: measurement.latitude,
                        longitude: measurement.longitude,
                    },
                );
            }
        }
    }

    pub fn ingest_line(&mut self, line: &str) -> Result<()> {
        match self.parser.parse_measurement(line) {
            Ok(measurement) => {
                self.ingest(&measurement);
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                Err(e)
            }
        }
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Peaks ordered by device id
    pub fn peaks(&self) -> Vec<Peak> {
        let mut peaks: Vec<Peak> = self.peaks.values().cloned().collect();
        peaks.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        peaks
    }
}

impl Default for PeakReducer {
    fn default() -> Self {
        Self::new()
    }
}
