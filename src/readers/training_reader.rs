use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{TemperatureClass, TrainingSample};

/// Columns used from a labelled dataset file; other columns are ignored
#[derive(Debug, Deserialize)]
struct TrainingRow {
    temp_minima: f64,
    temp_maxima: f64,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "Classe")]
    classe: TemperatureClass,
}

/// Reader for labelled sample CSV files
pub struct TrainingReader {
    strict: bool,
    delimiter: u8,
}

impl TrainingReader {
    pub fn new() -> Self {
        Self {
            strict: false,
            delimiter: b',',
        }
    }

    /// In strict mode a bad row fails the whole read instead of being skipped
    pub fn with_strict(strict: bool) -> Self {
        Self {
            strict,
            ..Self::new()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn read_samples(&self, path: &Path) -> Result<Vec<TrainingSample>> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let samples = self.collect_samples(reader)?;

        info!(
            path = %path.display(),
            samples = samples.len(),
            "loaded training samples"
        );
        Ok(samples)
    }

    pub fn read_samples_from<R: Read>(&self, input: R) -> Result<Vec<TrainingSample>> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(input);
        self.collect_samples(reader)
    }

    fn collect_samples<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<Vec<TrainingSample>> {
        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for (row_index, row) in reader.deserialize::<TrainingRow>().enumerate() {
            match row {
                Ok(row) => {
                    let features = [row.temp_minima, row.temp_maxima, row.latitude, row.longitude];
                    if features.iter().all(|v| v.is_finite()) {
                        samples.push(TrainingSample::new(features, row.classe));
                        continue;
                    }
                    if self.strict {
                        return Err(ProcessingError::malformed(format!(
                            "non-finite feature in training row {}",
                            row_index + 1
                        )));
                    }
                    skipped += 1;
                }
                Err(e) if self.strict => return Err(e.into()),
                Err(e) => {
                    warn!(row = row_index + 1, error = %e, "skipping training row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "training rows rejected");
        }
        if samples.is_empty() {
            return Err(ProcessingError::NoTrainingData);
        }

        Ok(samples)
    }
}

impl Default for TrainingReader {
    fn default() -> Self {
        Self::new()
    }
}
