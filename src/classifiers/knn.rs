use rayon::prelude::*;
use std::collections::HashMap;

use crate::error::{ProcessingError, Result};
use crate::models::{FeatureVector, TemperatureClass, TrainingSample};
use crate::utils::constants::DEFAULT_NEIGHBORS;

/// k-nearest-neighbor classifier over (temp_min, temp_max, latitude, longitude).
///
/// Neighbors are ranked by Euclidean distance, equal distances by training
/// order. The label with the most votes among the `k` nearest wins; when
/// several labels share the top count, the one held by the closest neighbor
/// wins. Prediction is deterministic for a fixed model and input.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    samples: Option<Vec<TrainingSample>>,
}

impl KnnClassifier {
    pub fn new() -> Self {
        Self {
            k: DEFAULT_NEIGHBORS,
            samples: None,
        }
    }

    pub fn with_neighbors(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(ProcessingError::Config(
                "number of neighbors must be at least 1".to_string(),
            ));
        }
        Ok(Self { k, samples: None })
    }

    pub fn neighbors(&self) -> usize {
        self.k
    }

    pub fn is_trained(&self) -> bool {
        self.samples.is_some()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.as_ref().map_or(0, Vec::len)
    }

    /// Replace the model with `samples`
    pub fn fit<I>(&mut self, samples: I) -> Result<()>
    where
        I: IntoIterator<Item = TrainingSample>,
    {
        let samples: Vec<TrainingSample> = samples.into_iter().collect();
        if samples.is_empty() {
            return Err(ProcessingError::NoTrainingData);
        }
        if samples
            .iter()
            .any(|s| s.features.iter().any(|v| !v.is_finite()))
        {
            return Err(ProcessingError::malformed("non-finite feature in training sample"));
        }

        self.samples = Some(samples);
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<TemperatureClass> {
        let samples = self.samples.as_ref().ok_or(ProcessingError::ModelNotTrained)?;
        if features.iter().any(|v| !v.is_finite()) {
            return Err(ProcessingError::malformed("non-finite feature in query"));
        }

        let mut ranked: Vec<(f64, usize)> = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| (squared_distance(&sample.features, features), index))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(self.k);

        let mut votes: HashMap<TemperatureClass, usize> = HashMap::new();
        for (_, index) in &ranked {
            *votes.entry(samples[*index].label).or_insert(0) += 1;
        }
        let top = votes.values().copied().max().unwrap_or(0);

        // ranked is nearest-first, so the first tied label belongs to the closest neighbor
        ranked
            .iter()
            .map(|(_, index)| samples[*index].label)
            .find(|label| votes.get(label) == Some(&top))
            .ok_or(ProcessingError::NoTrainingData)
    }

    /// Score many vectors in parallel, keeping input order
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<TemperatureClass>> {
        if !self.is_trained() {
            return Err(ProcessingError::ModelNotTrained);
        }
        features.par_iter().map(|f| self.predict(f)).collect()
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
