use std::collections::BTreeMap;

use crate::classifiers::KnnClassifier;
use crate::error::Result;
use crate::models::{FeatureVector, TemperatureClass, TrainingSample};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    /// (actual, predicted) -> count
    pub confusion: BTreeMap<(TemperatureClass, TemperatureClass), usize>,
}

impl EvaluationReport {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    pub fn count(&self, actual: TemperatureClass, predicted: TemperatureClass) -> usize {
        self.confusion.get(&(actual, predicted)).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Classifier Evaluation ===\n");
        summary.push_str(&format!("Test Samples: {}\n", self.total));
        summary.push_str(&format!(
            "Correct: {} ({:.1}%)\n",
            self.correct,
            100.0 * self.accuracy()
        ));

        summary.push_str("\nConfusion (actual -> predicted):\n");
        summary.push_str(&format!("{:>10}", ""));
        for predicted in TemperatureClass::ALL {
            summary.push_str(&format!("{:>10}", predicted.as_str()));
        }
        summary.push('\n');
        for actual in TemperatureClass::ALL {
            summary.push_str(&format!("{:>10}", actual.as_str()));
            for predicted in TemperatureClass::ALL {
                summary.push_str(&format!("{:>10}", self.count(actual, predicted)));
            }
            summary.push('\n');
        }

        summary
    }
}

/// Score `test` against a trained classifier
pub fn evaluate(classifier: &KnnClassifier, test: &[TrainingSample]) -> Result<EvaluationReport> {
    let features: Vec<FeatureVector> = test.iter().map(|s| s.features).collect();
    let predictions = classifier.predict_batch(&features)?;

    let mut report = EvaluationReport {
        total: test.len(),
        ..Default::default()
    };
    for (sample, predicted) in test.iter().zip(predictions) {
        if sample.label == predicted {
            report.correct += 1;
        }
        *report.confusion.entry((sample.label, predicted)).or_insert(0) += 1;
    }

    Ok(report)
}
