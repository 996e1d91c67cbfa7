pub mod evaluation;
pub mod knn;

pub use evaluation::{evaluate, EvaluationReport};
pub use knn::KnnClassifier;
