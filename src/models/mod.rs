pub mod aggregate;
pub mod classified;
pub mod measurement;
pub mod readings;

pub use aggregate::{DeviceAggregate, DeviceSnapshot};
pub use classified::{
    AlertSignal, ClassifiedRecord, FeatureVector, TemperatureClass, TrainingSample,
};
pub use measurement::Measurement;
pub use readings::{AveragedReading, InstantReading, RawReading};
