use tracing::info;

use crate::models::{ClassifiedRecord, DeviceSnapshot, TemperatureClass};
use crate::processors::partitioner::{partition, Dataset};
use crate::processors::StreamingAggregator;
use crate::utils::GridQuantizer;

/// Turn a device snapshot into a dataset row with the averaged location on the grid
pub fn classified_record(
    snapshot: &DeviceSnapshot,
    class_label: TemperatureClass,
    quantizer: &GridQuantizer,
) -> ClassifiedRecord {
    let location = quantizer.location(snapshot.avg_latitude, snapshot.avg_longitude);
    ClassifiedRecord {
        device_id: snapshot.device_id.clone(),
        hour: snapshot.avg_hour,
        minute: snapshot.avg_minute,
        temp_min: snapshot.min_temperature,
        temp_max: snapshot.max_temperature,
        latitude: location.latitude,
        longitude: location.longitude,
        class_label,
    }
}

/// Builds labelled training/test datasets from aggregated device data
pub struct DatasetBuilder {
    quantizer: GridQuantizer,
}

impl DatasetBuilder {
    pub fn new(quantizer: GridQuantizer) -> Self {
        Self { quantizer }
    }

    /// One row per device, labelled by average temperature, ordered by device id
    pub fn classify_all(&self, aggregator: &StreamingAggregator) -> Vec<ClassifiedRecord> {
        aggregator
            .snapshots()
            .iter()
            .map(|snapshot| {
                let label = TemperatureClass::from_average(snapshot.avg_temperature);
                classified_record(snapshot, label, &self.quantizer)
            })
            .collect()
    }

    pub fn build(&self, aggregator: &StreamingAggregator) -> Dataset {
        let dataset = partition(self.classify_all(aggregator));
        info!(
            devices = aggregator.len(),
            training = dataset.training.len(),
            test = dataset.test.len(),
            "dataset partitioned"
        );
        dataset
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new(GridQuantizer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_dataset() {
        let mut aggregator = StreamingAggregator::new();
        for (device, temperature, latitude) in [
            ("deviceA", 8.0, -25.48),
            ("deviceA", 10.0, -25.52),
            ("3device", 26.0, -25.5),
            ("deviceB", 21.0, -25.5),
        ] {
            let measurement =
                Measurement::new(device, 12, 30, temperature, latitude, -49.26).unwrap();
            aggregator.ingest(&measurement);
        }

        let dataset = DatasetBuilder::default().build(&aggregator);

        assert_eq!(dataset.training.len(), 2);
        assert_eq!(dataset.test.len(), 1);

        let a = &dataset.training[0];
        assert_eq!(a.device_id, "deviceA");
        assert_eq!(a.class_label, TemperatureClass::Frio);
        assert_eq!(a.temp_min, 8.0);
        assert_eq!(a.temp_max, 10.0);
        assert_eq!(a.latitude, -25.5);
        assert_eq!(a.longitude, -49.25);

        assert_eq!(dataset.training[1].class_label, TemperatureClass::Quente);
        assert_eq!(dataset.test[0].device_id, "3device");
        assert_eq!(dataset.test[0].class_label, TemperatureClass::Alerta);
    }
}
