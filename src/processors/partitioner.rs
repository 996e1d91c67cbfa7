use serde::Serialize;

use crate::models::ClassifiedRecord;

/// Classified records split into two disjoint sets, input order kept
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub training: Vec<ClassifiedRecord>,
    pub test: Vec<ClassifiedRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.training.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training.is_empty() && self.test.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Training,
    Test,
}

/// Routes devices whose id starts with an ASCII digit to the test set.
///
/// An empty id has no leading digit and goes to training.
pub fn partition_of(device_id: &str) -> Partition {
    match device_id.chars().next() {
        Some(c) if c.is_ascii_digit() => Partition::Test,
        _ => Partition::Training,
    }
}

pub fn partition<I>(records: I) -> Dataset
where
    I: IntoIterator<Item = ClassifiedRecord>,
{
    let mut dataset = Dataset::default();
    for record in records {
        match partition_of(&record.device_id) {
            Partition::Test => dataset.test.push(record),
            Partition::Training => dataset.training.push(record),
        }
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemperatureClass;

    fn record(device_id: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            device_id: device_id.to_string(),
            hour: 12.0,
            minute: 0.0,
            temp_min: 15.0,
            temp_max: 21.0,
            latitude: -25.5,
            longitude: -49.25,
            class_label: TemperatureClass::Moderado,
        }
    }

    #[test]
    fn test_partition_rule() {
        assert_eq!(partition_of("3device"), Partition::Test);
        assert_eq!(partition_of("deviceA"), Partition::Training);
        assert_eq!(partition_of(""), Partition::Training);
        assert_eq!(partition_of("b8:27:eb"), Partition::Training);
        assert_eq!(partition_of("00:1b:44"), Partition::Test);
        // only ASCII digits count
        assert_eq!(partition_of("٣device"), Partition::Training);
    }

    #[test]
    fn test_partition_is_disjoint_and_ordered() {
        let dataset = partition(vec![
            record("deviceA"),
            record("3device"),
            record(""),
            record("7z"),
            record("deviceB"),
        ]);

        let training: Vec<&str> = dataset.training.iter().map(|r| r.device_id.as_str()).collect();
        let test: Vec<&str> = dataset.test.iter().map(|r| r.device_id.as_str()).collect();

        assert_eq!(training, vec!["deviceA", "", "deviceB"]);
        assert_eq!(test, vec!["3device", "7z"]);
        assert_eq!(dataset.len(), 5);
    }

    #[test]
    fn test_empty_input() {
        let dataset = partition(Vec::new());
        assert!(dataset.is_empty());
    }
}
