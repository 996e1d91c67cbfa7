use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::FeatureVector;

/// Sensor reading as exported by the field devices, before quantization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub device_id: String,
    pub hour: u32,
    pub minute: u32,
    pub date: NaiveDate,
    pub temperature: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Timestamped sample taken once per minute on a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantReading {
    pub device_id: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Hourly summary published by a device and scored by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedReading {
    pub hour: f64,
    pub minute: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl AveragedReading {
    pub fn features(&self) -> FeatureVector {
        [self.temp_min, self.temp_max, self.latitude, self.longitude]
    }

    /// Semicolon-separated line in the averaged reading format
    pub fn to_line(&self) -> String {
        format!(
            "{};{};{};{};{};{}",
            self.hour, self.minute, self.temp_min, self.temp_max, self.latitude, self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averaged_reading_line_and_features() {
        let reading = AveragedReading {
            hour: 14.5,
            minute: 29.5,
            temp_min: 18.0,
            temp_max: 27.0,
            latitude: -25.5,
            longitude: -49.25,
        };

        assert_eq!(reading.to_line(), "14.5;29.5;18;27;-25.5;-49.25");
        assert_eq!(reading.features(), [18.0, 27.0, -25.5, -49.25]);
    }
}
