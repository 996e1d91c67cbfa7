use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// A per-device temperature measurement, either a single sample or a
/// pre-aggregated batch of `occurrence_count` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Measurement {
    pub device_id: String,

    #[validate(range(max = 23))]
    pub hour: u32,

    #[validate(range(max = 59))]
    pub minute: u32,

    pub temperature: f64,

    pub latitude: f64,

    pub longitude: f64,

    #[validate(range(min = 1))]
    pub occurrence_count: u32,
}

impl Measurement {
    /// Build a single-sample measurement.
    ///
    /// Only the clock fields and the occurrence count are range checked;
    /// temperature and position accept any finite value.
    pub fn new(
        device_id: impl Into<String>,
        hour: u32,
        minute: u32,
        temperature: f64,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self> {
        Self::with_occurrences(device_id, hour, minute, temperature, latitude, longitude, 1)
    }

    pub fn with_occurrences(
        device_id: impl Into<String>,
        hour: u32,
        minute: u32,
        temperature: f64,
        latitude: f64,
        longitude: f64,
        occurrence_count: u32,
    ) -> Result<Self> {
        if ![temperature, latitude, longitude].iter().all(|v| v.is_finite()) {
            return Err(ProcessingError::malformed("non-finite numeric value"));
        }

        let measurement = Self {
            device_id: device_id.into(),
            hour,
            minute,
            temperature,
            latitude,
            longitude,
            occurrence_count,
        };
        measurement.validate()?;
        Ok(measurement)
    }

    /// Tab-separated line in the measurement record format
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.device_id,
            self.hour,
            self.minute,
            self.temperature,
            self.latitude,
            self.longitude,
            self.occurrence_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_validation() {
        assert!(Measurement::new("dev1", 12, 30, 21.5, -25.5, -49.25).is_ok());

        assert!(matches!(
            Measurement::new("dev1", 24, 0, 21.5, -25.5, -49.25),
            Err(ProcessingError::Validation(_))
        ));
        assert!(Measurement::new("dev1", 12, 60, 21.5, -25.5, -49.25).is_err());
        assert!(Measurement::new("dev1", 12, 0, 65.0, -25.5, -49.25).is_ok());
        assert!(Measurement::new("dev1", 12, 0, -60.0, 91.0, 200.0).is_ok());
        assert!(matches!(
            Measurement::new("dev1", 12, 0, f64::NAN, -25.5, -49.25),
            Err(ProcessingError::MalformedRecord { .. })
        ));
        assert!(Measurement::with_occurrences("dev1", 12, 0, 21.5, -25.5, -49.25, 0).is_err());
    }

    #[test]
    fn test_to_line() {
        let m = Measurement::with_occurrences("b8:27:eb", 9, 5, 23.0, -25.5, -49.25, 3).unwrap();
        assert_eq!(m.to_line(), "b8:27:eb\t9\t5\t23\t-25.5\t-49.25\t3");
    }
}
