use serde::{Deserialize, Serialize};

use crate::models::Measurement;

/// Running summary of every measurement seen for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAggregate {
    pub device_id: String,
    pub sum_hour: f64,
    pub sum_minute: f64,
    pub sum_temperature: f64,
    pub sum_latitude: f64,
    pub sum_longitude: f64,
    pub count: u64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

/// Averages and extremes derived from a [`DeviceAggregate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub count: u64,
    pub avg_hour: f64,
    pub avg_minute: f64,
    pub avg_temperature: f64,
    pub avg_latitude: f64,
    pub avg_longitude: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl DeviceAggregate {
    /// Seed an aggregate from the first measurement of a device.
    ///
    /// `weight` is the number of samples the measurement stands for; every
    /// summed field is scaled by it.
    pub fn seed(measurement: &Measurement, weight: u32) -> Self {
        let w = f64::from(weight);
        Self {
            device_id: measurement.device_id.clone(),
            sum_hour: f64::from(measurement.hour) * w,
            sum_minute: f64::from(measurement.minute) * w,
            sum_temperature: measurement.temperature * w,
            sum_latitude: measurement.latitude * w,
            sum_longitude: measurement.longitude * w,
            count: u64::from(weight),
            min_temperature: measurement.temperature,
            max_temperature: measurement.temperature,
        }
    }

    pub fn add(&mut self, measurement: &Measurement, weight: u32) {
        let w = f64::from(weight);
        self.sum_hour += f64::from(measurement.hour) * w;
        self.sum_minute += f64::from(measurement.minute) * w;
        self.sum_temperature += measurement.temperature * w;
        self.sum_latitude += measurement.latitude * w;
        self.sum_longitude += measurement.longitude * w;
        self.count += u64::from(weight);

        if measurement.temperature < self.min_temperature {
            self.min_temperature = measurement.temperature;
        }
        if measurement.temperature > self.max_temperature {
            self.max_temperature = measurement.temperature;
        }
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        let n = self.count as f64;
        DeviceSnapshot {
            device_id: self.device_id.clone(),
            count: self.count,
            avg_hour: self.sum_hour / n,
            avg_minute: self.sum_minute / n,
            avg_temperature: self.sum_temperature / n,
            avg_latitude: self.sum_latitude / n,
            avg_longitude: self.sum_longitude / n,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        }
    }
}
