use chrono::{NaiveDateTime, Timelike};
use std::collections::VecDeque;

use crate::models::{AveragedReading, InstantReading};
use crate::utils::constants::DEFAULT_WINDOW_SIZE;

/// Rolling window of per-minute readings that yields an hourly summary.
///
/// At most one reading per clock minute is kept and only the newest
/// `capacity` readings count. When a reading arrives for a different hour
/// than the previous one, the window is summarized before the new reading
/// is stored.
pub struct ReadingWindow {
    readings: VecDeque<InstantReading>,
    capacity: usize,
    last_minute: Option<NaiveDateTime>,
}

impl ReadingWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
            last_minute: None,
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Store a reading; returns the summary of the finished hour if it closes one
    pub fn push(&mut self, reading: InstantReading) -> Option<AveragedReading> {
        let minute = truncate_to_minute(reading.timestamp);

        let summary = match self.last_minute {
            Some(last) if last == minute => return None,
            Some(last) if last.hour() != minute.hour() || last.date() != minute.date() => {
                self.summarize()
            }
            _ => None,
        };

        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
        self.last_minute = Some(minute);

        summary
    }

    /// Summary of the readings currently held
    pub fn summarize(&self) -> Option<AveragedReading> {
        if self.readings.is_empty() {
            return None;
        }

        let n = self.readings.len() as f64;
        let mut hour = 0.0;
        let mut minute = 0.0;
        let mut latitude = 0.0;
        let mut longitude = 0.0;
        let mut temp_min = f64::INFINITY;
        let mut temp_max = f64::NEG_INFINITY;

        for reading in &self.readings {
            hour += f64::from(reading.timestamp.hour());
            minute += f64::from(reading.timestamp.minute());
            latitude += reading.latitude;
            longitude += reading.longitude;
            temp_min = temp_min.min(reading.temperature);
            temp_max = temp_max.max(reading.temperature);
        }

        Some(AveragedReading {
            hour: hour / n,
            minute: minute / n,
            temp_min,
            temp_max,
            latitude: latitude / n,
            longitude: longitude / n,
        })
    }
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(hour: u32, minute: u32, second: u32, temperature: f64) -> InstantReading {
        InstantReading {
            device_id: "pi".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2019, 11, 23)
                .unwrap()
                .and_hms_opt(hour, minute, second)
                .unwrap(),
            temperature,
            latitude: -25.5,
            longitude: -49.25,
        }
    }

    #[test]
    fn test_one_reading_per_minute() {
        let mut window = ReadingWindow::new();
        assert!(window.push(reading(10, 0, 5, 20.0)).is_none());
        assert!(window.push(reading(10, 0, 10, 99.0)).is_none());
        assert!(window.push(reading(10, 1, 0, 22.0)).is_none());
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_hour_change_emits_summary() {
        let mut window = ReadingWindow::new();
        window.push(reading(10, 10, 0, 18.0));
        window.push(reading(10, 20, 0, 24.0));
        window.push(reading(10, 30, 0, 21.0));

        let summary = window.push(reading(11, 0, 0, 30.0)).unwrap();
        assert_eq!(summary.hour, 10.0);
        assert_eq!(summary.minute, 20.0);
        assert_eq!(summary.temp_min, 18.0);
        assert_eq!(summary.temp_max, 24.0);
        assert_eq!(summary.to_line(), "10;20;18;24;-25.5;-49.25");
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_capacity_keeps_newest() {
        let mut window = ReadingWindow::with_capacity(2);
        window.push(reading(10, 0, 0, 5.0));
        window.push(reading(10, 1, 0, 15.0));
        window.push(reading(10, 2, 0, 25.0));

        let summary = window.summarize().unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(summary.temp_min, 15.0);
        assert_eq!(summary.temp_max, 25.0);
    }

    #[test]
    fn test_empty_window() {
        assert!(ReadingWindow::new().summarize().is_none());
    }
}
