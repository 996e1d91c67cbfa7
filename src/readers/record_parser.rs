use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};
use crate::models::{AveragedReading, InstantReading, Measurement, RawReading};
use crate::utils::constants::{
    AVERAGED_READING_FIELDS, INSTANT_READING_FIELDS, MEASUREMENT_FIELDS, RAW_READING_FIELDS,
    SEMICOLON_DELIMITER, TAB_DELIMITER,
};

/// Parser for the delimited text records exchanged between the pipeline stages
pub struct RecordParser {
    delimiter: Option<char>,
}

impl RecordParser {
    /// Parser that picks tab when the line has one, semicolon otherwise
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Split a line into trimmed fields
    pub fn split_fields<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let line = line.trim_end_matches(['\r', '\n']);
        let delimiter = self.delimiter.unwrap_or(if line.contains(TAB_DELIMITER) {
            TAB_DELIMITER
        } else {
            SEMICOLON_DELIMITER
        });
        line.split(delimiter).map(str::trim).collect()
    }

    /// `device, hour, minute, temperature, latitude, longitude, occurrences`
    pub fn parse_measurement(&self, line: &str) -> Result<Measurement> {
        let parts = self.split_fields(line);
        expect_fields(&parts, MEASUREMENT_FIELDS)?;

        let device_id = required(parts[0], "device_id")?;
        Measurement::with_occurrences(
            device_id,
            parse_field(parts[1], "hour")?,
            parse_field(parts[2], "minute")?,
            parse_float(parts[3], "temperature")?,
            parse_float(parts[4], "latitude")?,
            parse_float(parts[5], "longitude")?,
            parse_field(parts[6], "occurrence_count")?,
        )
    }

    /// `device, hour, minute, year, month, day, temperature, latitude, longitude`
    pub fn parse_raw_reading(&self, line: &str) -> Result<RawReading> {
        let parts = self.split_fields(line);
        expect_fields(&parts, RAW_READING_FIELDS)?;

        // A blank anywhere drops the whole line
        const NAMES: [&str; RAW_READING_FIELDS] = [
            "device_id",
            "hour",
            "minute",
            "year",
            "month",
            "day",
            "temperature",
            "latitude",
            "longitude",
        ];
        for (value, field) in parts.iter().zip(NAMES) {
            required(value, field)?;
        }

        let hour: u32 = parse_field(parts[1], "hour")?;
        let minute: u32 = parse_field(parts[2], "minute")?;
        check_clock(hour, minute)?;

        Ok(RawReading {
            device_id: parts[0].to_string(),
            hour,
            minute,
            date: parse_date(parts[3], parts[4], parts[5])?,
            temperature: parse_float(parts[6], "temperature")?,
            latitude: parse_float(parts[7], "latitude")?,
            longitude: parse_float(parts[8], "longitude")?,
        })
    }

    /// `hour, minute, temp_min, temp_max, latitude, longitude`
    pub fn parse_averaged_reading(&self, line: &str) -> Result<AveragedReading> {
        let parts = self.split_fields(line);
        expect_fields(&parts, AVERAGED_READING_FIELDS)?;

        Ok(AveragedReading {
            hour: parse_float(parts[0], "hour")?,
            minute: parse_float(parts[1], "minute")?,
            temp_min: parse_float(parts[2], "temp_min")?,
            temp_max: parse_float(parts[3], "temp_max")?,
            latitude: parse_float(parts[4], "latitude")?,
            longitude: parse_float(parts[5], "longitude")?,
        })
    }

    /// `id, year, month, day, hour, minute, second, temperature, latitude, longitude`
    pub fn parse_instant_reading(&self, line: &str) -> Result<InstantReading> {
        let parts = self.split_fields(line);
        expect_fields(&parts, INSTANT_READING_FIELDS)?;

        let device_id = required(parts[0], "device_id")?;
        let date = parse_date(parts[1], parts[2], parts[3])?;
        let hour: u32 = parse_field(parts[4], "hour")?;
        let minute: u32 = parse_field(parts[5], "minute")?;
        let second: u32 = parse_field(parts[6], "second")?;
        let timestamp = date.and_hms_opt(hour, minute, second).ok_or_else(|| {
            ProcessingError::malformed(format!(
                "invalid time {:02}:{:02}:{:02}",
                hour, minute, second
            ))
        })?;

        Ok(InstantReading {
            device_id: device_id.to_string(),
            timestamp,
            temperature: parse_float(parts[7], "temperature")?,
            latitude: parse_float(parts[8], "latitude")?,
            longitude: parse_float(parts[9], "longitude")?,
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_fields(parts: &[&str], expected: usize) -> Result<()> {
    if parts.len() != expected {
        return Err(ProcessingError::malformed(format!(
            "expected {} fields, found {}",
            expected,
            parts.len()
        )));
    }
    Ok(())
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(ProcessingError::EmptyField { field })
    } else {
        Ok(value)
    }
}

fn parse_field<T: FromStr>(value: &str, field: &'static str) -> Result<T> {
    required(value, field)?
        .parse::<T>()
        .map_err(|_| ProcessingError::malformed(format!("invalid {}: '{}'", field, value)))
}

fn parse_float(value: &str, field: &'static str) -> Result<f64> {
    let parsed: f64 = parse_field(value, field)?;
    if !parsed.is_finite() {
        return Err(ProcessingError::malformed(format!(
            "non-finite {}: '{}'",
            field, value
        )));
    }
    Ok(parsed)
}

fn parse_date(year: &str, month: &str, day: &str) -> Result<NaiveDate> {
    let y: i32 = parse_field(year, "year")?;
    let m: u32 = parse_field(month, "month")?;
    let d: u32 = parse_field(day, "day")?;
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| ProcessingError::malformed(format!("invalid date {}-{}-{}", y, m, d)))
}

fn check_clock(hour: u32, minute: u32) -> Result<()> {
    if hour > 23 || minute > 59 {
        return Err(ProcessingError::malformed(format!(
            "invalid time {:02}:{:02}",
            hour, minute
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_measurement_tab_and_semicolon() {
        let parser = RecordParser::new();

        let tab = parser
            .parse_measurement("deviceA\t14\t30\t22.5\t-25.5\t-49.25\t1\n")
            .unwrap();
        let semi = parser
            .parse_measurement("deviceA;14;30;22.5;-25.5;-49.25;1")
            .unwrap();

        assert_eq!(tab, semi);
        assert_eq!(tab.device_id, "deviceA");
        assert_eq!(tab.hour, 14);
        assert_eq!(tab.temperature, 22.5);
        assert_eq!(tab.occurrence_count, 1);
    }

    #[test]
    fn test_parse_measurement_errors() {
        let parser = RecordParser::new();

        assert!(matches!(
            parser.parse_measurement("deviceA\t14\t30\tabc\t-25.5\t-49.25\t1"),
            Err(ProcessingError::MalformedRecord { .. })
        ));
        assert!(matches!(
            parser.parse_measurement("deviceA\t14\t30\t\t-25.5\t-49.25\t1"),
            Err(ProcessingError::EmptyField {
                field: "temperature"
            })
        ));
        assert!(matches!(
            parser.parse_measurement("\t14\t30\t20\t-25.5\t-49.25\t1"),
            Err(ProcessingError::EmptyField { field: "device_id" })
        ));
        assert!(matches!(
            parser.parse_measurement("deviceA\t14\t30\t20"),
            Err(ProcessingError::MalformedRecord { .. })
        ));
        assert!(matches!(
            parser.parse_measurement("deviceA\t25\t30\t20\t-25.5\t-49.25\t1"),
            Err(ProcessingError::Validation(_))
        ));
        assert!(parser
            .parse_measurement("deviceA\t14\t30\tNaN\t-25.5\t-49.25\t1")
            .is_err());
    }

    #[test]
    fn test_parse_raw_reading() {
        let parser = RecordParser::new();
        let reading = parser
            .parse_raw_reading("b8:27:eb:01;13;42;2019;11;23;24.0;-25.4966884;-49.2619725")
            .unwrap();

        assert_eq!(reading.device_id, "b8:27:eb:01");
        assert_eq!(reading.hour, 13);
        assert_eq!(reading.date, NaiveDate::from_ymd_opt(2019, 11, 23).unwrap());
        assert_eq!(reading.latitude, -25.4966884);

        assert!(matches!(
            parser.parse_raw_reading("b8:27:eb:01;13;42;2019;;23;24.0;-25.49;-49.26"),
            Err(ProcessingError::EmptyField { field: "month" })
        ));
        assert!(parser
            .parse_raw_reading("b8:27:eb:01;13;42;2019;2;30;24.0;-25.49;-49.26")
            .is_err());
    }

    #[test]
    fn test_parse_averaged_reading() {
        let parser = RecordParser::new();
        let reading = parser
            .parse_averaged_reading("14.5;29.5;18.0;27.0;-25.5;-49.25")
            .unwrap();

        assert_eq!(reading.features(), [18.0, 27.0, -25.5, -49.25]);
        assert!(parser.parse_averaged_reading("14.5;29.5;18.0").is_err());
    }

    #[test]
    fn test_parse_instant_reading() {
        let parser = RecordParser::new();
        let reading = parser
            .parse_instant_reading("b8:27:eb:01;2019;11;23;13;42;5;24.0;-25.4966884;-49.2619725")
            .unwrap();

        assert_eq!(reading.timestamp.to_string(), "2019-11-23 13:42:05");
        assert!(parser
            .parse_instant_reading("b8:27:eb:01;2019;11;23;24;42;5;24.0;-25.49;-49.26")
            .is_err());
    }

    #[test]
    fn test_forced_delimiter() {
        let parser = RecordParser::with_delimiter(',');
        assert_eq!(parser.split_fields("a, b ,c"), vec!["a", "b", "c"]);
    }
}
