use crate::error::Result;
use crate::models::{Measurement, RawReading};
use crate::readers::RecordParser;
use crate::utils::GridQuantizer;

/// Map stage: raw device readings to grid-quantized single-sample measurements
pub struct GridMapper {
    quantizer: GridQuantizer,
    parser: RecordParser,
}

impl GridMapper {
    pub fn new(quantizer: GridQuantizer) -> Self {
        Self {
            quantizer,
            parser: RecordParser::new(),
        }
    }

    pub fn map_reading(&self, reading: &RawReading) -> Result<Measurement> {
        let location = self.quantizer.location(reading.latitude, reading.longitude);
        Measurement::new(
            reading.device_id.clone(),
            reading.hour,
            reading.minute,
            reading.temperature,
            location.latitude,
            location.longitude,
        )
    }

    pub fn map_line(&self, line: &str) -> Result<Measurement> {
        let reading = self.parser.parse_raw_reading(line)?;
        self.map_reading(&reading)
    }
}

impl Default for GridMapper {
    fn default() -> Self {
        Self::new(GridQuantizer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;

    #[test]
    fn test_map_line_quantizes_location() {
        let mapper = GridMapper::default();
        let measurement = mapper
            .map_line("b8:27:eb:01;13;42;2019;11;23;24.0;-25.4966884;-49.2619725")
            .unwrap();

        assert_eq!(measurement.device_id, "b8:27:eb:01");
        assert_eq!(measurement.latitude, -25.5);
        assert_eq!(measurement.longitude, -49.25);
        assert_eq!(measurement.occurrence_count, 1);
        assert_eq!(measurement.to_line(), "b8:27:eb:01\t13\t42\t24\t-25.5\t-49.25\t1");
    }

    #[test]
    fn test_map_line_drops_blank_fields() {
        let mapper = GridMapper::default();
        assert!(matches!(
            mapper.map_line("b8:27:eb:01;13;42;2019;11;23;;-25.49;-49.26"),
            Err(ProcessingError::EmptyField {
                field: "temperature"
            })
        ));
    }

    #[test]
    fn test_coarser_grid() {
        let mapper = GridMapper::new(GridQuantizer::new(0.5).unwrap());
        let measurement = mapper
            .map_line("dev;0;0;2020;1;1;10.0;-25.4966884;-49.2619725")
            .unwrap();
        assert_eq!(measurement.latitude, -25.5);
        assert_eq!(measurement.longitude, -49.5);
    }
}
