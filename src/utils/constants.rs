/// Grid cell size, in degrees, used to bucket nearby locations
pub const DEFAULT_GRID_SIZE: f64 = 0.05;

/// Decimal places kept after quantization
pub const QUANTIZE_DECIMALS: i32 = 2;

/// Neighbors consulted by the nearest-neighbor classifier
pub const DEFAULT_NEIGHBORS: usize = 4;

/// Instantaneous readings kept for the hourly summary
pub const DEFAULT_WINDOW_SIZE: usize = 60;

/// Temperature class thresholds (°C), lower bound inclusive
pub const MODERATE_THRESHOLD: f64 = 10.0;
pub const WARM_THRESHOLD: f64 = 20.0;
pub const ALERT_THRESHOLD: f64 = 25.0;

/// Class label names as they appear in datasets
pub const LABEL_COLD: &str = "Frio";
pub const LABEL_MODERATE: &str = "Moderado";
pub const LABEL_WARM: &str = "Quente";
pub const LABEL_ALERT: &str = "Alerta";

/// Alert payloads consumed by the actuator
pub const ALERT_ON: &str = "on";
pub const ALERT_OFF: &str = "off";

/// Dataset file names
pub const TRAINING_FILE: &str = "training.csv";
pub const TEST_FILE: &str = "test.csv";

/// Record field counts per inbound format
pub const RAW_READING_FIELDS: usize = 9;
pub const MEASUREMENT_FIELDS: usize = 7;
pub const AVERAGED_READING_FIELDS: usize = 6;
pub const INSTANT_READING_FIELDS: usize = 10;

/// Field delimiters
pub const SEMICOLON_DELIMITER: char = ';';
pub const TAB_DELIMITER: char = '\t';

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "ENVMON";

/// Default topic label for alert publications
pub const DEFAULT_ALERT_TOPIC: &str = "main/OMIoT/team/alerta";
