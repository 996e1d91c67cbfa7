use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::processors::IngestMode;
use crate::utils::constants::{
    DEFAULT_ALERT_TOPIC, DEFAULT_GRID_SIZE, DEFAULT_NEIGHBORS, DEFAULT_WINDOW_SIZE, ENV_PREFIX,
};
use crate::utils::GridQuantizer;

/// Runtime settings: defaults, then an optional config file, then `ENVMON_*` variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub grid_size: f64,

    #[validate(range(min = 1))]
    pub neighbors: usize,

    pub ingest_mode: IngestMode,

    #[validate(range(min = 1))]
    pub window_size: usize,

    /// "," or "tab"
    pub output_delimiter: String,

    pub alert_topic: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            neighbors: DEFAULT_NEIGHBORS,
            ingest_mode: IngestMode::Weighted,
            window_size: DEFAULT_WINDOW_SIZE,
            output_delimiter: ",".to_string(),
            alert_topic: DEFAULT_ALERT_TOPIC.to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("grid_size", defaults.grid_size)?
            .set_default("neighbors", defaults.neighbors as i64)?
            .set_default("ingest_mode", "weighted")?
            .set_default("window_size", defaults.window_size as i64)?
            .set_default("output_delimiter", defaults.output_delimiter)?
            .set_default("alert_topic", defaults.alert_topic)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    /// Startup validation; any failure here is fatal
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.quantizer()?;
        self.delimiter()?;
        Ok(())
    }

    pub fn quantizer(&self) -> Result<GridQuantizer> {
        GridQuantizer::new(self.grid_size)
    }

    pub fn delimiter(&self) -> Result<u8> {
        parse_delimiter(&self.output_delimiter)
    }
}

fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "," | "comma" => Ok(b','),
        "\t" | "tab" => Ok(b'\t'),
        other => Err(ProcessingError::Config(format!(
            "output delimiter must be ',' or 'tab', got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.grid_size, 0.05);
        assert_eq!(settings.neighbors, 4);
        assert_eq!(settings.ingest_mode, IngestMode::Weighted);
        assert_eq!(settings.window_size, 60);
        assert_eq!(settings.delimiter().unwrap(), b',');
    }

    #[test]
    fn test_file_overrides() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "grid_size = 0.1")?;
        writeln!(file, "ingest_mode = \"single\"")?;
        writeln!(file, "output_delimiter = \"tab\"")?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.grid_size, 0.1);
        assert_eq!(settings.ingest_mode, IngestMode::Single);
        assert_eq!(settings.delimiter()?, b'\t');
        assert_eq!(settings.neighbors, 4);
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "alert_topic = \"from/file\"")?;

        // only alert_topic is touched so parallel tests reading defaults are unaffected
        std::env::set_var("ENVMON_ALERT_TOPIC", "site/alerta");
        let settings = Settings::load(Some(file.path()));
        std::env::remove_var("ENVMON_ALERT_TOPIC");

        assert_eq!(settings?.alert_topic, "site/alerta");
        Ok(())
    }

    #[test]
    fn test_invalid_grid_is_fatal() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "grid_size = 0.0")?;

        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(ProcessingError::InvalidGridSize(_))
        ));
        Ok(())
    }

    #[test]
    fn test_check_rejects_bad_values() {
        let settings = Settings {
            neighbors: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.check(), Err(ProcessingError::Validation(_))));

        let settings = Settings {
            output_delimiter: "|".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.check(), Err(ProcessingError::Config(_))));
    }
}
