use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    ALERT_OFF, ALERT_ON, ALERT_THRESHOLD, LABEL_ALERT, LABEL_COLD, LABEL_MODERATE, LABEL_WARM,
    MODERATE_THRESHOLD, WARM_THRESHOLD,
};

/// (temp_min, temp_max, latitude, longitude)
pub type FeatureVector = [f64; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemperatureClass {
    Frio,
    Moderado,
    Quente,
    Alerta,
}

impl TemperatureClass {
    pub const ALL: [TemperatureClass; 4] = [
        TemperatureClass::Frio,
        TemperatureClass::Moderado,
        TemperatureClass::Quente,
        TemperatureClass::Alerta,
    ];

    /// Label an average temperature; each band includes its lower bound.
    pub fn from_average(avg_temperature: f64) -> Self {
        if avg_temperature < MODERATE_THRESHOLD {
            TemperatureClass::Frio
        } else if avg_temperature < WARM_THRESHOLD {
            TemperatureClass::Moderado
        } else if avg_temperature < ALERT_THRESHOLD {
            TemperatureClass::Quente
        } else {
            TemperatureClass::Alerta
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureClass::Frio => LABEL_COLD,
            TemperatureClass::Moderado => LABEL_MODERATE,
            TemperatureClass::Quente => LABEL_WARM,
            TemperatureClass::Alerta => LABEL_ALERT,
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, TemperatureClass::Alerta)
    }
}

impl fmt::Display for TemperatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemperatureClass {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            LABEL_COLD => Ok(TemperatureClass::Frio),
            LABEL_MODERATE => Ok(TemperatureClass::Moderado),
            LABEL_WARM => Ok(TemperatureClass::Quente),
            LABEL_ALERT => Ok(TemperatureClass::Alerta),
            other => Err(ProcessingError::malformed(format!(
                "unknown temperature class '{}'",
                other
            ))),
        }
    }
}

/// Binary signal for the alert actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSignal {
    On,
    Off,
}

impl AlertSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSignal::On => ALERT_ON,
            AlertSignal::Off => ALERT_OFF,
        }
    }
}

impl From<TemperatureClass> for AlertSignal {
    fn from(class: TemperatureClass) -> Self {
        if class.is_alert() {
            AlertSignal::On
        } else {
            AlertSignal::Off
        }
    }
}

impl fmt::Display for AlertSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-device dataset row. Column names match the training files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(rename = "dispositivo")]
    pub device_id: String,

    #[serde(rename = "hora")]
    pub hour: f64,

    #[serde(rename = "minuto")]
    pub minute: f64,

    #[serde(rename = "temp_minima")]
    pub temp_min: f64,

    #[serde(rename = "temp_maxima")]
    pub temp_max: f64,

    pub latitude: f64,
    pub longitude: f64,

    #[serde(rename = "Classe")]
    pub class_label: TemperatureClass,
}

impl ClassifiedRecord {
    pub fn features(&self) -> FeatureVector {
        [self.temp_min, self.temp_max, self.latitude, self.longitude]
    }

    pub fn alert_signal(&self) -> AlertSignal {
        AlertSignal::from(self.class_label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub label: TemperatureClass,
}

impl TrainingSample {
    pub fn new(features: FeatureVector, label: TemperatureClass) -> Self {
        Self { features, label }
    }
}

impl From<&ClassifiedRecord> for TrainingSample {
    fn from(record: &ClassifiedRecord) -> Self {
        Self::new(record.features(), record.class_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(TemperatureClass::from_average(9.99), TemperatureClass::Frio);
        assert_eq!(TemperatureClass::from_average(10.0), TemperatureClass::Moderado);
        assert_eq!(TemperatureClass::from_average(19.99), TemperatureClass::Moderado);
        assert_eq!(TemperatureClass::from_average(20.0), TemperatureClass::Quente);
        assert_eq!(TemperatureClass::from_average(24.99), TemperatureClass::Quente);
        assert_eq!(TemperatureClass::from_average(25.0), TemperatureClass::Alerta);
        assert_eq!(TemperatureClass::from_average(-5.0), TemperatureClass::Frio);
    }

    #[test]
    fn test_class_names_round_trip() {
        for class in TemperatureClass::ALL {
            assert_eq!(class.to_string().parse::<TemperatureClass>().unwrap(), class);
        }
        assert!("Morno".parse::<TemperatureClass>().is_err());
    }

    #[test]
    fn test_alert_signal() {
        assert_eq!(AlertSignal::from(TemperatureClass::Alerta), AlertSignal::On);
        assert_eq!(AlertSignal::from(TemperatureClass::Quente), AlertSignal::Off);
        assert_eq!(AlertSignal::On.to_string(), "on");
        assert_eq!(AlertSignal::Off.to_string(), "off");
    }
}
