use crate::error::CliError;
use amchar_core::ModemConfig;
use serde::Deserialize;
use std::path::Path;

/// Signal parameters read from a JSON file
///
/// Every key is optional; missing keys keep the value they had before the
/// file was applied.
///
/// ```json
/// { "carrierFrequency": 1000000, "freq0": 1000, "freq1": 2000,
///   "sampleRate": 5000000, "bitDuration": 0.01, "modulationIndex": 0.5 }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub carrier_frequency: Option<f64>,
    pub freq0: Option<f64>,
    pub freq1: Option<f64>,
    pub sample_rate: Option<f64>,
    pub bit_duration: Option<f64>,
    pub modulation_index: Option<f64>,
    pub singularity_threshold: Option<f64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Overlay the values present in this file onto `config`
    pub fn apply(&self, mut config: ModemConfig) -> ModemConfig {
        if let Some(v) = self.carrier_frequency {
            config.carrier_frequency = v;
        }
        if let Some(v) = self.freq0 {
            config.freq0 = v;
        }
        if let Some(v) = self.freq1 {
            config.freq1 = v;
        }
        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.bit_duration {
            config.bit_duration = v;
        }
        if let Some(v) = self.modulation_index {
            config.modulation_index = v;
        }
        if let Some(v) = self.singularity_threshold {
            config.singularity_threshold = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_options() {
        let file = ConfigFile::parse(
            r#"{"carrierFrequency": 200000, "freq0": 500, "freq1": 900,
                "sampleRate": 1000000, "bitDuration": 0.02, "modulationIndex": 0.7}"#,
        )
        .unwrap();

        let config = file.apply(ModemConfig::default());
        assert_eq!(config.carrier_frequency, 200_000.0);
        assert_eq!(config.freq0, 500.0);
        assert_eq!(config.freq1, 900.0);
        assert_eq!(config.sample_rate, 1_000_000.0);
        assert_eq!(config.bit_duration, 0.02);
        assert_eq!(config.modulation_index, 0.7);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = ConfigFile::parse(r#"{"freq1": 3000}"#).unwrap();
        let config = file.apply(ModemConfig::default());
        assert_eq!(
            config,
            ModemConfig {
                freq1: 3000.0,
                ..ModemConfig::default()
            }
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConfigFile::parse(r#"{"carrier_frequency": 1.0}"#).is_err());
        assert!(ConfigFile::parse(r#"{"volume": 11}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigFile::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, CliError::ConfigRead { .. }));
    }
}
