//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables are collected here with:
//! - Physical units (Hz, seconds, samples)
//! - Documented ranges and meanings
//! - Defaults that reproduce the stock ten-band room
//!
//! A config file is TOML with one table per group; every field is optional:
//!
//! ```toml
//! [simulation]
//! max_reflections = 8
//! direct_sound_interval = 0.002
//!
//! [render]
//! max_delay_s = 0.5
//! ```

mod analysis;
mod render;
mod simulation;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

// Re-export all types
pub use analysis::AnalysisParams;
pub use render::{audio_constants, RecordingConfig, RenderParams};
pub use simulation::{BandRange, SimulationParams, DEFAULT_BAND_RANGES};

/// Complete auralization configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuralConfig {
    pub simulation: SimulationParams,
    pub analysis: AnalysisParams,
    pub render: RenderParams,
}

impl AuralConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.analysis.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        assert!(AuralConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AuralConfig::from_toml_str(
            r#"
            [simulation]
            max_reflections = 4
            ir_accumulation_decay = 0.5

            [analysis]
            hop_size = 512
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.max_reflections, 4);
        assert_eq!(config.simulation.ir_accumulation_decay, 0.5);
        assert_eq!(config.simulation.energy_bands, 10);
        assert_eq!(config.analysis.hop_size, 512);
        assert_eq!(config.analysis.window_size, 2048);
        assert_eq!(config.render, RenderParams::default());
    }

    #[test]
    fn test_band_ranges_as_pairs() {
        let config = AuralConfig::from_toml_str(
            r#"
            [simulation]
            energy_bands = 2
            band_ranges = [[100.0, 1000.0], [1000.0, 10000.0]]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.simulation.band_ranges,
            vec![BandRange::new(100.0, 1000.0), BandRange::new(1000.0, 10000.0)]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AuralConfig::from_toml_str("[render]\nband_gain_smoothing = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "band_gain_smoothing",
                ..
            }
        ));

        let err = AuralConfig::from_toml_str("[simulation]\nmax_reflections = \"lots\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\ndirect_sound_interval = 0.001").unwrap();

        let config = AuralConfig::load(file.path()).unwrap();
        assert_eq!(config.simulation.direct_sound_interval, 0.001);

        let missing = AuralConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
