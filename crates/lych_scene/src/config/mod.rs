//! Configuration system
//!
//! Statically typed configuration structs (placement thresholds, import tag
//! names) share one loading path: TOML or RON chosen by file extension.
//! Missing fields fall back to the struct's `Default`.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// On-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text
    fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render configuration text
    fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        Self::parse(&std::fs::read_to_string(path)?, format)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.render(ConfigFormat::from_path(path)?)?;
        Ok(std::fs::write(path, contents)?)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Value outside its accepted range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        trials: u32,
    }

    impl Config for Sample {}

    fn temp_path(file: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lych_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(file)
    }

    #[test]
    fn test_toml_and_ron_round_trip() {
        let sample = Sample { name: "floor".to_string(), trials: 20 };
        for file in ["sample.toml", "sample.ron"] {
            let path = temp_path(file);
            sample.save_to_file(&path).unwrap();
            assert_eq!(Sample::load_from_file(&path).unwrap(), sample);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let sample = Sample::default();
        assert!(matches!(
            sample.save_to_file(temp_path("sample.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            Sample::load_from_file(temp_path("sample")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_fills_missing_fields() {
        let sample = Sample::parse("(trials: 4)", ConfigFormat::Ron).unwrap();
        assert_eq!(sample, Sample { name: String::new(), trials: 4 });
        assert!(matches!(Sample::parse("trials = [", ConfigFormat::Toml), Err(ConfigError::Parse(_))));
    }
}
