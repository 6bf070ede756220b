//! Runtime settings.
//!
//! Settings are layered: command-line flags and environment variables first,
//! then the optional YAML file, then the built-in defaults. A config file
//! may set any subset of:
//!
//! ```yaml
//! api_base: https://api.openai.com/v1
//! model: gpt-4o-mini
//! temperature: 0.2
//! api_key: sk-...
//! llm_retries: 0
//! limit: 8
//! concurrency: 1
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

pub const MIN_ARTICLES: usize = 3;
pub const MAX_ARTICLES: usize = 20;
pub const DEFAULT_ARTICLES: usize = 8;
pub const MAX_CONCURRENCY: usize = 12;
pub const MAX_LLM_RETRIES: usize = 5;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// The optional YAML config file. Unknown keys are rejected.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub api_key: Option<String>,
    pub llm_retries: Option<usize>,
    pub limit: Option<usize>,
    pub concurrency: Option<usize>,
}

/// Everything the LLM client needs.
#[derive(Clone, PartialEq)]
pub struct LlmSettings {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: String,
    pub max_retries: usize,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Fully resolved settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub limit: usize,
    pub concurrency: usize,
    pub once: bool,
    pub llm: LlmSettings,
}

pub fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<usize, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Read and parse a YAML config file.
#[instrument(level = "info")]
pub async fn load_file_config(path: &str) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
    let config: FileConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    info!("Loaded configuration file");
    Ok(config)
}

impl Settings {
    /// Merge flags over the file over the defaults, then validate.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let limit = check_range(
            "limit",
            cli.limit.or(file.limit).unwrap_or(DEFAULT_ARTICLES),
            MIN_ARTICLES,
            MAX_ARTICLES,
        )?;
        let concurrency = check_range(
            "concurrency",
            cli.concurrency.or(file.concurrency).unwrap_or(1),
            1,
            MAX_CONCURRENCY,
        )?;
        let max_retries = check_range(
            "llm_retries",
            cli.llm_retries.or(file.llm_retries).unwrap_or(0),
            0,
            MAX_LLM_RETRIES,
        )?;

        let temperature = cli
            .temperature
            .or(file.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidTemperature(temperature));
        }

        let api_base = cli
            .api_base
            .clone()
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        match Url::parse(&api_base) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidApiBase(api_base)),
        }

        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Settings {
            limit,
            concurrency,
            once: cli.once,
            llm: LlmSettings {
                api_base: api_base.trim_end_matches('/').to_string(),
                model: cli
                    .model
                    .clone()
                    .or(file.model)
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                api_key,
                max_retries,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["news_digest", "--api-key", "sk-test"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let cli = Cli {
            api_base: None,
            model: None,
            ..cli(&[])
        };
        let settings = Settings::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(settings.limit, DEFAULT_ARTICLES);
        assert_eq!(settings.concurrency, 1);
        assert!(!settings.once);
        assert_eq!(settings.llm.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.llm.model, DEFAULT_MODEL);
        assert_eq!(settings.llm.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.llm.max_retries, 0);
        assert_eq!(settings.llm.api_key, "sk-test");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            model: Some("from-file".to_string()),
            limit: Some(5),
            temperature: Some(0.7),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli(&["-n", "10", "--model", "from-cli"]), file).unwrap();
        assert_eq!(settings.limit, 10);
        assert_eq!(settings.llm.model, "from-cli");
        assert_eq!(settings.llm.temperature, 0.7);
    }

    #[test]
    fn test_file_values_are_validated() {
        let file = FileConfig {
            limit: Some(50),
            ..FileConfig::default()
        };
        let err = Settings::resolve(&cli(&[]), file).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 50, .. }));

        let file = FileConfig {
            temperature: Some(3.5),
            ..FileConfig::default()
        };
        assert!(Settings::resolve(&cli(&[]), file).is_err());
    }

    #[test]
    fn test_missing_api_key() {
        let cli = Cli {
            api_key: None,
            ..cli(&[])
        };
        let err = Settings::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let file = FileConfig {
            api_key: Some("  ".to_string()),
            ..FileConfig::default()
        };
        let err = Settings::resolve(&cli, file).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_invalid_api_base() {
        let err = Settings::resolve(&cli(&["--api-base", "localhost:8080"]), FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiBase(_)));

        let settings =
            Settings::resolve(&cli(&["--api-base", "http://localhost:8080/v1/"]), FileConfig::default())
                .unwrap();
        assert_eq!(settings.llm.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = Settings::resolve(&cli(&[]), FileConfig::default()).unwrap();
        let shown = format!("{:?}", settings);
        assert!(!shown.contains("sk-test"));
        assert!(shown.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_load_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model: gpt-4o\ntemperature: 0.1\nlimit: 12").unwrap();

        let config = load_file_config(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.temperature, Some(0.1));
        assert_eq!(config.limit, Some(12));
        assert_eq!(config.api_base, None);
    }

    #[tokio::test]
    async fn test_load_file_config_errors() {
        let err = load_file_config("/nonexistent/config.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "modle: typo").unwrap();
        let err = load_file_config(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
