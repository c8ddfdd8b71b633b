use serde::Deserialize;
use serverless_api::ApiConfig;
use std::fs::File;
use std::path::Path;

/// Overrides `api.api_key` so the key does not have to live in the file.
pub const API_KEY_ENV: &str = "EC_API_KEY";

fn default_level() -> String {
    "info".to_string()
}

fn default_prefix() -> String {
    "ecfilter".to_string()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.api.api_key = key;
        }
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            api:
                endpoint: https://api.elastic-cloud.com
                api_key: secret
                max_retries: 5
            logging:
                level: debug
                sentry_dsn: https://key@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.api.endpoint.as_str(), "https://api.elastic-cloud.com/");
        assert_eq!(config.api.max_retries, 5);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        assert_eq!(
            config.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
                prefix: "ecfilter".into(),
            })
        );
    }

    #[test]
    fn minimal_config() {
        let yaml = r#"
            api:
                endpoint: http://localhost:8080
                api_key: secret
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.metrics, None);
        assert!(config.api.validate().is_ok());
    }

    #[test]
    fn api_key_override() {
        let yaml = r#"
            api:
                endpoint: http://localhost:8080
                api_key: ""
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.api.validate().is_err());

        let config = config.with_api_key(Some("from-env".into()));
        assert_eq!(config.api.api_key, "from-env");

        let config = config.with_api_key(Some(String::new()));
        assert_eq!(config.api.api_key, "from-env");
    }

    #[test]
    fn load_errors() {
        assert!(matches!(
            Config::from_file(Path::new("/nonexistent/ecfilter.yaml")),
            Err(ConfigError::LoadError(_))
        ));

        let tmp = write_tmp_file("api: [not, a, map]");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
