use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub labels: LabelsConfig,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
    /// Empty means any origin is allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_body_limit_mb() -> usize {
    10
}

impl ServerConfig {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn get_body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

pub trait Validatable {
    fn get_path(&self) -> PathBuf;

    fn validate(&self) -> Result<(), String> {
        if !self.get_path().exists() {
            return Err(format!("File not found: {:?}", self.get_path()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub onnx_file: String,
    pub model_dir: PathBuf,
    #[serde(default = "default_model_instances")]
    pub num_instances: usize,
    #[serde(default = "default_image_size")]
    pub image_size: u32,
}

fn default_model_instances() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_image_size() -> u32 {
    180
}

impl Validatable for ModelConfig {
    fn get_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }

    fn validate(&self) -> Result<(), String> {
        if self.num_instances == 0 {
            return Err("model.num_instances must be at least 1".to_string());
        }
        if self.image_size == 0 {
            return Err("model.image_size must be at least 1".to_string());
        }
        if !self.get_path().exists() {
            return Err(format!("Model file not found: {:?}", self.get_path()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelsConfig {
    pub labels_file: String,
    pub labels_dir: PathBuf,
}

impl Validatable for LabelsConfig {
    fn get_path(&self) -> PathBuf {
        self.labels_dir.join(&self.labels_file)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "{} is not a supported minimum log level. Use either `debug` or `info`.",
                other
            )),
        }
    }
}

/// Reads `base.yaml`, the environment file and `APP_` variables without
/// checking that the referenced files exist.
pub fn load_configuration(
    configuration_directory: &Path,
    environment: &Environment,
) -> Result<Config, config::ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    config.try_deserialize::<Config>()
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let config = load_configuration(&configuration_directory, &environment)?;

    for result in [config.model.validate(), config.labels.validate()] {
        if let Err(e) = result {
            tracing::error!("Configuration validation failed: {}", e);
            return Err(config::ConfigError::Message(e));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configuration")
    }

    #[test]
    fn test_load_local_configuration() {
        let config = load_configuration(&configuration_dir(), &Environment::Local).unwrap();

        assert_eq!(config.server.port, 8010);
        assert_eq!(config.model.image_size, 180);
        assert_eq!(config.model.onnx_file, "model_mango.onnx");
        assert_eq!(config.labels.labels_file, "labels.txt");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_production_configuration() {
        let config = load_configuration(&configuration_dir(), &Environment::Production).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.model.num_instances >= 1);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::try_from("PRODUCTION".to_string()),
            Ok(Environment::Production)
        );
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn test_body_limit_bytes() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 8010,
            body_limit_mb: 2,
            allowed_origins: vec![],
        };

        assert_eq!(server.get_address(), "127.0.0.1:8010");
        assert_eq!(server.get_body_limit_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_model_config_rejects_zero_instances() {
        let model = ModelConfig {
            onnx_file: "model_mango.onnx".into(),
            model_dir: PathBuf::from("models"),
            num_instances: 0,
            image_size: 180,
        };

        assert!(model.validate().is_err());
    }

    #[test]
    fn test_labels_config_validates_shipped_manifest() {
        let labels = LabelsConfig {
            labels_file: "labels.txt".into(),
            labels_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models"),
        };

        assert!(labels.validate().is_ok());
        assert!(LabelsConfig {
            labels_file: "missing.txt".into(),
            ..labels
        }
        .validate()
        .is_err());
    }
}
