use std::path::PathBuf;

use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| config::ConfigError::Message(format!("Failed to find the current dir: {}", e)))?;
        Self::from_dir(base_path.join("configuration"))
    }

    pub fn from_dir(config_dir: PathBuf) -> Result<Self, config::ConfigError> {
        let app_environment: Environment = std::env::var("SCHOOL_CONSOLE_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let configurations = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base")).required(true))
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(true),
            )
            .add_source(
                config::Environment::with_prefix("SCHOOL_CONSOLE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = configurations.try_deserialize()?;
        app_config
            .api
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("Invalid api section: {}", e)))?;

        Ok(app_config)
    }
}

#[derive(Deserialize, Clone, Debug, Validate)]
pub struct ApiConfig {
    #[validate(url(message = "base_url must be an absolute URL"))]
    pub base_url: String,
    /// Rows requested per reference-list page.
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u32,
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
    #[serde(default)]
    pub allow_insecure_credentials: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionConfig {
    pub store_path: PathBuf,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetryConfig {
    pub log_dir: PathBuf,
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not supported environment. Use either `local`, `sandbox` or `production` ",
                other
            )),
        }
    }
}
