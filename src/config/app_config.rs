use serde::Deserialize;

use crate::domain::workflow::OrchestratorConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub provider: ProviderConfig,
    pub orchestrator: OrchestratorSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-compatible provider endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Read from APP__PROVIDER__API_KEY; empty only works against local
    /// endpoints that skip auth
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Tunables for the workflow strategies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub default_model: String,
    pub chained_confidence_threshold: f64,
    pub routed_confidence_threshold: f64,
    pub max_tool_iterations: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            default_model: defaults.default_model,
            chained_confidence_threshold: defaults.chained_confidence_threshold,
            routed_confidence_threshold: defaults.routed_confidence_threshold,
            max_tool_iterations: defaults.max_tool_iterations,
        }
    }
}

impl From<OrchestratorSettings> for OrchestratorConfig {
    fn from(settings: OrchestratorSettings) -> Self {
        Self {
            default_model: settings.default_model,
            chained_confidence_threshold: settings.chained_confidence_threshold,
            routed_confidence_threshold: settings.routed_confidence_threshold,
            max_tool_iterations: settings.max_tool_iterations,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.provider.base_url, "https://api.openai.com");
        assert_eq!(config.orchestrator.max_tool_iterations, 5);
        assert!(config.orchestrator.chained_confidence_threshold > 0.0);
    }

    #[test]
    fn test_settings_convert_to_orchestrator_config() {
        let settings = OrchestratorSettings {
            default_model: "gpt-4o".to_string(),
            chained_confidence_threshold: 0.8,
            routed_confidence_threshold: 0.5,
            max_tool_iterations: 3,
        };

        let config: OrchestratorConfig = settings.into();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.max_tool_iterations, 3);
    }
}
