use std::{env, time::Duration};

use tone_llm::ModelSettings;

use crate::tone::session_store::SessionLimits;

const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub environment: String,
    pub bind_address: String,
    pub request_timeout: Duration,
    pub api_base: Option<String>,
    pub model_settings: ModelSettings,
    pub session_limits: SessionLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_base: None,
            model_settings: ModelSettings::default(),
            session_limits: SessionLimits::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`; blank or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(environment) = get("APP_ENVIRONMENT") {
            config.environment = environment;
        }
        if let Some(bind_address) = get("BIND_ADDRESS") {
            config.bind_address = bind_address;
        }
        if let Some(secs) = positive(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = positive(get("SESSION_TTL_SECS"), "SESSION_TTL_SECS") {
            config.session_limits.ttl = Duration::from_secs(secs);
        }
        if let Some(max) = positive(get("MAX_SESSIONS"), "MAX_SESSIONS") {
            config.session_limits.max_sessions = max as usize;
        }
        config.api_base = get("OPENAI_BASE_URL");
        if let Some(model) = get("TONE_MODEL") {
            config.model_settings.model = model;
        }
        if let Some(temperature) = get("TONE_TEMPERATURE") {
            match temperature.parse::<f32>() {
                Ok(value) if (0.0..=2.0).contains(&value) => {
                    config.model_settings.temperature = value
                }
                _ => tracing::warn!("Invalid TONE_TEMPERATURE {:?}, using default", temperature),
            }
        }

        config
    }

    pub fn is_dev(&self) -> bool {
        self.environment == DEFAULT_ENVIRONMENT
    }
}

/// Parses a strictly positive integer; zero and garbage keep the default.
fn positive(value: Option<String>, key: &str) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Some(parsed),
        _ => {
            tracing::warn!("Invalid {} {:?}, using default", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(entries: &[(&str, &str)]) -> ServiceConfig {
        let vars: HashMap<String, String> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_hosted_setup() {
        let config = config_from(&[]);

        assert!(config.is_dev());
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.api_base, None);
        assert_eq!(config.model_settings.model, "gpt-4");
        assert_eq!(config.model_settings.temperature, 0.7);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("APP_ENVIRONMENT", "prod"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("TONE_MODEL", "gpt-4o-mini"),
            ("TONE_TEMPERATURE", "0.2"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("REQUEST_TIMEOUT_SECS", "30"),
            ("SESSION_TTL_SECS", "600"),
            ("MAX_SESSIONS", "50"),
        ]);

        assert!(!config.is_dev());
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.model_settings.model, "gpt-4o-mini");
        assert_eq!(config.model_settings.temperature, 0.2);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.session_limits.ttl, Duration::from_secs(600));
        assert_eq!(config.session_limits.max_sessions, 50);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("TONE_TEMPERATURE", "hot"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
            ("TONE_MODEL", "  "),
        ]);

        assert_eq!(config.model_settings.temperature, 0.7);
        assert_eq!(config.request_timeout, Duration::from_secs(180));
        assert_eq!(config.model_settings.model, "gpt-4");
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = config_from(&[
            ("REQUEST_TIMEOUT_SECS", "0"),
            ("SESSION_TTL_SECS", "0"),
            ("MAX_SESSIONS", "0"),
        ]);

        assert_eq!(config.request_timeout, Duration::from_secs(180));
        assert_eq!(config.session_limits, SessionLimits::default());
    }
}
