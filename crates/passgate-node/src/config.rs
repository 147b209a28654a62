//! Node configuration loading and management.

use passgate_backend::HttpBackendConfig;
use passgate_core::{AppIdentity, DisclosurePolicy, SessionConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Full configuration for the Passgate node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PassgateConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Verification backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Requesting application, as shown in the wallet.
    #[serde(default)]
    pub app: AppIdentity,

    /// What each session asks the holder to prove.
    #[serde(default)]
    pub policy: DisclosurePolicy,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the verification backend.
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Where the prover delivers proofs; also used for persistence.
    #[serde(default = "default_verify_path")]
    pub verify_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Base of the wallet universal link.
    #[serde(default = "default_redirect_base")]
    pub redirect_base: String,
    /// Extra headers sent with the health probe.
    #[serde(default = "default_health_headers")]
    pub health_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9001
}
fn default_backend_url() -> String {
    "http://127.0.0.1:3000".into()
}
fn default_health_path() -> String {
    "/health".into()
}
fn default_verify_path() -> String {
    "/verify".into()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_health_headers() -> BTreeMap<String, String> {
    // Tunnelled dev backends otherwise answer the probe with an HTML interstitial.
    BTreeMap::from([("ngrok-skip-browser-warning".to_string(), "true".to_string())])
}
fn default_redirect_base() -> String {
    "https://redirect.self.xyz".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            health_path: default_health_path(),
            verify_path: default_verify_path(),
            request_timeout_secs: default_request_timeout_secs(),
            redirect_base: default_redirect_base(),
            health_headers: default_health_headers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PassgateConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PassgateConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// API listen address as `host:port`.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            backend_url: self.backend.url.clone(),
            verify_path: self.backend.verify_path.clone(),
            health_path: self.backend.health_path.clone(),
            app: self.app.clone(),
            policy: self.policy.clone(),
        }
    }

    pub fn http_backend_config(&self) -> HttpBackendConfig {
        let timeout = Duration::from_secs(self.backend.request_timeout_secs);
        self.backend.health_headers.iter().fold(
            HttpBackendConfig::from_session_config(&self.session_config(), timeout),
            |config, (name, value)| config.with_health_header(name, value),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_core::{EndpointType, UserIdType};

    #[test]
    fn test_default_config() {
        let config = PassgateConfig::default();
        assert_eq!(config.api.port, 9001);
        assert_eq!(config.backend.url, "http://127.0.0.1:3000");
        assert_eq!(config.backend.verify_path, "/verify");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.policy.minimum_age, Some(18));
        assert!(config.session_config().validate().is_ok());
    }

    #[test]
    fn test_api_addr() {
        let config = PassgateConfig::default();
        assert_eq!(config.api_addr(), "127.0.0.1:9001");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PassgateConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: PassgateConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.api.port, config.api.port);
        assert_eq!(decoded.app, config.app);
        assert_eq!(decoded.policy, config.policy);
        assert_eq!(decoded.backend.health_headers, config.backend.health_headers);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = PassgateConfig::load(Path::new("/nonexistent/passgate.toml")).unwrap();
        assert_eq!(config.api.port, 9001);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[backend]
url = "https://verify.example.com"
request_timeout_secs = 3

[app]
app_name = "Age Gate"
scope = "age-gate"
endpoint_type = "https"
user_id_type = "hex"

[policy]
minimum_age = 21
ofac = true
excluded_countries = ["PRK"]
"#;
        let config: PassgateConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.backend.url, "https://verify.example.com");
        assert_eq!(config.backend.verify_path, "/verify");
        assert_eq!(config.app.endpoint_type, EndpointType::Https);
        assert_eq!(config.app.user_id_type, UserIdType::Hex);
        assert_eq!(config.app.version, 2);
        assert_eq!(config.policy.minimum_age, Some(21));
        assert!(config.policy.ofac);
        // Defaults for unspecified
        assert_eq!(config.api.port, 9001);

        let session = config.session_config();
        assert_eq!(
            session.callback_endpoint(),
            "https://verify.example.com/verify"
        );
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_http_backend_config() {
        let mut config = PassgateConfig::default();
        config.backend.url = "https://api.example.com/".into();
        config.backend.request_timeout_secs = 5;

        let http = config.http_backend_config();
        assert_eq!(http.health_url, "https://api.example.com/health");
        assert_eq!(http.verify_url, "https://api.example.com/verify");
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(
            http.health_headers.get("ngrok-skip-browser-warning"),
            Some(&"true".to_string())
        );
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "passgate-config-test-{}/passgate.toml",
            std::process::id()
        ));
        let mut config = PassgateConfig::default();
        config.api.port = 9100;
        config.save(&path).unwrap();

        let loaded = PassgateConfig::load(&path).unwrap();
        assert_eq!(loaded.api.port, 9100);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
