//! `passgate probe`: Check the verification backend's health directly.

use clap::Args;
use passgate_backend::{HttpBackend, HttpBackendConfig, VerificationBackend};
use passgate_core::SessionConfig;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Base URL of the verification backend.
    #[arg(short, long, env = "PASSGATE_BACKEND_URL", default_value = "http://127.0.0.1:3000")]
    pub backend_url: String,

    /// Health path, relative to the backend URL.
    #[arg(long, default_value = "/health")]
    pub health_path: String,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Extra header for the probe, as `name=value`. Repeatable.
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got {:?}", s))
}

fn backend_config(args: &ProbeArgs) -> HttpBackendConfig {
    let session = SessionConfig {
        backend_url: args.backend_url.clone(),
        health_path: args.health_path.clone(),
        ..Default::default()
    };
    args.headers.iter().fold(
        HttpBackendConfig::from_session_config(&session, Duration::from_secs(args.timeout)),
        |config, (name, value)| config.with_health_header(name, value),
    )
}

pub async fn run(args: &ProbeArgs) -> anyhow::Result<()> {
    let config = backend_config(args);
    let url = config.health_url.clone();
    let backend = HttpBackend::new(config)?;

    match backend.check_health().await {
        Ok(report) => {
            println!("Backend reachable at {}", url);
            println!("  Status:  {}", report.status);
            if let Some(body) = report.body {
                println!("  Body:    {}", body);
            }
        }
        Err(e) => anyhow::bail!("backend not reachable at {}: {}", url, e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("ngrok-skip-browser-warning=true").unwrap(),
            ("ngrok-skip-browser-warning".to_string(), "true".to_string())
        );
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn test_backend_config() {
        let args = ProbeArgs {
            backend_url: "https://api.example.com".into(),
            health_path: "status".into(),
            timeout: 3,
            headers: vec![("x-probe".into(), "1".into())],
        };
        let config = backend_config(&args);
        assert_eq!(config.health_url, "https://api.example.com/status");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.health_headers.get("x-probe"), Some(&"1".to_string()));
    }
}
