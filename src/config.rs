use serde::Serialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Persistence backend endpoint. `None` runs the service in demo mode.
    pub backend_url: Option<String>,
    #[serde(skip_serializing)]
    pub ai_api_key: Option<String>,
    pub ai_endpoint: String,
    pub ai_model: String,
    #[serde(skip_serializing)]
    pub demo_password: String,
    pub seed_demo_data: bool,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend_url: None,
            ai_api_key: None,
            ai_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            ai_model: "gpt-4o-mini".to_string(),
            demo_password: "demo123".to_string(),
            seed_demo_data: true,
            http_timeout: Duration::from_millis(10_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("TRACKER_HOST").unwrap_or(defaults.host),
            port: env_port("TRACKER_PORT", defaults.port),
            backend_url: env_opt("TRACKER_BACKEND_URL"),
            ai_api_key: env_opt("TRACKER_AI_API_KEY"),
            ai_endpoint: env::var("TRACKER_AI_ENDPOINT").unwrap_or(defaults.ai_endpoint),
            ai_model: env::var("TRACKER_AI_MODEL").unwrap_or(defaults.ai_model),
            demo_password: env::var("TRACKER_DEMO_PASSWORD").unwrap_or(defaults.demo_password),
            seed_demo_data: env_bool("TRACKER_SEED_DEMO", defaults.seed_demo_data),
            http_timeout: Duration::from_millis(env_u64("TRACKER_HTTP_TIMEOUT_MS", 10_000)),
        }
    }

    pub fn demo_mode(&self) -> bool {
        self.backend_url.is_none()
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_port(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| parse_port(&v))
        .unwrap_or(default)
}

/// Rejects out-of-range values instead of wrapping them.
fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_in_demo_mode() {
        let config = Config::default();
        assert!(config.demo_mode());
        assert_eq!(config.port, 8080);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn parses_boolean_spellings() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn out_of_range_ports_are_ignored() {
        assert_eq!(parse_port("9090"), Some(9090));
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("http"), None);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = Config::default();
        config.ai_api_key = Some("sk-secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("demo123"));
    }
}
