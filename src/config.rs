use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed: bool,
    pub classify_delay: Duration,
    pub default_volunteer: String,
    pub log_filter: String,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".into(),
            port: 3001,
            seed: true,
            classify_delay: Duration::from_millis(2000),
            default_volunteer: "v1".into(),
            log_filter: "info".into(),
            cors_origin: "*".into(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            seed: lookup("TCOAST_SEED")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed),
            classify_delay: lookup("TCOAST_CLASSIFY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.classify_delay),
            default_volunteer: lookup("TCOAST_DEFAULT_VOLUNTEER")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_volunteer),
            log_filter: lookup("TCOAST_LOG").unwrap_or(defaults.log_filter),
            cors_origin: lookup("TCOAST_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert!(config.seed);
        assert_eq!(config.classify_delay, Duration::from_millis(2000));
        assert_eq!(config.default_volunteer, "v1");
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("TCOAST_SEED", "off"),
            ("TCOAST_CLASSIFY_DELAY_MS", "0"),
            ("TCOAST_DEFAULT_VOLUNTEER", "v3"),
        ]));
        assert_eq!(config.port, 8080);
        assert!(!config.seed);
        assert_eq!(config.classify_delay, Duration::ZERO);
        assert_eq!(config.default_volunteer, "v3");

        let config = ServerConfig::from_lookup(lookup(&[("PORT", "http"), ("TCOAST_SEED", "maybe")]));
        assert_eq!(config.port, 3001);
        assert!(config.seed);
    }
}
