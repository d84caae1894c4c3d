//! Service configuration loaded from environment variables.

use std::env;

/// Deployment environment, controlling how much failure detail responses
/// reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Runtime configuration.
///
/// # Environment Variables
/// - `ROSTER_ADDR` - TCP bind address (default: `127.0.0.1:8080`)
/// - `ROSTER_CACHE_TTL` - response cache TTL in seconds (default: 30)
/// - `ROSTER_ENV` - `development` or `production` (default: development)
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the server binds to.
    pub bind_addr: String,
    /// Response cache entry lifetime in seconds.
    pub cache_ttl: u64,
    /// Deployment environment.
    pub environment: Environment,
}

impl Config {
    /// Loads configuration from the process environment, falling back to
    /// defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("ROSTER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_owned()),
            cache_ttl: env::var("ROSTER_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            environment: env::var("ROSTER_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            cache_ttl: 30,
            environment: Environment::Development,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.cache_ttl, 30);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn environment_parse_is_case_insensitive() {
        assert_eq!(Environment::parse("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        // Unknown values fall back to the safe-for-debugging default.
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }
}
