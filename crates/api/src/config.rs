use axum::http::HeaderValue;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    InvalidNumber {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://balcao.db`).
    pub database_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `DATABASE_URL`         | `sqlite://balcao.db`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = parse_env("PORT", "3000", "u16")?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin.parse::<HeaderValue>().is_err() {
                return Err(ConfigError::InvalidCorsOrigin(origin.clone()));
            }
        }

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30", "u64")?;
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30", "u64")?;

        let database_url = env_or("DATABASE_URL", "sqlite://balcao.db");

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.into())
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env_or(var, default);
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        expected,
        value,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_env_falls_back_to_default() {
        let value: u16 = parse_env("BALCAO_TEST_UNSET_PORT", "3000", "u16").unwrap();
        assert_eq!(value, 3000);
    }

    #[test]
    fn parse_env_reports_malformed_value() {
        let result: Result<u64, _> = parse_env("BALCAO_TEST_UNSET_TIMEOUT", "soon", "u64");
        assert_matches!(
            result,
            Err(ConfigError::InvalidNumber { var: "BALCAO_TEST_UNSET_TIMEOUT", .. })
        );
    }
}
