// src/config/mod.rs
// All options come from the environment (.env supported); defaults match the
// platform configuration reference.

use std::str::FromStr;

/// DeepSeek chat-completion provider options.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// API key. Required in production; an empty key makes every call fall
    /// back to the canned unavailable answer.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Sampling temperature, 0.0 - 2.0.
    pub temperature: f64,
    pub timeout_seconds: u64,
}

/// Flat, immutable application configuration. Built once at startup and passed
/// to constructors; never read ambiently after that.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub deepseek: DeepSeekConfig,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Server
    pub host: String,
    pub port: u16,

    // ── Logging
    pub log_level: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        let deepseek = DeepSeekConfig {
            api_key: env_var_or("DEEPSEEK_API_KEY", String::new()),
            base_url: env_var_or("DEEPSEEK_BASE_URL", "https://api.deepseek.com".to_string()),
            model: env_var_or("DEEPSEEK_MODEL", "deepseek-chat".to_string()),
            max_tokens: env_var_or("DEEPSEEK_MAX_TOKENS", 2048),
            temperature: env_var_or("DEEPSEEK_TEMPERATURE", 0.7),
            timeout_seconds: env_var_or("DEEPSEEK_TIMEOUT_SECONDS", 60),
        };

        Self {
            deepseek,
            database_url: env_var_or("DATABASE_URL", "sqlite:./smartlearn.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 10),
            host: env_var_or("SMARTLEARN_HOST", "0.0.0.0".to_string()),
            port: env_var_or("SMARTLEARN_PORT", 8080),
            log_level: env_var_or("SMARTLEARN_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_defaults() {
        let config = AppConfig::from_env();

        assert_eq!(config.deepseek.base_url, "https://api.deepseek.com");
        assert_eq!(config.deepseek.model, "deepseek-chat");
        assert_eq!(config.deepseek.max_tokens, 2048);
        assert!((config.deepseek.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.deepseek.timeout_seconds, 60);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::from_env();
        assert!(config.bind_address().contains(':'));
    }
}
