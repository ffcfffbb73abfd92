use reqwest::Url;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DB_PORT: u16 = 5432;

const DEFAULT_HTTP_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 4;
const DEFAULT_HTTP_IDLE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_COMPILER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_HOST: &str = "postgres";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment flavour; decides log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Local,
    Dev,
    Prod,
}

impl AppEnv {
    pub fn default_log_level(&self) -> &'static str {
        match self {
            AppEnv::Local | AppEnv::Dev => "debug",
            AppEnv::Prod => "info",
        }
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            "prod" => Ok(AppEnv::Prod),
            other => Err(format!("expected one of local, dev, prod; got {}", other)),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppEnv::Local => "local",
            AppEnv::Dev => "dev",
            AppEnv::Prod => "prod",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub address: String,
    pub timeout: Duration,
    pub idle_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Process configuration, assembled once at startup and passed down by value.
#[derive(Debug, Clone)]
pub struct Config {
    pub env: AppEnv,
    pub http: HttpConfig,
    pub compiler: CompilerConfig,
    pub database: DatabaseConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Lookup(lookup);

        let env = vars.parsed("APP_ENV", AppEnv::default())?;

        let http = HttpConfig {
            address: vars.get_or("HTTP_ADDRESS", DEFAULT_HTTP_ADDRESS),
            timeout: vars.seconds("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            idle_timeout: vars.seconds("HTTP_IDLE_TIMEOUT_SECS", DEFAULT_HTTP_IDLE_TIMEOUT_SECS)?,
            cors_allowed_origin: vars.get("CORS_ALLOWED_ORIGIN"),
        };

        let raw_endpoint = vars.required("COMPILER_API")?;
        let endpoint = Url::parse(&raw_endpoint).map_err(|e| ConfigError::Invalid {
            key: "COMPILER_API",
            value: raw_endpoint.clone(),
            reason: e.to_string(),
        })?;
        let compiler = CompilerConfig {
            endpoint,
            timeout: vars.seconds("COMPILER_TIMEOUT_SECS", DEFAULT_COMPILER_TIMEOUT_SECS)?,
        };

        let database = DatabaseConfig {
            host: vars.get_or("DB_HOST", DEFAULT_DB_HOST),
            port: DB_PORT,
            user: vars.required("DB_USER")?,
            password: vars.required("DB_PASSWORD")?,
            name: vars.required("DB_NAME")?,
            max_connections: vars.parsed("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            acquire_timeout: vars.seconds(
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )?,
        };

        Ok(Config {
            env,
            http,
            compiler,
            database,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }),
        }
    }

    fn seconds(&self, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parsed(key, default).map(Duration::from_secs)
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
        move |key: &str| map.get(key).cloned()
    }

    fn required_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("COMPILER_API", "http://compiler.local/api/run"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "compiles"),
        ]
    }

    #[test]
    fn test_defaults_applied_when_optional_vars_absent() {
        let config = Config::from_lookup(lookup(&required_vars())).unwrap();

        assert_eq!(config.env, AppEnv::Local);
        assert_eq!(config.http.address, "127.0.0.1:8080");
        assert_eq!(config.http.timeout, Duration::from_secs(4));
        assert_eq!(config.http.idle_timeout, Duration::from_secs(60));
        assert!(config.http.cors_allowed_origin.is_none());
        assert_eq!(config.compiler.endpoint.as_str(), "http://compiler.local/api/run");
        assert_eq!(config.compiler.timeout, Duration::from_secs(30));
        assert_eq!(config.database.host, "postgres");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_overrides_are_read() {
        let mut vars = required_vars();
        vars.extend([
            ("APP_ENV", "prod"),
            ("HTTP_ADDRESS", "0.0.0.0:9000"),
            ("COMPILER_TIMEOUT_SECS", "5"),
            ("DB_HOST", "db.internal"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("CORS_ALLOWED_ORIGIN", "https://ide.example.com"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.env, AppEnv::Prod);
        assert_eq!(config.http.address, "0.0.0.0:9000");
        assert_eq!(config.compiler.timeout, Duration::from_secs(5));
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(
            config.http.cors_allowed_origin.as_deref(),
            Some("https://ide.example.com")
        );
    }

    #[test]
    fn test_missing_compiler_api_is_reported() {
        let vars: Vec<_> = required_vars()
            .into_iter()
            .filter(|(k, _)| *k != "COMPILER_API")
            .collect();
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COMPILER_API"));
    }

    #[test]
    fn test_blank_required_value_counts_as_missing() {
        let vars: Vec<_> = required_vars()
            .into_iter()
            .map(|(k, v)| if k == "DB_PASSWORD" { (k, "  ") } else { (k, v) })
            .collect();
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DB_PASSWORD"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut vars = required_vars();
        vars.push(("APP_ENV", "staging"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "APP_ENV", .. }));

        let mut vars = required_vars();
        vars.push(("COMPILER_TIMEOUT_SECS", "soon"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "COMPILER_TIMEOUT_SECS",
                ..
            }
        ));

        let vars: Vec<_> = required_vars()
            .into_iter()
            .map(|(k, v)| if k == "COMPILER_API" { (k, "not a url") } else { (k, v) })
            .collect();
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "COMPILER_API", .. }));
    }

    #[test]
    fn test_database_password_is_redacted_in_debug() {
        let config = Config::from_lookup(lookup(&required_vars())).unwrap();
        let debug = format!("{:?}", config.database);
        assert!(!debug.contains("secret"));
    }
}
