/// Configuration management for the Yatube service
///
/// Everything is read from environment variables (optionally seeded from a
/// `.env` file by `main`).
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Number of actix workers (0 = one per core)
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Postgres => f.write_str("postgres"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown STORAGE_BACKEND '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    /// Run embedded migrations at startup
    pub run_migrations: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("url", &"[REDACTED]")
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Token lifetimes; key material is loaded separately by `crypto_core::jwt`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Postgres,
        };
        if production && backend == StorageBackend::Memory {
            return Err("STORAGE_BACKEND=memory is not allowed in production".to_string());
        }

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let access_ttl_secs = parse_env_or_default(
            "JWT_ACCESS_TTL_SECS",
            crypto_core::jwt::DEFAULT_ACCESS_TTL_SECS,
        )?;
        let refresh_ttl_secs = parse_env_or_default(
            "JWT_REFRESH_TTL_SECS",
            crypto_core::jwt::DEFAULT_REFRESH_TTL_SECS,
        )?;
        if access_ttl_secs <= 0 || refresh_ttl_secs <= 0 {
            return Err("JWT token lifetimes must be positive".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("YATUBE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("YATUBE_PORT", 8000)?,
                workers: parse_env_or_default("YATUBE_WORKERS", 0)?,
            },
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/yatube".to_string()),
                run_migrations: parse_env_or_default("DATABASE_RUN_MIGRATIONS", true)?,
            },
            jwt: JwtConfig {
                access_ttl_secs,
                refresh_ttl_secs,
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "APP_ENV",
        "STORAGE_BACKEND",
        "CORS_ALLOWED_ORIGINS",
        "JWT_ACCESS_TTL_SECS",
        "JWT_REFRESH_TTL_SECS",
        "YATUBE_HOST",
        "YATUBE_PORT",
        "YATUBE_WORKERS",
        "DATABASE_URL",
        "DATABASE_RUN_MIGRATIONS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_for_development() {
        clear_env();

        let config = Config::from_env().expect("config");
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert!(config.database.run_migrations);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert_eq!(
            config.jwt.access_ttl_secs,
            crypto_core::jwt::DEFAULT_ACCESS_TTL_SECS
        );
    }

    #[test]
    #[serial]
    fn production_requires_explicit_cors() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://yatube.example");
        assert!(Config::from_env().is_ok());

        std::env::set_var("STORAGE_BACKEND", "memory");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_numbers_are_reported() {
        clear_env();
        std::env::set_var("YATUBE_PORT", "eighty");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("YATUBE_PORT"));

        clear_env();
        std::env::set_var("JWT_ACCESS_TTL_SECS", "0");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn memory_backend_is_selectable() {
        clear_env();
        std::env::set_var("STORAGE_BACKEND", "Memory");
        let config = Config::from_env().unwrap();
        assert_eq!(config.database.backend, StorageBackend::Memory);

        std::env::set_var("STORAGE_BACKEND", "sqlite");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn database_url_is_redacted() {
        let db = DatabaseConfig {
            backend: StorageBackend::Postgres,
            url: "postgres://u:hunter2@db/yatube".into(),
            run_migrations: true,
        };
        assert!(!format!("{:?}", db).contains("hunter2"));
    }
}
