use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds.
    pub acquire_timeout: u64,
    pub run_migrations: bool,
    /// Defer the first connection until a query needs it.
    pub connect_lazily: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_expiry_minutes: i64,
}

/// Initial administrator created by `barbershop-admin seed-admin`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/barbershop".to_string(),
            max_connections: 16,
            min_connections: 2,
            acquire_timeout: 5,
            run_migrations: true,
            connect_lazily: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_expiry_minutes: 24 * 60,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password: None,
            admin_name: "Administrator".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Barbershop.toml (if present)
    /// 3. Environment variables prefixed with BARBERSHOP_, nested with `__`
    ///    (e.g. BARBERSHOP_DATABASE__MAX_CONNECTIONS)
    /// 4. DATABASE_URL and JWT_SECRET
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("Barbershop.toml").nested())
            .merge(Env::prefixed("BARBERSHOP_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "auth.jwt_secret".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_extract_without_any_source() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load()?;
            assert_eq!(config.api.base_path, DEFAULT_API_BASE_PATH);
            assert_eq!(config.auth.token_expiry_minutes, 1440);
            assert!(config.database.run_migrations);
            assert!(config.bootstrap.admin_email.is_none());
            Ok(())
        });
    }

    #[test]
    fn toml_file_and_env_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Barbershop.toml",
                r#"
                [default.server]
                port = 9000

                [default.logging]
                json_format = true
                "#,
            )?;
            jail.set_env("BARBERSHOP_DATABASE__MAX_CONNECTIONS", "4");
            jail.set_env("DATABASE_URL", "postgres://db.internal/shop");
            jail.set_env("JWT_SECRET", "from-env");

            let config = Config::load()?;
            assert_eq!(config.server.port, 9000);
            assert!(config.logging.json_format);
            assert_eq!(config.database.max_connections, 4);
            assert_eq!(config.database.url, "postgres://db.internal/shop");
            assert_eq!(config.auth.jwt_secret, "from-env");
            Ok(())
        });
    }
}
