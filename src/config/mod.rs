use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for any single durable-store call before the request
    /// falls back to the in-process lists.
    pub timeout_ms: u64,
    /// When false the site runs on the fallback lists only.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Argon2 PHC string. Takes precedence over `admin_password`.
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<String>,
    pub session_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
    /// Root directory that legacy `file_path`/`image_path` references are
    /// resolved against.
    pub legacy_dir: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            legacy_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Grace Community Church".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.base_url", "http://localhost:3000")?
            .set_default("database.url", "sqlite://chapel.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.timeout_ms", 3000)?
            .set_default("database.enabled", true)?
            .set_default("auth.session_duration_hours", 24)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with CHAPEL__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("CHAPEL").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://chapel.db?mode=rwc".to_string(),
                max_connections: 10,
                timeout_ms: 3000,
                enabled: true,
            },
            auth: AuthConfig {
                admin_password_hash: None,
                admin_password: Some("change-me-in-production".to_string()),
                session_duration_hours: 24,
            },
            uploads: UploadConfig::default(),
            site: SiteConfig::default(),
        }
    }
}
