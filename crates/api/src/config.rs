use serde::Deserialize;
use shared::jwt::{JwtConfig, JwtError};
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    /// Text-generation backend for the assistant
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// First administrator account
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Where events, registrations, accounts and profiles are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart.
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-user quota for the assistant endpoints; 0 disables the limit.
    #[serde(default = "default_assistant_rate_limit")]
    pub assistant_rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret for HS256; takes precedence over the RSA key pair
    #[serde(default)]
    pub secret: String,

    /// RSA private key in PEM format for RS256 signing
    #[serde(default)]
    pub private_key: String,

    /// RSA public key in PEM format for RS256 verification
    #[serde(default)]
    pub public_key: String,

    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Clock skew tolerance in seconds
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl JwtAuthConfig {
    fn has_key_material(&self) -> bool {
        !self.secret.is_empty() || (!self.private_key.is_empty() && !self.public_key.is_empty())
    }

    /// Builds the signing configuration from whichever key material is set.
    pub fn to_jwt_config(&self) -> Result<JwtConfig, JwtError> {
        if !self.secret.is_empty() {
            JwtConfig::from_secret(
                &self.secret,
                self.access_token_expiry_secs,
                self.refresh_token_expiry_secs,
                self.leeway_secs,
            )
        } else {
            JwtConfig::from_rsa_pem(
                &self.private_key,
                &self.public_key,
                self.access_token_expiry_secs,
                self.refresh_token_expiry_secs,
                self.leeway_secs,
            )
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Empty means the assistant answers with its unavailable message.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_assistant_model")]
    pub model: String,

    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,

    #[serde(default = "default_assistant_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_assistant_model(),
            base_url: default_assistant_base_url(),
            timeout_ms: default_assistant_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub bootstrap_email: String,

    #[serde(default)]
    pub bootstrap_password: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_assistant_rate_limit() -> u32 {
    20
}
fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}
fn default_refresh_token_expiry() -> i64 {
    2592000 // 30 days
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_assistant_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_assistant_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_assistant_timeout_ms() -> u64 {
    15000
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Defaults embedded for tests, so no config files are read.
const EMBEDDED_DEFAULTS: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 8080
    request_timeout_secs = 30

    [storage]
    backend = "memory"

    [database]
    url = ""
    max_connections = 20
    min_connections = 5
    connect_timeout_secs = 10
    idle_timeout_secs = 600

    [logging]
    level = "info"
    format = "json"

    [security]
    cors_origins = []
    assistant_rate_limit_per_minute = 20

    [jwt]
    secret = ""
    access_token_expiry_secs = 3600
    refresh_token_expiry_secs = 2592000
    leeway_secs = 30

    [assistant]
    api_key = ""
    model = "gemini-2.5-flash"
    timeout_ms = 15000

    [admin]
    bootstrap_email = ""
    bootstrap_password = ""
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with EVENTS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("EVENTS").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a configuration from embedded defaults plus `overrides`.
    ///
    /// Reads no files and skips validation, so tests can assemble partial configs.
    pub fn load_with_overrides(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(EMBEDDED_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "EVENTS__DATABASE__URL must be set for the postgres backend".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if !self.jwt.has_key_material() {
            return Err(ConfigValidationError::MissingRequired(
                "EVENTS__JWT__SECRET or an RSA key pair must be set".to_string(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
