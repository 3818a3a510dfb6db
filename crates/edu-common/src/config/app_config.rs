//! Application configuration structs
//!
//! Loaded from environment variables (a `.env` file is honored).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub tokens: TokenConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub ai: AiConfig,
    pub admin: AdminConfig,
    pub snowflake: SnowflakeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Directory holding the SQL migrations applied at startup
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration (expiry in seconds)
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Lifetimes for email verification and password reset tokens (minutes)
/// and the minimum gap between two emails of the same kind (seconds)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_verification_ttl")]
    pub verification_ttl_minutes: i64,
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_minutes: i64,
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            verification_ttl_minutes: default_verification_ttl(),
            reset_ttl_minutes: default_reset_ttl(),
            resend_cooldown_secs: default_resend_cooldown(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Upload and backup storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    #[serde(default = "default_backup_command")]
    pub backup_command: String,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }
}

/// Outbound email. Without a relay URL messages are only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Base URL of the web frontend, used to build links in emails
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    pub relay_url: Option<String>,
    pub relay_api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from_address: String,
    #[serde(default = "default_mail_from_name")]
    pub from_name: String,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_api_url")]
    pub api_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Number of previous messages sent as context
    #[serde(default = "default_ai_history")]
    pub history_window: i64,
}

/// Accounts registered with one of these emails get the admin role
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub emails: Vec<String>,
}

impl AdminConfig {
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "eduresources".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_migrations_dir() -> String {
    "./migrations".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_verification_ttl() -> i64 {
    15
}

fn default_reset_ttl() -> i64 {
    60
}

fn default_resend_cooldown() -> i64 {
    60
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    25
}

fn default_backup_dir() -> String {
    "./backups".to_string()
}

fn default_backup_command() -> String {
    "pg_dump".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_mail_from() -> String {
    "no-reply@eduresources.local".to_string()
}

fn default_mail_from_name() -> String {
    "EduResources".to_string()
}

fn default_ai_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_history() -> i64 {
    10
}

/// Parse an optional variable, falling back to `default` when unset.
/// A set but unparsable value is an error rather than silently ignored.
fn env_parse<T: FromStr>(key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        Err(_) => Ok(default()),
    }
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .ok()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env = match env::var("APP_ENV") {
            Ok(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            Err(_) => Environment::default(),
        };

        let worker_id: u16 = env_parse("WORKER_ID", || 0)?;
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
        }

        let port = env_required("API_PORT")?;

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: port
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("API_PORT", port.clone()))?,
            },
            database: DatabaseConfig {
                url: env_required("DATABASE_URL")?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                migrations_dir: env::var("MIGRATIONS_DIR")
                    .unwrap_or_else(|_| default_migrations_dir()),
            },
            redis: RedisConfig {
                url: env_required("REDIS_URL")?,
                max_connections: env_parse("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            jwt: JwtConfig {
                secret: env_required("JWT_SECRET")?,
                access_token_expiry: env_parse(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry,
                )?,
                refresh_token_expiry: env_parse(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    default_refresh_token_expiry,
                )?,
            },
            tokens: TokenConfig {
                verification_ttl_minutes: env_parse(
                    "VERIFICATION_TOKEN_TTL_MINUTES",
                    default_verification_ttl,
                )?,
                reset_ttl_minutes: env_parse("RESET_TOKEN_TTL_MINUTES", default_reset_ttl)?,
                resend_cooldown_secs: env_parse("EMAIL_RESEND_COOLDOWN_SECS", default_resend_cooldown)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: env_parse(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: env_parse("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env_list("CORS_ALLOWED_ORIGINS"),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| default_upload_dir()),
                max_file_size_mb: env_parse("MAX_FILE_SIZE_MB", default_max_file_size)?,
                backup_dir: env::var("BACKUP_DIR").unwrap_or_else(|_| default_backup_dir()),
                backup_command: env::var("BACKUP_COMMAND")
                    .unwrap_or_else(|_| default_backup_command()),
            },
            mail: MailConfig {
                frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| default_frontend_url()),
                relay_url: env_optional("MAIL_RELAY_URL"),
                relay_api_key: env_optional("MAIL_RELAY_API_KEY"),
                from_address: env::var("MAIL_FROM_ADDRESS").unwrap_or_else(|_| default_mail_from()),
                from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| default_mail_from_name()),
            },
            ai: AiConfig {
                api_url: env::var("AI_API_URL").unwrap_or_else(|_| default_ai_api_url()),
                api_key: env_optional("AI_API_KEY"),
                model: env::var("AI_MODEL").unwrap_or_else(|_| default_ai_model()),
                history_window: env_parse("AI_HISTORY_WINDOW", default_ai_history)?,
            },
            admin: AdminConfig {
                emails: env_list("ADMIN_EMAILS"),
            },
            snowflake: SnowflakeConfig { worker_id },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
