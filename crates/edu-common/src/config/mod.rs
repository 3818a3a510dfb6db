//! Configuration structs

mod app_config;

pub use app_config::{
    AdminConfig, AiConfig, AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig,
    Environment, JwtConfig, MailConfig, RateLimitConfig, RedisConfig, ServerConfig,
    SnowflakeConfig, StorageConfig, TokenConfig,
};
