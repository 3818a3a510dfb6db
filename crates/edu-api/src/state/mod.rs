//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration and the pools the readiness check pings.

use std::sync::Arc;

use edu_cache::RedisPool;
use edu_common::{AppConfig, JwtService};
use edu_db::PgPool;
use edu_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    db: PgPool,
    redis: RedisPool,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig, db: PgPool, redis: RedisPool) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            db,
            redis,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    pub fn redis(&self) -> &RedisPool {
        &self.redis
    }

    /// Get the JWT service from the service context
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("redis", &self.redis)
            .finish()
    }
}
