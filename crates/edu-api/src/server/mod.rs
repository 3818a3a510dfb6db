//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use edu_cache::{RedisPool, RedisSessionStore, RedisViewTracker};
use edu_common::{AppConfig, AppError, JwtService};
use edu_core::SnowflakeGenerator;
use edu_db::{
    create_pool, run_migrations, PgAchievementRepository, PgBookmarkRepository, PgChatRepository,
    PgCmsRepository, PgDownloadRepository, PgForumRepository, PgGoalRepository,
    PgResourceRepository, PgStatsRepository, PgUserRepository, PgVerificationTokenRepository,
};
use edu_service::integrations::{ai_client_from_config, mailer_from_config, FileStorage};
use edu_service::{ServiceContext, ServiceSettings};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::middleware::{apply_common_layers, apply_middleware};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Timeout for calls to the mail relay and the AI endpoint
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the complete Axum application with all routes and middleware
///
/// Health checks skip the rate limiter so orchestrators are never throttled.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware(create_router(), config)?;
    let health = apply_common_layers(
        health_routes(),
        &config.cors,
        config.app.env.is_production(),
    );

    Ok(health.merge(api).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&edu_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, &config.database.migrations_dir)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis = RedisPool::from_config(&config.redis)?;
    info!("Redis pool created");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));
    let session_ttl = u64::try_from(config.jwt.refresh_token_expiry)
        .map_err(|_| AppError::Config("JWT refresh expiry must be positive".to_string()))?;

    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;

    let service_context = ServiceContext::builder()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .token_repo(Arc::new(PgVerificationTokenRepository::new(pool.clone())))
        .resource_repo(Arc::new(PgResourceRepository::new(pool.clone())))
        .download_repo(Arc::new(PgDownloadRepository::new(pool.clone())))
        .bookmark_repo(Arc::new(PgBookmarkRepository::new(pool.clone())))
        .forum_repo(Arc::new(PgForumRepository::new(pool.clone())))
        .achievement_repo(Arc::new(PgAchievementRepository::new(pool.clone())))
        .goal_repo(Arc::new(PgGoalRepository::new(pool.clone())))
        .cms_repo(Arc::new(PgCmsRepository::new(pool.clone())))
        .chat_repo(Arc::new(PgChatRepository::new(pool.clone())))
        .stats_repo(Arc::new(PgStatsRepository::new(pool.clone())))
        .session_store(Arc::new(RedisSessionStore::new(redis.clone(), session_ttl)))
        .view_tracker(Arc::new(RedisViewTracker::new(redis.clone())))
        .mailer(mailer_from_config(&config.mail, http.clone()))
        .ai_client(ai_client_from_config(&config.ai, http))
        .storage(Arc::new(FileStorage::new(&config.storage.upload_dir)))
        .jwt_service(jwt_service)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(ServiceSettings::from(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool, redis))
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run_server<F>(app: Router, addr: &str, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;
    let local: SocketAddr = listener
        .local_addr()
        .map_err(|e| AppError::Config(e.to_string()))?;

    info!("Server listening on http://{}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, &addr, shutdown_signal()).await
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
