//! Middleware stack for the API server
//!
//! Request ids, tracing, timeouts, CORS, security headers, body limits and
//! rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    Extension,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use edu_common::{AppConfig, AppError, CorsConfig, RateLimitConfig};
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::extractors::UploadLimit;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Room for the multipart envelope around the largest allowed file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the full middleware stack
///
/// Layers wrap from the bottom up, so a request passes rate limiting first
/// and the body limit last.
pub fn apply_middleware(router: Router<AppState>, config: &AppConfig) -> Result<Router<AppState>, AppError> {
    let router = apply_body_limit(router, config.storage.max_file_size_bytes());
    let router = apply_security_headers(router);
    let router = apply_common_layers(router, &config.cors, config.app.env.is_production());
    apply_rate_limit(router, &config.rate_limit)
}

/// Request id, tracing, timeout and CORS; also used for the health routes
pub fn apply_common_layers(router: Router<AppState>, cors: &CorsConfig, is_production: bool) -> Router<AppState> {
    router
        .layer(create_cors_layer(cors, is_production))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
}

/// Replaces axum's default 2 MB cap so uploads up to `max_file_bytes` fit
fn apply_body_limit<S>(router: Router<S>, max_file_bytes: u64) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let limit = usize::try_from(max_file_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(Extension(UploadLimit(max_file_bytes)))
}

fn apply_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

/// Global token bucket shared by every client
fn apply_rate_limit(router: Router<AppState>, config: &RateLimitConfig) -> Result<Router<AppState>, AppError> {
    if config.requests_per_second == 0 {
        return Err(AppError::Config("rate limit needs a non-zero rate".to_string()));
    }
    // One token is replenished every `interval` milliseconds
    let interval = (1000 / u64::from(config.requests_per_second)).max(1);

    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(interval)
        .burst_size(config.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(|| {
            AppError::Config("rate limit needs a non-zero burst".to_string())
        })?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            header::CONTENT_DISPOSITION,
        ]);

    if !is_production && config.allowed_origins.is_empty() {
        warn!("CORS: allowing any origin (development mode), set CORS_ALLOWED_ORIGINS for production");
        return base_layer.allow_origin(Any);
    }

    if config.allowed_origins.is_empty() {
        warn!("CORS: no allowed origins configured in production, browsers will be blocked");
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    info!(count = origins.len(), "CORS: allowing configured origins");
    // The access token cookie only travels with credentialed requests
    base_layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
