//! Test helpers for integration tests
//!
//! Spawns the API server on an ephemeral port and wraps the HTTP calls the
//! tests make against it.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use edu_api::{create_app, create_app_state};
use edu_common::AppConfig;
use reqwest::{multipart::Form, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{unique_suffix, AuthResponse, LoginRequest, RegisterRequest, RegisterResponse};

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    /// Registering with this address yields an admin account
    pub admin_email: String,
    db: PgPool,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(mut config: AppConfig) -> Result<Self> {
        let admin_email = format!("admin{}@college.test", unique_suffix());
        config.admin.emails.push(admin_email.clone());

        let state = create_app_state(config).await?;
        let db = state.db().clone();
        let app = create_app(state)?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            admin_email,
            db,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn with_auth(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::with_auth(self.client.get(self.url(path)), token)
            .send()
            .await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(Self::with_auth(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(Self::with_auth(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(Self::with_auth(self.client.put(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::with_auth(self.client.delete(self.url(path)), token)
            .send()
            .await?)
    }

    /// POST a multipart form
    pub async fn upload_auth(&self, path: &str, token: &str, form: Form) -> Result<Response> {
        Ok(Self::with_auth(self.client.post(self.url(path)), token)
            .multipart(form)
            .send()
            .await?)
    }

    /// Latest unused token of `purpose` for a user, as the mail would carry it
    pub async fn pending_token(&self, user_id: &str, purpose: &str) -> Result<String> {
        let user_id: i64 = user_id.parse().context("user id is not numeric")?;
        let token = sqlx::query_scalar::<_, String>(
            "SELECT token FROM verification_tokens \
             WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(purpose)
        .fetch_one(&self.db)
        .await?;
        Ok(token)
    }

    /// Register, verify and log in a fresh account
    pub async fn signup(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response = self.post("/api/auth/register", request).await?;
        let registered: RegisterResponse = assert_json(response, StatusCode::CREATED).await?;

        let token = self
            .pending_token(&registered.user_id, "email_verification")
            .await?;
        let response = self.get(&format!("/api/auth/verify-email/{token}")).await?;
        assert_status(response, StatusCode::OK).await?;

        let response = self
            .post("/api/auth/login", &LoginRequest::from_register(request))
            .await?;
        assert_json(response, StatusCode::OK).await
    }

    /// A verified student account
    pub async fn student(&self) -> Result<AuthResponse> {
        self.signup(&RegisterRequest::unique()).await
    }

    /// A verified admin account
    pub async fn admin(&self) -> Result<AuthResponse> {
        let mut request = RegisterRequest::unique();
        request.email = self.admin_email.clone();
        self.signup(&request).await
    }
}

/// Create a test configuration
///
/// Uploads land in a scratch directory and the rate limiter is opened up so
/// multi-step tests are never throttled.
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    config.rate_limit.requests_per_second = 1000;
    config.rate_limit.burst = 1000;
    config.storage.upload_dir = std::env::temp_dir()
        .join(format!("edu-it-uploads-{}", unique_suffix()))
        .to_string_lossy()
        .into_owned();

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .context("error body without a code")
}
