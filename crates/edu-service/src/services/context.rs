//! Service context - dependency container for services
//!
//! Holds all repositories, cache stores, and other dependencies needed by services.

use std::sync::Arc;

use chrono::Duration;
use edu_cache::{SessionStore, ViewTracker};
use edu_common::auth::JwtService;
use edu_common::{AdminConfig, AppConfig, TokenConfig};
use edu_core::traits::{
    AchievementRepository, BookmarkRepository, ChatRepository, CmsRepository,
    DownloadRepository, ForumRepository, GoalRepository, ResourceRepository, StatsRepository,
    UserRepository, VerificationTokenRepository,
};
use edu_core::{Snowflake, SnowflakeGenerator};

use crate::integrations::{AiClient, DisabledAiClient, FileStorage, LogMailer, Mailer};

use super::error::{ServiceError, ServiceResult};

/// Plain settings the services read at runtime
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub tokens: TokenConfig,
    pub admin: AdminConfig,
    /// Base URL used for links in emails
    pub frontend_url: String,
    pub max_upload_bytes: u64,
    /// Previous chat turns sent to the AI endpoint
    pub chat_history_window: i64,
    pub backup_dir: String,
    pub backup_command: String,
    pub database_url: String,
}

impl ServiceSettings {
    pub fn verification_ttl(&self) -> Duration {
        Duration::minutes(self.tokens.verification_ttl_minutes)
    }

    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.tokens.reset_ttl_minutes)
    }

    pub fn resend_cooldown(&self) -> Duration {
        Duration::seconds(self.tokens.resend_cooldown_secs)
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            admin: AdminConfig::default(),
            frontend_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            chat_history_window: 10,
            backup_dir: "./backups".to_string(),
            backup_command: "pg_dump".to_string(),
            database_url: String::new(),
        }
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            tokens: config.tokens.clone(),
            admin: config.admin.clone(),
            frontend_url: config.mail.frontend_url.clone(),
            max_upload_bytes: config.storage.max_file_size_bytes(),
            chat_history_window: config.ai.history_window,
            backup_dir: config.storage.backup_dir.clone(),
            backup_command: config.storage.backup_command.clone(),
            database_url: config.database.url.clone(),
        }
    }
}

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// Repositories and cache stores are trait objects so tests can run the
/// services against in-memory implementations.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn VerificationTokenRepository>,
    resource_repo: Arc<dyn ResourceRepository>,
    download_repo: Arc<dyn DownloadRepository>,
    bookmark_repo: Arc<dyn BookmarkRepository>,
    forum_repo: Arc<dyn ForumRepository>,
    achievement_repo: Arc<dyn AchievementRepository>,
    goal_repo: Arc<dyn GoalRepository>,
    cms_repo: Arc<dyn CmsRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    stats_repo: Arc<dyn StatsRepository>,

    // Cache stores
    session_store: Arc<dyn SessionStore>,
    view_tracker: Arc<dyn ViewTracker>,

    // Outbound
    mailer: Arc<dyn Mailer>,
    ai_client: Arc<dyn AiClient>,
    storage: Arc<FileStorage>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: Arc<ServiceSettings>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn token_repo(&self) -> &dyn VerificationTokenRepository {
        self.token_repo.as_ref()
    }

    pub fn resource_repo(&self) -> &dyn ResourceRepository {
        self.resource_repo.as_ref()
    }

    pub fn download_repo(&self) -> &dyn DownloadRepository {
        self.download_repo.as_ref()
    }

    pub fn bookmark_repo(&self) -> &dyn BookmarkRepository {
        self.bookmark_repo.as_ref()
    }

    pub fn forum_repo(&self) -> &dyn ForumRepository {
        self.forum_repo.as_ref()
    }

    pub fn achievement_repo(&self) -> &dyn AchievementRepository {
        self.achievement_repo.as_ref()
    }

    pub fn goal_repo(&self) -> &dyn GoalRepository {
        self.goal_repo.as_ref()
    }

    pub fn cms_repo(&self) -> &dyn CmsRepository {
        self.cms_repo.as_ref()
    }

    pub fn chat_repo(&self) -> &dyn ChatRepository {
        self.chat_repo.as_ref()
    }

    pub fn stats_repo(&self) -> &dyn StatsRepository {
        self.stats_repo.as_ref()
    }

    // === Cache Stores ===

    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    pub fn view_tracker(&self) -> &dyn ViewTracker {
        self.view_tracker.as_ref()
    }

    // === Outbound ===

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn ai_client(&self) -> &dyn AiClient {
        self.ai_client.as_ref()
    }

    pub fn storage(&self) -> &FileStorage {
        self.storage.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        self.settings.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache_stores", &"...")
            .field("storage", &self.storage)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext
///
/// Repositories, cache stores, storage and the JWT service are required. The
/// mailer defaults to logging, the AI client to disabled and the settings to
/// their defaults.
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    token_repo: Option<Arc<dyn VerificationTokenRepository>>,
    resource_repo: Option<Arc<dyn ResourceRepository>>,
    download_repo: Option<Arc<dyn DownloadRepository>>,
    bookmark_repo: Option<Arc<dyn BookmarkRepository>>,
    forum_repo: Option<Arc<dyn ForumRepository>>,
    achievement_repo: Option<Arc<dyn AchievementRepository>>,
    goal_repo: Option<Arc<dyn GoalRepository>>,
    cms_repo: Option<Arc<dyn CmsRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
    stats_repo: Option<Arc<dyn StatsRepository>>,
    session_store: Option<Arc<dyn SessionStore>>,
    view_tracker: Option<Arc<dyn ViewTracker>>,
    mailer: Option<Arc<dyn Mailer>>,
    ai_client: Option<Arc<dyn AiClient>>,
    storage: Option<Arc<FileStorage>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn token_repo(mut self, repo: Arc<dyn VerificationTokenRepository>) -> Self {
        self.token_repo = Some(repo);
        self
    }

    pub fn resource_repo(mut self, repo: Arc<dyn ResourceRepository>) -> Self {
        self.resource_repo = Some(repo);
        self
    }

    pub fn download_repo(mut self, repo: Arc<dyn DownloadRepository>) -> Self {
        self.download_repo = Some(repo);
        self
    }

    pub fn bookmark_repo(mut self, repo: Arc<dyn BookmarkRepository>) -> Self {
        self.bookmark_repo = Some(repo);
        self
    }

    pub fn forum_repo(mut self, repo: Arc<dyn ForumRepository>) -> Self {
        self.forum_repo = Some(repo);
        self
    }

    pub fn achievement_repo(mut self, repo: Arc<dyn AchievementRepository>) -> Self {
        self.achievement_repo = Some(repo);
        self
    }

    pub fn goal_repo(mut self, repo: Arc<dyn GoalRepository>) -> Self {
        self.goal_repo = Some(repo);
        self
    }

    pub fn cms_repo(mut self, repo: Arc<dyn CmsRepository>) -> Self {
        self.cms_repo = Some(repo);
        self
    }

    pub fn chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    pub fn stats_repo(mut self, repo: Arc<dyn StatsRepository>) -> Self {
        self.stats_repo = Some(repo);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn view_tracker(mut self, tracker: Arc<dyn ViewTracker>) -> Self {
        self.view_tracker = Some(tracker);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn ai_client(mut self, client: Arc<dyn AiClient>) -> Self {
        self.ai_client = Some(client);
        self
    }

    pub fn storage(mut self, storage: Arc<FileStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            token_repo: required(self.token_repo, "token_repo")?,
            resource_repo: required(self.resource_repo, "resource_repo")?,
            download_repo: required(self.download_repo, "download_repo")?,
            bookmark_repo: required(self.bookmark_repo, "bookmark_repo")?,
            forum_repo: required(self.forum_repo, "forum_repo")?,
            achievement_repo: required(self.achievement_repo, "achievement_repo")?,
            goal_repo: required(self.goal_repo, "goal_repo")?,
            cms_repo: required(self.cms_repo, "cms_repo")?,
            chat_repo: required(self.chat_repo, "chat_repo")?,
            stats_repo: required(self.stats_repo, "stats_repo")?,
            session_store: required(self.session_store, "session_store")?,
            view_tracker: required(self.view_tracker, "view_tracker")?,
            storage: required(self.storage, "storage")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            mailer: self.mailer.unwrap_or_else(|| Arc::new(LogMailer)),
            ai_client: self.ai_client.unwrap_or_else(|| Arc::new(DisabledAiClient)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            settings: Arc::new(self.settings.unwrap_or_default()),
        })
    }
}
