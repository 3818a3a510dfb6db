//! Admin service
//!
//! User management, the dashboard and database backups. Every operation
//! re-reads the caller's role from the database.

use std::path::{Path, PathBuf};

use chrono::Utc;
use edu_core::entities::UserRole;
use edu_core::{DomainError, Snowflake};
use tokio::process::Command;
use tracing::{error, info, instrument, warn};

use crate::dto::{
    BackupResponse, DashboardResponse, PageQuery, PaginatedResponse, ProfileResponse,
    UpdateRoleRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::support::{next_cursor, page_limit, require_admin};

const RECENT_USERS: i64 = 5;

pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All users, newest first
    #[instrument(skip(self, query))]
    pub async fn list_users(
        &self,
        actor_id: Snowflake,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<ProfileResponse>> {
        require_admin(self.ctx, actor_id).await?;

        let limit = page_limit(query.limit);
        let users = self.ctx.user_repo().list(query.before, limit).await?;
        let next = next_cursor(&users, limit, |u| u.id);

        Ok(PaginatedResponse::new(
            users.iter().map(ProfileResponse::from).collect(),
            next,
            limit,
        ))
    }

    #[instrument(skip(self, request))]
    pub async fn set_role(
        &self,
        actor_id: Snowflake,
        target_id: Snowflake,
        request: UpdateRoleRequest,
    ) -> ServiceResult<ProfileResponse> {
        require_admin(self.ctx, actor_id).await?;
        let role: UserRole = request.role.parse()?;

        if actor_id == target_id {
            return Err(DomainError::CannotModifySelf.into());
        }

        let mut target = self
            .ctx
            .user_repo()
            .find_by_id(target_id)
            .await?
            .ok_or(DomainError::UserNotFound(target_id))?;

        self.ctx.user_repo().set_role(target_id, role).await?;
        target.set_role(role);

        info!(actor_id = %actor_id, target_id = %target_id, role = %role, "User role changed");
        Ok(ProfileResponse::from(&target))
    }

    /// Soft delete another account and end its sessions
    #[instrument(skip(self))]
    pub async fn delete_user(&self, actor_id: Snowflake, target_id: Snowflake) -> ServiceResult<()> {
        require_admin(self.ctx, actor_id).await?;

        if actor_id == target_id {
            return Err(DomainError::CannotModifySelf.into());
        }

        self.ctx.user_repo().delete(target_id).await?;
        if let Err(e) = self.ctx.session_store().revoke_all_for_user(target_id).await {
            warn!(target_id = %target_id, error = %e, "Failed to revoke sessions of deleted user");
        }

        info!(actor_id = %actor_id, target_id = %target_id, "User deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, actor_id: Snowflake) -> ServiceResult<DashboardResponse> {
        require_admin(self.ctx, actor_id).await?;

        let counts = self.ctx.stats_repo().counts().await?;
        let recent = self.ctx.user_repo().list(None, RECENT_USERS).await?;

        Ok(DashboardResponse {
            total_users: counts.total_users,
            total_admins: counts.total_admins,
            total_students: counts.total_students(),
            verified_users: counts.verified_users,
            papers: counts.papers,
            notes: counts.notes,
            syllabus: counts.syllabus,
            downloads: counts.downloads,
            forum_posts: counts.forum_posts,
            recent_users: recent.iter().map(ProfileResponse::from).collect(),
        })
    }

    /// Start a database dump in the background and return its target file name
    #[instrument(skip(self))]
    pub async fn start_backup(&self, actor_id: Snowflake) -> ServiceResult<BackupResponse> {
        require_admin(self.ctx, actor_id).await?;

        let settings = self.ctx.settings();
        let dir = PathBuf::from(&settings.backup_dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::internal(format!("cannot create backup directory: {e}")))?;

        let file = format!("backup_{}.sql", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(&file);

        let mut command = backup_command(&settings.backup_command, &settings.database_url, &path);

        let file_for_log = file.clone();
        tokio::spawn(async move {
            match command.output().await {
                Ok(output) if output.status.success() => {
                    info!(file = %file_for_log, "Database backup completed");
                }
                Ok(output) => {
                    warn!(
                        file = %file_for_log,
                        status = ?output.status.code(),
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "Database backup failed"
                    );
                }
                Err(e) => error!(file = %file_for_log, error = %e, "Could not start backup process"),
            }
        });

        info!(actor_id = %actor_id, file = %file, "Database backup started");
        Ok(BackupResponse {
            message: "Backup started".to_string(),
            file,
        })
    }
}

/// `pg_dump` invocation; the password travels in `PGPASSWORD`, never in argv
fn backup_command(program: &str, database_url: &str, target: &Path) -> Command {
    let (dbname, password) = split_password(database_url);

    let mut command = Command::new(program);
    command
        .arg(format!("--dbname={dbname}"))
        .arg(format!("--file={}", target.display()))
        .kill_on_drop(false);
    if let Some(password) = password {
        command.env("PGPASSWORD", password);
    }
    command
}

/// Connection URI with the password removed, plus the decoded password
fn split_password(database_url: &str) -> (String, Option<String>) {
    let Ok(mut url) = reqwest::Url::parse(database_url) else {
        return (database_url.to_string(), None);
    };
    let Some(password) = url.password().map(percent_decode) else {
        return (database_url.to_string(), None);
    };
    if url.set_password(None).is_err() {
        return (database_url.to_string(), None);
    }
    (url.to_string(), Some(password))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| input.get(i + 1..i + 3))
            .flatten()
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
