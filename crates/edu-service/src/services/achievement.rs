//! Achievement service
//!
//! Evaluates activity counters against the achievement thresholds and
//! reports progress. Awards are idempotent per (user, kind).

use std::collections::HashMap;

use edu_core::entities::{Achievement, AchievementKind};
use edu_core::Snowflake;
use tracing::{info, instrument, warn};

use crate::dto::{AchievementResponse, AchievementsResponse, AuthorSummary, LeaderboardEntry};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub const MAX_LEADERBOARD: i64 = 50;

pub struct AchievementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AchievementService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Award every kind the user has reached but not yet received.
    ///
    /// Returns the kinds awarded by this call.
    #[instrument(skip(self))]
    pub async fn evaluate(&self, user_id: Snowflake) -> ServiceResult<Vec<AchievementKind>> {
        let repo = self.ctx.achievement_repo();
        let stats = repo.activity_stats(user_id).await?;
        let awarded: Vec<AchievementKind> = repo
            .list_by_user(user_id)
            .await?
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();

        let mut new_awards = Vec::new();
        for kind in Achievement::newly_earned(&stats, &awarded) {
            if repo.award(user_id, kind).await? {
                info!(user_id = %user_id, achievement = kind.as_str(), "Achievement awarded");
                new_awards.push(kind);
            }
        }
        Ok(new_awards)
    }

    /// Evaluate after a user action; failures are logged and swallowed
    pub async fn evaluate_after_action(&self, user_id: Snowflake) {
        if let Err(e) = self.evaluate(user_id).await {
            warn!(user_id = %user_id, error = %e, "Achievement evaluation failed");
        }
    }

    /// Every kind with its earned flag and progress
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: Snowflake) -> ServiceResult<AchievementsResponse> {
        let repo = self.ctx.achievement_repo();
        let stats = repo.activity_stats(user_id).await?;
        let awarded: HashMap<AchievementKind, _> =
            repo.list_by_user(user_id).await?.into_iter().collect();

        let achievements: Vec<AchievementResponse> = AchievementKind::ALL
            .into_iter()
            .map(|kind| {
                let awarded_at = awarded.get(&kind).copied();
                AchievementResponse {
                    kind: kind.as_str().to_string(),
                    title: kind.title().to_string(),
                    description: kind.description().to_string(),
                    threshold: kind.threshold(),
                    progress: kind.progress(&stats),
                    earned: awarded_at.is_some(),
                    awarded_at,
                }
            })
            .collect();

        Ok(AchievementsResponse {
            earned_count: achievements.iter().filter(|a| a.earned).count(),
            achievements,
        })
    }

    #[instrument(skip(self))]
    pub async fn leaderboard(&self, limit: Option<i64>) -> ServiceResult<Vec<LeaderboardEntry>> {
        let limit = limit.unwrap_or(10).clamp(1, MAX_LEADERBOARD);
        let rows = self.ctx.achievement_repo().leaderboard(limit).await?;

        let ids: Vec<Snowflake> = rows.iter().map(|(id, _)| *id).collect();
        let users: HashMap<Snowflake, AuthorSummary> = self
            .ctx
            .user_repo()
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(id, count)| users.get(&id).cloned().map(|user| (user, count)))
            .enumerate()
            .map(|(i, (user, achievement_count))| LeaderboardEntry {
                rank: i + 1,
                user,
                achievement_count,
            })
            .collect())
    }
}
