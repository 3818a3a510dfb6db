//! Learning goal service
//!
//! Goals are private: another user's goal is reported as missing.

use chrono::Utc;
use edu_core::entities::LearningGoal;
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateGoalRequest, GoalResponse, UpdateGoalRequest};

use super::achievement::AchievementService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::support::clean_optional;

pub struct GoalService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GoalService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, user_id: Snowflake, request: CreateGoalRequest) -> ServiceResult<GoalResponse> {
        request.validate()?;

        let mut goal = LearningGoal::new(self.ctx.generate_id(), user_id, request.title.trim().to_string());
        goal.description = clean_optional(request.description);
        goal.target_date = request.target_date;

        self.ctx.goal_repo().create(&goal).await?;

        info!(goal_id = %goal.id, user_id = %user_id, "Learning goal created");
        Ok(GoalResponse::from(goal))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Snowflake) -> ServiceResult<Vec<GoalResponse>> {
        let goals = self.ctx.goal_repo().list_by_user(user_id).await?;
        Ok(goals.into_iter().map(GoalResponse::from).collect())
    }

    /// Completing a goal stamps `completed_at` and evaluates achievements
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Snowflake,
        goal_id: Snowflake,
        request: UpdateGoalRequest,
    ) -> ServiceResult<GoalResponse> {
        request.validate()?;

        let mut goal = self.find_owned(user_id, goal_id).await?;

        if let Some(title) = request.title {
            goal.title = title.trim().to_string();
        }
        if request.description.is_some() {
            goal.description = clean_optional(request.description);
        }
        if request.target_date.is_some() {
            goal.target_date = request.target_date;
        }
        let newly_completed = request
            .completed
            .is_some_and(|completed| goal.set_completed(completed));
        goal.updated_at = Utc::now();

        self.ctx.goal_repo().update(&goal).await?;

        if newly_completed {
            info!(goal_id = %goal_id, user_id = %user_id, "Learning goal completed");
            AchievementService::new(self.ctx)
                .evaluate_after_action(user_id)
                .await;
        }

        Ok(GoalResponse::from(goal))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Snowflake, goal_id: Snowflake) -> ServiceResult<()> {
        self.find_owned(user_id, goal_id).await?;
        self.ctx.goal_repo().delete(goal_id).await?;

        info!(goal_id = %goal_id, user_id = %user_id, "Learning goal deleted");
        Ok(())
    }

    async fn find_owned(&self, user_id: Snowflake, goal_id: Snowflake) -> ServiceResult<LearningGoal> {
        self.ctx
            .goal_repo()
            .find_by_id(goal_id)
            .await?
            .filter(|g| g.user_id == user_id)
            .ok_or_else(|| DomainError::GoalNotFound(goal_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::TestHarness;
    use chrono::NaiveDate;
    use edu_core::entities::AchievementKind;

    fn goal(title: &str) -> CreateGoalRequest {
        CreateGoalRequest {
            title: title.to_string(),
            description: Some("Chapters 4 to 6".to_string()),
            target_date: NaiveDate::from_ymd_opt(2020, 1, 1),
        }
    }

    #[tokio::test]
    async fn test_goal_of_another_user_is_invisible() {
        let h = TestHarness::new();
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let ravi = h.verified_user("Ravi", "ravi@college.edu").await;
        let goals = GoalService::new(&h.ctx);

        let created = goals.create(asha, goal("Revise OS")).await.unwrap();
        assert!(created.overdue);
        let id = Snowflake::parse(&created.id).unwrap();

        let err = goals
            .update(ravi, id, UpdateGoalRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(goals.delete(ravi, id).await.unwrap_err().status_code(), 404);
        assert!(goals.list(ravi).await.unwrap().is_empty());
        assert_eq!(goals.list(asha).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completing_a_goal() {
        let h = TestHarness::new();
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let goals = GoalService::new(&h.ctx);
        let id = Snowflake::parse(&goals.create(asha, goal("Revise OS")).await.unwrap().id).unwrap();

        let done = goals
            .update(
                asha,
                id,
                UpdateGoalRequest {
                    completed: Some(true),
                    ..UpdateGoalRequest::default()
                },
            )
            .await
            .unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert!(!done.overdue);

        let earned = h.ctx.achievement_repo().list_by_user(asha).await.unwrap();
        assert!(earned.iter().any(|(kind, _)| *kind == AchievementKind::GoalGetter));

        let reopened = goals
            .update(
                asha,
                id,
                UpdateGoalRequest {
                    completed: Some(false),
                    ..UpdateGoalRequest::default()
                },
            )
            .await
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }
}
