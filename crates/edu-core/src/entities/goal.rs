//! Learning goals tracked per user

use chrono::{DateTime, NaiveDate, Utc};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningGoal {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningGoal {
    pub fn new(id: Snowflake, user_id: Snowflake, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            title,
            description: None,
            target_date: None,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the completion flag. Returns true when the goal just became complete.
    pub fn set_completed(&mut self, completed: bool) -> bool {
        let newly = completed && !self.completed;
        self.completed = completed;
        self.completed_at = if completed {
            self.completed_at.or_else(|| Some(Utc::now()))
        } else {
            None
        };
        self.updated_at = Utc::now();
        newly
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.target_date.is_some_and(|d| d < today)
    }
}
