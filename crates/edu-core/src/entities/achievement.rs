//! Achievements - badges awarded from a user's activity counters
//!
//! The rules are pure functions of [`ActivityStats`] so they can be evaluated
//! anywhere; persistence only records which kinds were already awarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Activity counters an achievement rule can look at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub uploads: i64,
    pub downloads: i64,
    pub forum_posts: i64,
    pub forum_replies: i64,
    pub bookmarks: i64,
    pub goals_completed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstUpload,
    Contributor,
    ProlificContributor,
    FirstDownload,
    Scholar,
    ForumVoice,
    Helper,
    Collector,
    GoalGetter,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 9] = [
        Self::FirstUpload,
        Self::Contributor,
        Self::ProlificContributor,
        Self::FirstDownload,
        Self::Scholar,
        Self::ForumVoice,
        Self::Helper,
        Self::Collector,
        Self::GoalGetter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstUpload => "first_upload",
            Self::Contributor => "contributor",
            Self::ProlificContributor => "prolific_contributor",
            Self::FirstDownload => "first_download",
            Self::Scholar => "scholar",
            Self::ForumVoice => "forum_voice",
            Self::Helper => "helper",
            Self::Collector => "collector",
            Self::GoalGetter => "goal_getter",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstUpload => "First Upload",
            Self::Contributor => "Contributor",
            Self::ProlificContributor => "Prolific Contributor",
            Self::FirstDownload => "First Download",
            Self::Scholar => "Scholar",
            Self::ForumVoice => "Forum Voice",
            Self::Helper => "Helper",
            Self::Collector => "Collector",
            Self::GoalGetter => "Goal Getter",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstUpload => "Upload your first resource",
            Self::Contributor => "Upload 5 resources",
            Self::ProlificContributor => "Upload 25 resources",
            Self::FirstDownload => "Download your first resource",
            Self::Scholar => "Download 10 resources",
            Self::ForumVoice => "Start your first forum discussion",
            Self::Helper => "Reply to 10 forum discussions",
            Self::Collector => "Bookmark 10 resources",
            Self::GoalGetter => "Complete a learning goal",
        }
    }

    pub fn threshold(self) -> i64 {
        match self {
            Self::FirstUpload
            | Self::FirstDownload
            | Self::ForumVoice
            | Self::GoalGetter => 1,
            Self::Contributor => 5,
            Self::Scholar | Self::Helper | Self::Collector => 10,
            Self::ProlificContributor => 25,
        }
    }

    /// The counter this kind is measured against
    pub fn metric(self, stats: &ActivityStats) -> i64 {
        match self {
            Self::FirstUpload | Self::Contributor | Self::ProlificContributor => stats.uploads,
            Self::FirstDownload | Self::Scholar => stats.downloads,
            Self::ForumVoice => stats.forum_posts,
            Self::Helper => stats.forum_replies,
            Self::Collector => stats.bookmarks,
            Self::GoalGetter => stats.goals_completed,
        }
    }

    pub fn is_earned(self, stats: &ActivityStats) -> bool {
        self.metric(stats) >= self.threshold()
    }

    /// Current progress capped at the threshold
    pub fn progress(self, stats: &ActivityStats) -> i64 {
        self.metric(stats).min(self.threshold())
    }
}

impl std::str::FromStr for AchievementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::InternalError(format!("unknown achievement: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub user_id: Snowflake,
    pub kind: AchievementKind,
    pub awarded_at: DateTime<Utc>,
}

impl Achievement {
    /// Kinds earned by `stats` that are not in `awarded` yet
    pub fn newly_earned(stats: &ActivityStats, awarded: &[AchievementKind]) -> Vec<AchievementKind> {
        AchievementKind::ALL
            .into_iter()
            .filter(|kind| kind.is_earned(stats) && !awarded.contains(kind))
            .collect()
    }
}
