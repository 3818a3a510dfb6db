//! In-memory test doubles for the service layer
//!
//! One [`MemoryStore`] implements every repository trait over a single
//! mutex-guarded state, so activity counters can be derived exactly the way
//! the SQL implementation derives them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edu_cache::{RedisResult, RefreshSession, SessionStore, ViewTracker};
use edu_common::auth::JwtService;
use edu_core::entities::{
    AchievementKind, ActivityStats, Bookmark, ChatMessage, CmsContent, Download, ForumPost,
    ForumReply, LearningGoal, Resource, TokenPurpose, User, UserRole, VerificationToken,
};
use edu_core::traits::{
    AchievementRepository, BookmarkRepository, ChatRepository, CmsQuery, CmsRepository,
    DownloadRepository, ForumRepository, GoalRepository, PlatformCounts, PostQuery, RepoResult,
    ResourceQuery, ResourceRepository, StatsRepository, UserRepository,
    VerificationTokenRepository,
};
use edu_core::{DomainError, ResourceKind, Snowflake};
use parking_lot::Mutex;

use crate::dto::{LoginRequest, RegisterRequest};
use crate::integrations::{AiClient, AiError, EmailMessage, FileStorage, MailError, Mailer, PromptMessage};

use super::auth::AuthService;
use super::context::{ServiceContext, ServiceSettings};

pub const PASSWORD: &str = "library42";

#[derive(Default)]
struct State {
    users: HashMap<Snowflake, (User, String)>,
    deleted: HashSet<Snowflake>,
    tokens: Vec<VerificationToken>,
    resources: HashMap<Snowflake, Resource>,
    downloads: Vec<Download>,
    bookmarks: Vec<Bookmark>,
    posts: HashMap<Snowflake, ForumPost>,
    replies: HashMap<Snowflake, ForumReply>,
    achievements: Vec<(Snowflake, AchievementKind, DateTime<Utc>)>,
    goals: HashMap<Snowflake, LearningGoal>,
    cms: HashMap<Snowflake, CmsContent>,
    chat: Vec<ChatMessage>,
}

impl State {
    fn live_user(&self, id: Snowflake) -> Option<&User> {
        self.users
            .get(&id)
            .filter(|_| !self.deleted.contains(&id))
            .map(|(u, _)| u)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn newest_first<T>(mut rows: Vec<T>, id: impl Fn(&T) -> Snowflake) -> Vec<T> {
    rows.sort_by_key(|r| std::cmp::Reverse(id(r)));
    rows
}

fn take<T>(rows: Vec<T>, limit: i64) -> Vec<T> {
    rows.into_iter().take(usize::try_from(limit).unwrap_or(0)).collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.state.lock().live_user(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        Ok(ids.iter().filter_map(|id| state.live_user(*id).cloned()).collect())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let state = self.state.lock();
        Ok(state
            .users
            .values()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email) && !state.deleted.contains(&u.id))
            .map(|(u, _)| u.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.users.values().any(|(u, _)| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DomainError::EmailAlreadyExists);
        }
        state
            .users
            .insert(user.id, (user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.lock();
        let (stored, _) = state
            .users
            .get_mut(&user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        stored.name.clone_from(&user.name);
        stored.usn.clone_from(&user.usn);
        stored.course.clone_from(&user.course);
        stored.semester = user.semester;
        stored.bio.clone_from(&user.bio);
        Ok(())
    }

    async fn set_role(&self, id: Snowflake, role: UserRole) -> RepoResult<()> {
        let mut state = self.state.lock();
        let (user, _) = state.users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        user.role = role;
        Ok(())
    }

    async fn mark_verified(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let (user, _) = state.users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        user.verified = true;
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.live_user(id).is_none() {
            return Err(DomainError::UserNotFound(id));
        }
        state.deleted.insert(id);
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self.state.lock().users.get(&id).map(|(_, h)| h.clone()))
    }

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        let (_, hash) = state.users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        *hash = password_hash.to_string();
        Ok(())
    }

    async fn list(&self, before: Option<Snowflake>, limit: i64) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        let users: Vec<User> = state
            .users
            .values()
            .filter(|(u, _)| !state.deleted.contains(&u.id))
            .filter(|(u, _)| before.map_or(true, |b| u.id < b))
            .map(|(u, _)| u.clone())
            .collect();
        Ok(take(newest_first(users, |u| u.id), limit))
    }
}

#[async_trait]
impl VerificationTokenRepository for MemoryStore {
    async fn create(&self, token: &VerificationToken) -> RepoResult<()> {
        let mut state = self.state.lock();
        state
            .tokens
            .retain(|t| !(t.user_id == token.user_id && t.purpose == token.purpose && !t.is_used()));
        state.tokens.push(token.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> RepoResult<Option<VerificationToken>> {
        Ok(self.state.lock().tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn consume(&self, token: &str) -> RepoResult<bool> {
        let mut state = self.state.lock();
        match state.tokens.iter_mut().find(|t| t.token == token && !t.is_used()) {
            Some(t) => {
                t.used_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn latest_for_user(
        &self,
        user_id: Snowflake,
        purpose: TokenPurpose,
    ) -> RepoResult<Option<VerificationToken>> {
        Ok(self
            .state
            .lock()
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id && t.purpose == purpose)
            .max_by_key(|t| t.created_at)
            .cloned())
    }
}

#[async_trait]
impl ResourceRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Resource>> {
        Ok(self.state.lock().resources.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Resource>> {
        let state = self.state.lock();
        Ok(ids.iter().filter_map(|id| state.resources.get(id).cloned()).collect())
    }

    async fn list(&self, query: &ResourceQuery) -> RepoResult<Vec<Resource>> {
        let state = self.state.lock();
        let rows: Vec<Resource> = state
            .resources
            .values()
            .filter(|r| r.kind == query.kind)
            .filter(|r| query.subject.as_ref().map_or(true, |s| r.subject.eq_ignore_ascii_case(s)))
            .filter(|r| query.semester.map_or(true, |s| r.semester == s))
            .filter(|r| query.year.map_or(true, |y| r.year == Some(y)))
            .filter(|r| {
                query
                    .search
                    .as_ref()
                    .map_or(true, |q| r.title.to_lowercase().contains(&q.to_lowercase()))
            })
            .filter(|r| query.before.map_or(true, |b| r.id < b))
            .cloned()
            .collect();
        Ok(take(newest_first(rows, |r| r.id), query.limit))
    }

    async fn create(&self, resource: &Resource) -> RepoResult<()> {
        self.state.lock().resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn update(&self, resource: &Resource) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .resources
            .get_mut(&resource.id)
            .ok_or(DomainError::ResourceNotFound(resource.id))?;
        *stored = resource.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        state
            .resources
            .remove(&id)
            .ok_or(DomainError::ResourceNotFound(id))?;
        state.bookmarks.retain(|b| b.resource_id != id);
        state.downloads.retain(|d| d.resource_id != id);
        Ok(())
    }

    async fn increment_downloads(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let resource = state
            .resources
            .get_mut(&id)
            .ok_or(DomainError::ResourceNotFound(id))?;
        resource.download_count += 1;
        Ok(())
    }
}

#[async_trait]
impl DownloadRepository for MemoryStore {
    async fn record(&self, download: &Download) -> RepoResult<()> {
        self.state.lock().downloads.push(download.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Download>> {
        let rows: Vec<Download> = self
            .state
            .lock()
            .downloads
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        Ok(take(newest_first(rows, |d| d.id), limit))
    }
}

#[async_trait]
impl BookmarkRepository for MemoryStore {
    async fn create(&self, bookmark: &Bookmark) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state
            .bookmarks
            .iter()
            .any(|b| b.user_id == bookmark.user_id && b.resource_id == bookmark.resource_id)
        {
            return Err(DomainError::BookmarkAlreadyExists);
        }
        state.bookmarks.push(bookmark.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Snowflake, resource_id: Snowflake) -> RepoResult<bool> {
        let mut state = self.state.lock();
        let before = state.bookmarks.len();
        state
            .bookmarks
            .retain(|b| !(b.user_id == user_id && b.resource_id == resource_id));
        Ok(state.bookmarks.len() < before)
    }

    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Bookmark>> {
        let mut rows: Vec<Bookmark> = self
            .state
            .lock()
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }
}

#[async_trait]
impl ForumRepository for MemoryStore {
    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<ForumPost>> {
        Ok(self.state.lock().posts.get(&id).cloned())
    }

    async fn list_posts(&self, query: &PostQuery) -> RepoResult<Vec<ForumPost>> {
        let state = self.state.lock();
        let rows: Vec<ForumPost> = state
            .posts
            .values()
            .filter(|p| query.category.as_ref().map_or(true, |c| &p.category == c))
            .filter(|p| query.tag.as_ref().map_or(true, |t| p.tags.contains(t)))
            .filter(|p| {
                query.search.as_ref().map_or(true, |q| {
                    let q = q.to_lowercase();
                    p.title.to_lowercase().contains(&q) || p.content.to_lowercase().contains(&q)
                })
            })
            .filter(|p| query.before.map_or(true, |b| p.id < b))
            .cloned()
            .collect();
        Ok(take(newest_first(rows, |p| p.id), query.limit))
    }

    async fn create_post(&self, post: &ForumPost) -> RepoResult<()> {
        self.state.lock().posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update_post(&self, post: &ForumPost) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .posts
            .get_mut(&post.id)
            .ok_or(DomainError::PostNotFound(post.id))?;
        stored.title.clone_from(&post.title);
        stored.content.clone_from(&post.content);
        stored.category.clone_from(&post.category);
        stored.tags.clone_from(&post.tags);
        Ok(())
    }

    async fn delete_post(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.posts.remove(&id).ok_or(DomainError::PostNotFound(id))?;
        state.replies.retain(|_, r| r.post_id != id);
        Ok(())
    }

    async fn increment_views(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let post = state.posts.get_mut(&id).ok_or(DomainError::PostNotFound(id))?;
        post.views += 1;
        Ok(())
    }

    async fn find_reply(&self, id: Snowflake) -> RepoResult<Option<ForumReply>> {
        Ok(self.state.lock().replies.get(&id).cloned())
    }

    async fn list_replies(&self, post_id: Snowflake) -> RepoResult<Vec<ForumReply>> {
        let mut rows: Vec<ForumReply> = self
            .state
            .lock()
            .replies
            .values()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn create_reply(&self, reply: &ForumReply) -> RepoResult<()> {
        let mut state = self.state.lock();
        let post = state
            .posts
            .get_mut(&reply.post_id)
            .ok_or(DomainError::PostNotFound(reply.post_id))?;
        post.reply_count += 1;
        post.last_activity = reply.created_at;
        state.replies.insert(reply.id, reply.clone());
        Ok(())
    }

    async fn delete_reply(&self, reply: &ForumReply) -> RepoResult<()> {
        let mut state = self.state.lock();
        state
            .replies
            .remove(&reply.id)
            .ok_or(DomainError::ReplyNotFound(reply.id))?;
        if let Some(post) = state.posts.get_mut(&reply.post_id) {
            post.reply_count = (post.reply_count - 1).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl AchievementRepository for MemoryStore {
    async fn list_by_user(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(AchievementKind, DateTime<Utc>)>> {
        Ok(self
            .state
            .lock()
            .achievements
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, kind, at)| (*kind, *at))
            .collect())
    }

    async fn award(&self, user_id: Snowflake, kind: AchievementKind) -> RepoResult<bool> {
        let mut state = self.state.lock();
        if state
            .achievements
            .iter()
            .any(|(u, k, _)| *u == user_id && *k == kind)
        {
            return Ok(false);
        }
        state.achievements.push((user_id, kind, Utc::now()));
        Ok(true)
    }

    async fn activity_stats(&self, user_id: Snowflake) -> RepoResult<ActivityStats> {
        let state = self.state.lock();
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(ActivityStats {
            uploads: count(state.resources.values().filter(|r| r.uploaded_by == user_id).count()),
            downloads: count(state.downloads.iter().filter(|d| d.user_id == user_id).count()),
            forum_posts: count(state.posts.values().filter(|p| p.author_id == user_id).count()),
            forum_replies: count(state.replies.values().filter(|r| r.author_id == user_id).count()),
            bookmarks: count(state.bookmarks.iter().filter(|b| b.user_id == user_id).count()),
            goals_completed: count(
                state
                    .goals
                    .values()
                    .filter(|g| g.user_id == user_id && g.completed)
                    .count(),
            ),
        })
    }

    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<(Snowflake, i64)>> {
        let state = self.state.lock();
        let mut counts: HashMap<Snowflake, i64> = HashMap::new();
        for (user_id, _, _) in &state.achievements {
            if state.live_user(*user_id).is_some() {
                *counts.entry(*user_id).or_default() += 1;
            }
        }
        let mut rows: Vec<(Snowflake, i64)> = counts.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(take(rows, limit))
    }
}

#[async_trait]
impl GoalRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LearningGoal>> {
        Ok(self.state.lock().goals.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<LearningGoal>> {
        let mut rows: Vec<LearningGoal> = self
            .state
            .lock()
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|g| (g.completed, g.target_date.is_none(), g.target_date, std::cmp::Reverse(g.id)));
        Ok(rows)
    }

    async fn create(&self, goal: &LearningGoal) -> RepoResult<()> {
        self.state.lock().goals.insert(goal.id, goal.clone());
        Ok(())
    }

    async fn update(&self, goal: &LearningGoal) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state.goals.get_mut(&goal.id).ok_or(DomainError::GoalNotFound(goal.id))?;
        *stored = goal.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.state
            .lock()
            .goals
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::GoalNotFound(id))
    }
}

#[async_trait]
impl CmsRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CmsContent>> {
        Ok(self.state.lock().cms.get(&id).cloned())
    }

    async fn list(&self, query: &CmsQuery) -> RepoResult<Vec<CmsContent>> {
        let mut rows: Vec<CmsContent> = self
            .state
            .lock()
            .cms
            .values()
            .filter(|c| query.include_unpublished || c.published)
            .filter(|c| query.content_type.map_or(true, |t| c.content_type == t))
            .filter(|c| query.featured.map_or(true, |f| c.featured == f))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (std::cmp::Reverse(c.featured), std::cmp::Reverse(c.id)));
        Ok(take(rows, query.limit))
    }

    async fn create(&self, content: &CmsContent) -> RepoResult<()> {
        self.state.lock().cms.insert(content.id, content.clone());
        Ok(())
    }

    async fn update(&self, content: &CmsContent) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .cms
            .get_mut(&content.id)
            .ok_or(DomainError::ContentNotFound(content.id))?;
        *stored = content.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.state
            .lock()
            .cms
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::ContentNotFound(id))
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        self.state.lock().chat.push(message.clone());
        Ok(())
    }

    async fn recent(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<ChatMessage>> {
        let rows: Vec<ChatMessage> = self
            .state
            .lock()
            .chat
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        let skip = rows.len().saturating_sub(usize::try_from(limit).unwrap_or(0));
        Ok(rows.into_iter().skip(skip).collect())
    }

    async fn clear(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut state = self.state.lock();
        let before = state.chat.len();
        state.chat.retain(|m| m.user_id != user_id);
        Ok((before - state.chat.len()) as u64)
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn counts(&self) -> RepoResult<PlatformCounts> {
        let state = self.state.lock();
        let live: Vec<&User> = state
            .users
            .values()
            .map(|(u, _)| u)
            .filter(|u| !state.deleted.contains(&u.id))
            .collect();
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        let kind = |k: ResourceKind| count(state.resources.values().filter(|r| r.kind == k).count());
        Ok(PlatformCounts {
            total_users: count(live.len()),
            total_admins: count(live.iter().filter(|u| u.is_admin()).count()),
            verified_users: count(live.iter().filter(|u| u.verified).count()),
            papers: kind(ResourceKind::Paper),
            notes: kind(ResourceKind::Note),
            syllabus: kind(ResourceKind::Syllabus),
            downloads: count(state.downloads.len()),
            forum_posts: count(state.posts.len()),
        })
    }
}

// ============================================================================
// Cache, mail and AI doubles
// ============================================================================

#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, RefreshSession>>,
}

impl MemorySessions {
    pub fn count_for(&self, user_id: Snowflake) -> usize {
        self.sessions.lock().values().filter(|s| s.user_id == user_id).count()
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn store(&self, token_id: &str, session: &RefreshSession) -> RedisResult<()> {
        self.sessions.lock().insert(token_id.to_string(), session.clone());
        Ok(())
    }

    async fn get(&self, token_id: &str) -> RedisResult<Option<RefreshSession>> {
        Ok(self.sessions.lock().get(token_id).cloned())
    }

    async fn revoke(&self, token_id: &str) -> RedisResult<bool> {
        Ok(self.sessions.lock().remove(token_id).is_some())
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RedisResult<u32> {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(u32::try_from(before - sessions.len()).unwrap_or(u32::MAX))
    }
}

#[derive(Default)]
pub struct MemoryViews {
    seen: Mutex<HashSet<(Snowflake, Snowflake)>>,
}

#[async_trait]
impl ViewTracker for MemoryViews {
    async fn first_view(&self, post_id: Snowflake, viewer_id: Snowflake) -> RedisResult<bool> {
        Ok(self.seen.lock().insert((post_id, viewer_id)))
    }
}

#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl CapturingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    /// The token embedded in the last link sent to `to`
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock();
        let message = sent.iter().rev().find(|m| m.to == to)?;
        let start = message.html.find("/verify/").map(|i| i + "/verify/".len()).or_else(|| {
            message
                .html
                .find("/reset-password/")
                .map(|i| i + "/reset-password/".len())
        })?;
        Some(
            message.html[start..]
                .chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect(),
        )
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// Answers with the number of prompt messages it received
#[derive(Default)]
pub struct EchoAi {
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

#[async_trait]
impl AiClient for EchoAi {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AiError> {
        self.prompts.lock().push(messages.to_vec());
        Ok(format!("received {} messages", messages.len()))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestHarness {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<MemorySessions>,
    pub mailer: Arc<CapturingMailer>,
    pub ai: Arc<EchoAi>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_settings(mut settings: ServiceSettings) -> Self {
        settings.admin.emails = vec!["dean@college.edu".to_string()];

        let store = Arc::new(MemoryStore::default());
        let sessions = Arc::new(MemorySessions::default());
        let mailer = Arc::new(CapturingMailer::default());
        let ai = Arc::new(EchoAi::default());
        let storage_root =
            std::env::temp_dir().join(format!("edu-service-{}", uuid::Uuid::new_v4().simple()));

        let ctx = ServiceContext::builder()
            .user_repo(store.clone())
            .token_repo(store.clone())
            .resource_repo(store.clone())
            .download_repo(store.clone())
            .bookmark_repo(store.clone())
            .forum_repo(store.clone())
            .achievement_repo(store.clone())
            .goal_repo(store.clone())
            .cms_repo(store.clone())
            .chat_repo(store.clone())
            .stats_repo(store.clone())
            .session_store(sessions.clone())
            .view_tracker(Arc::new(MemoryViews::default()))
            .mailer(mailer.clone())
            .ai_client(ai.clone())
            .storage(Arc::new(FileStorage::new(storage_root)))
            .jwt_service(Arc::new(JwtService::new(
                "service-test-secret-that-is-long-enough",
                900,
                3600,
            )))
            .settings(settings)
            .build()
            .expect("complete test context");

        Self {
            ctx,
            store,
            sessions,
            mailer,
            ai,
        }
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.ctx)
    }

    pub fn register_request(name: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            usn: None,
            course: Some("B.E. CSE".to_string()),
            semester: Some(5),
        }
    }

    /// Register without verifying
    pub async fn register(&self, name: &str, email: &str) -> Snowflake {
        let response = self
            .auth()
            .register(Self::register_request(name, email))
            .await
            .expect("registration");
        Snowflake::parse(&response.user_id).expect("snowflake id")
    }

    /// Register and follow the emailed verification link
    pub async fn verified_user(&self, name: &str, email: &str) -> Snowflake {
        let id = self.register(name, email).await;
        let token = self.mailer.last_token_for(email).expect("verification email");
        self.auth().verify_email(&token).await.expect("verification");
        id
    }

    pub async fn admin(&self) -> Snowflake {
        self.verified_user("Dean", "dean@college.edu").await
    }

    pub fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Move a token's clock so it looks issued `secs` ago
    pub fn age_tokens(&self, user_id: Snowflake, secs: i64) {
        let mut state = self.store.state.lock();
        for token in state.tokens.iter_mut().filter(|t| t.user_id == user_id) {
            token.created_at -= chrono::Duration::seconds(secs);
            token.expires_at -= chrono::Duration::seconds(secs);
        }
    }

    pub fn mark_unverified(&self, user_id: Snowflake) {
        if let Some((user, _)) = self.store.state.lock().users.get_mut(&user_id) {
            user.verified = false;
        }
    }

    pub fn set_role(&self, user_id: Snowflake, role: UserRole) {
        if let Some((user, _)) = self.store.state.lock().users.get_mut(&user_id) {
            user.role = role;
        }
    }
}
