//! Forum service
//!
//! Posts and replies. Authors (or admins) may edit and delete their own
//! content; views are counted once per authenticated viewer per hour.

use std::collections::HashMap;

use chrono::Utc;
use edu_core::entities::{normalize_tags, ForumPost, ForumReply};
use edu_core::traits::PostQuery;
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    AuthorSummary, CreatePostRequest, CreateReplyRequest, PaginatedResponse, PostDetailResponse,
    PostFilter, PostResponse, ReplyResponse, UpdatePostRequest,
};

use super::achievement::AchievementService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::support::{clean_optional, load_actor, next_cursor, page_limit};

pub struct ForumService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ForumService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        user_id: Snowflake,
        request: CreatePostRequest,
    ) -> ServiceResult<PostResponse> {
        request.validate()?;
        let author = load_actor(self.ctx, user_id).await?;

        let post = ForumPost::new(
            self.ctx.generate_id(),
            user_id,
            request.title.trim().to_string(),
            request.content,
            normalize_category(&request.category)?,
            request.tags,
        );
        self.ctx.forum_repo().create_post(&post).await?;

        info!(post_id = %post.id, user_id = %user_id, "Forum post created");
        AchievementService::new(self.ctx)
            .evaluate_after_action(user_id)
            .await;

        Ok(post_response(&post, Some(AuthorSummary::from(&author))))
    }

    #[instrument(skip(self, filter))]
    pub async fn list_posts(&self, filter: PostFilter) -> ServiceResult<PaginatedResponse<PostResponse>> {
        let limit = page_limit(filter.limit);
        let query = PostQuery {
            category: clean_optional(filter.category).map(|c| c.to_lowercase()),
            tag: clean_optional(filter.tag).map(|t| t.to_lowercase()),
            search: clean_optional(filter.q),
            before: filter.before,
            limit,
        };

        let posts = self.ctx.forum_repo().list_posts(&query).await?;
        let next = next_cursor(&posts, limit, |p| p.id);
        let authors = self
            .authors(posts.iter().map(|p| p.author_id).collect())
            .await?;

        Ok(PaginatedResponse::new(
            posts
                .iter()
                .map(|p| post_response(p, authors.get(&p.author_id).cloned()))
                .collect(),
            next,
            limit,
        ))
    }

    /// A post with its replies. Counts a view unless this viewer was seen recently.
    #[instrument(skip(self))]
    pub async fn get_post(
        &self,
        post_id: Snowflake,
        viewer_id: Option<Snowflake>,
    ) -> ServiceResult<PostDetailResponse> {
        let mut post = self.find_post(post_id).await?;

        if self.should_count_view(post_id, viewer_id).await {
            self.ctx.forum_repo().increment_views(post_id).await?;
            post.views += 1;
        }

        let replies = self.ctx.forum_repo().list_replies(post_id).await?;
        let mut author_ids: Vec<Snowflake> = replies.iter().map(|r| r.author_id).collect();
        author_ids.push(post.author_id);
        let authors = self.authors(author_ids).await?;

        Ok(PostDetailResponse {
            post: post_response(&post, authors.get(&post.author_id).cloned()),
            replies: replies
                .iter()
                .map(|r| reply_response(r, authors.get(&r.author_id).cloned()))
                .collect(),
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_post(
        &self,
        user_id: Snowflake,
        post_id: Snowflake,
        request: UpdatePostRequest,
    ) -> ServiceResult<PostResponse> {
        request.validate()?;

        let mut post = self.find_post(post_id).await?;
        self.ensure_author(user_id, post.author_id).await?;

        if let Some(title) = request.title {
            post.title = title.trim().to_string();
        }
        if let Some(content) = request.content {
            post.content = content;
        }
        if let Some(category) = request.category {
            post.category = normalize_category(&category)?;
        }
        if let Some(tags) = request.tags {
            post.tags = normalize_tags(tags);
        }
        post.updated_at = Utc::now();

        self.ctx.forum_repo().update_post(&post).await?;

        info!(post_id = %post_id, user_id = %user_id, "Forum post updated");
        let author = self.authors(vec![post.author_id]).await?;
        Ok(post_response(&post, author.get(&post.author_id).cloned()))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, user_id: Snowflake, post_id: Snowflake) -> ServiceResult<()> {
        let post = self.find_post(post_id).await?;
        self.ensure_author(user_id, post.author_id).await?;

        self.ctx.forum_repo().delete_post(post_id).await?;

        info!(post_id = %post_id, user_id = %user_id, "Forum post deleted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_reply(
        &self,
        user_id: Snowflake,
        post_id: Snowflake,
        request: CreateReplyRequest,
    ) -> ServiceResult<ReplyResponse> {
        request.validate()?;
        let author = load_actor(self.ctx, user_id).await?;
        self.find_post(post_id).await?;

        let reply = ForumReply::new(self.ctx.generate_id(), post_id, user_id, request.content);
        self.ctx.forum_repo().create_reply(&reply).await?;

        info!(post_id = %post_id, reply_id = %reply.id, "Forum reply created");
        AchievementService::new(self.ctx)
            .evaluate_after_action(user_id)
            .await;

        Ok(reply_response(&reply, Some(AuthorSummary::from(&author))))
    }

    #[instrument(skip(self))]
    pub async fn delete_reply(&self, user_id: Snowflake, reply_id: Snowflake) -> ServiceResult<()> {
        let reply = self
            .ctx
            .forum_repo()
            .find_reply(reply_id)
            .await?
            .ok_or(DomainError::ReplyNotFound(reply_id))?;
        self.ensure_author(user_id, reply.author_id).await?;

        self.ctx.forum_repo().delete_reply(&reply).await?;

        info!(reply_id = %reply_id, post_id = %reply.post_id, "Forum reply deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------

    async fn find_post(&self, post_id: Snowflake) -> ServiceResult<ForumPost> {
        self.ctx
            .forum_repo()
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::PostNotFound(post_id).into())
    }

    async fn ensure_author(&self, user_id: Snowflake, author_id: Snowflake) -> ServiceResult<()> {
        let actor = load_actor(self.ctx, user_id).await?;
        if actor.can_manage(author_id) {
            Ok(())
        } else {
            Err(DomainError::NotPostAuthor.into())
        }
    }

    /// Anonymous views always count; a tracker failure counts the view
    async fn should_count_view(&self, post_id: Snowflake, viewer_id: Option<Snowflake>) -> bool {
        let Some(viewer_id) = viewer_id else {
            return true;
        };
        match self.ctx.view_tracker().first_view(post_id, viewer_id).await {
            Ok(first) => first,
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "View tracker unavailable");
                true
            }
        }
    }

    async fn authors(&self, mut ids: Vec<Snowflake>) -> ServiceResult<HashMap<Snowflake, AuthorSummary>> {
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .ctx
            .user_repo()
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect())
    }
}

fn normalize_category(category: &str) -> ServiceResult<String> {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return Err(ServiceError::validation("Category cannot be blank"));
    }
    Ok(category)
}

fn post_response(post: &ForumPost, author: Option<AuthorSummary>) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        author,
        title: post.title.clone(),
        content: post.content.clone(),
        category: post.category.clone(),
        tags: post.tags.clone(),
        views: post.views,
        reply_count: post.reply_count,
        last_activity: post.last_activity,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn reply_response(reply: &ForumReply, author: Option<AuthorSummary>) -> ReplyResponse {
    ReplyResponse {
        id: reply.id.to_string(),
        post_id: reply.post_id.to_string(),
        author,
        content: reply.content.clone(),
        created_at: reply.created_at,
    }
}
