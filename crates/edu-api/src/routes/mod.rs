//! Route definitions
//!
//! All API routes organized by domain and mounted under /api.

use axum::{
    routing::{delete, get, patch, post},
    Extension, Router,
};
use edu_core::entities::ResourceKind;

use crate::handlers::{
    achievements, admin, auth, bookmarks, chat, cms, forum, goals, health, resources, stats, users,
};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    let mut router = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(forum_routes())
        .merge(library_routes())
        .merge(cms_routes())
        .merge(admin_routes())
        .merge(chat_routes())
        .route("/stats", get(stats::platform_stats));

    for kind in ResourceKind::ALL {
        router = router.nest(
            &format!("/{}", kind.collection()),
            resource_routes().layer(Extension(kind)),
        );
    }
    router
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-email/:token", get(auth::verify_email))
        .route("/auth/resend-verification", post(auth::resend_verification))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/change-password", post(auth::change_password))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(users::get_profile).patch(users::update_profile))
        .route("/users/:user_id", get(users::get_user))
}

/// Mounted once per resource kind
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(resources::list))
        .route("/upload", post(resources::upload))
        .route(
            "/:id",
            get(resources::get)
                .patch(resources::update)
                .delete(resources::delete),
        )
        .route("/:id/download", get(resources::download))
}

fn forum_routes() -> Router<AppState> {
    Router::new()
        .route("/forum/posts", post(forum::create_post).get(forum::list_posts))
        .route(
            "/forum/posts/:id",
            get(forum::get_post)
                .patch(forum::update_post)
                .delete(forum::delete_post),
        )
        .route("/forum/posts/:id/replies", post(forum::create_reply))
        .route("/forum/replies/:id", delete(forum::delete_reply))
}

/// Bookmarks, downloads, achievements and goals
fn library_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookmarks",
            post(bookmarks::create_bookmark).get(bookmarks::list_bookmarks),
        )
        .route("/bookmarks/:resource_id", delete(bookmarks::delete_bookmark))
        .route("/downloads", get(bookmarks::list_downloads))
        .route("/achievements", get(achievements::list_achievements))
        .route("/achievements/leaderboard", get(achievements::leaderboard))
        .route("/goals", post(goals::create_goal).get(goals::list_goals))
        .route(
            "/goals/:id",
            patch(goals::update_goal).delete(goals::delete_goal),
        )
}

fn cms_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cms/content",
            get(cms::list_content).post(cms::create_content),
        )
        .route(
            "/cms/content/:id",
            get(cms::get_content)
                .put(cms::update_content)
                .delete(cms::delete_content),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:user_id", delete(admin::delete_user))
        .route("/admin/users/:user_id/role", patch(admin::set_role))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/backup", post(admin::start_backup))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::send_message))
        .route(
            "/chat/history",
            get(chat::history).delete(chat::clear_history),
        )
}
