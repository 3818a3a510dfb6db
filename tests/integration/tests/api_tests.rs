//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_security_headers() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/stats").await.unwrap();

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_requires_verification() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/api/auth/register", &request).await.unwrap();
    let registered: RegisterResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(!registered.user_id.is_empty());

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "EMAIL_NOT_VERIFIED");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    server.post("/api/auth/register", &request).await.unwrap();

    let response = server.post("/api/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_verify_and_login() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    let auth = server.signup(&request).await.unwrap();

    assert_eq!(auth.user.email, request.email);
    assert_eq!(auth.user.role, "student");
    assert!(auth.user.verified);
    assert!(!auth.access_token.is_empty());
}

#[tokio::test]
async fn test_verification_token_single_use() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    let response = server.post("/api/auth/register", &request).await.unwrap();
    let registered: RegisterResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let token = server
        .pending_token(&registered.user_id, "email_verification")
        .await
        .unwrap();
    let path = format!("/api/auth/verify-email/{token}");

    let response = server.get(&path).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&path).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let login_req = LoginRequest {
        email: "nobody@college.test".to_string(),
        password: "wrongpass1".to_string(),
    };

    let response = server.post("/api/auth/login", &login_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let request = RefreshTokenRequest {
        refresh_token: auth.refresh_token.clone(),
    };
    let response = server.post("/api/auth/refresh", &request).await.unwrap();
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.refresh_token, auth.refresh_token);

    // The old refresh token was consumed
    let response = server.post("/api/auth/refresh", &request).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let body = RefreshTokenRequest {
        refresh_token: auth.refresh_token.clone(),
    };
    let response = server
        .post_auth("/api/auth/logout", &auth.access_token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.post("/api/auth/refresh", &body).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_password_reset_flow() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut request = RegisterRequest::unique();
    let auth = server.signup(&request).await.unwrap();

    let response = server
        .post(
            "/api/auth/forgot-password",
            &EmailRequest {
                email: request.email.clone(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let token = server
        .pending_token(&auth.user.id, "password_reset")
        .await
        .unwrap();
    let response = server
        .post(
            "/api/auth/reset-password",
            &ResetPasswordRequest {
                token,
                new_password: "Archive77!".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    request.password = "Archive77!".to_string();
    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post(
            "/api/auth/forgot-password",
            &EmailRequest {
                email: format!("ghost{}@college.test", unique_suffix()),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
async fn test_get_profile() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let response = server
        .get_auth("/api/profile", &auth.access_token)
        .await
        .unwrap();
    let profile: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(profile.id, auth.user.id);
    assert_eq!(profile.name, auth.user.name);
}

#[tokio::test]
async fn test_get_profile_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/profile").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTH");
}

// ============================================================================
// Resource Tests
// ============================================================================

#[tokio::test]
async fn test_upload_list_download() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();
    let subject = format!("Compilers {}", unique_suffix());

    let response = server
        .upload_auth(
            "/api/notes/upload",
            &auth.access_token,
            upload_form("Parsing notes", &subject, 5),
        )
        .await
        .unwrap();
    let resource: ResourceResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(resource.kind, "note");
    assert_eq!(resource.file_name, "notes.pdf");

    let response = server
        .get(&format!("/api/notes?subject={subject}"))
        .await
        .unwrap();
    let page: Page<ResourceResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, resource.id);

    let response = server
        .get_auth(
            &format!("/api/notes/{}/download", resource.id),
            &auth.access_token,
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("notes.pdf"));
    let bytes = response.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let response = server
        .get(&format!("/api/notes/{}", resource.id))
        .await
        .unwrap();
    let fetched: ResourceResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.download_count, 1);
}

#[tokio::test]
async fn test_resource_wrong_kind_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let response = server
        .upload_auth(
            "/api/papers/upload",
            &auth.access_token,
            upload_form("DBMS 2023", "DBMS", 3),
        )
        .await
        .unwrap();
    let resource: ResourceResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get(&format!("/api/syllabus/{}", resource.id))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_resource_delete_by_other_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = server.student().await.unwrap();
    let other = server.student().await.unwrap();

    let response = server
        .upload_auth(
            "/api/papers/upload",
            &owner.access_token,
            upload_form("Networks 2022", "Networks", 6),
        )
        .await
        .unwrap();
    let resource: ResourceResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let path = format!("/api/papers/{}", resource.id);

    let response = server.delete_auth(&path, &other.access_token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.delete_auth(&path, &owner.access_token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get(&path).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_upload_requires_auth() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .client
        .post(format!("{}/api/notes/upload", server.base_url()))
        .multipart(upload_form("Anonymous", "OS", 2))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Forum Tests
// ============================================================================

#[tokio::test]
async fn test_forum_post_and_reply() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = server.student().await.unwrap();
    let reader = server.student().await.unwrap();

    let response = server
        .post_auth("/api/forum/posts", &author.access_token, &CreatePostRequest::unique())
        .await
        .unwrap();
    let post: PostResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(post.reply_count, 0);

    let response = server
        .post_auth(
            &format!("/api/forum/posts/{}/replies", post.id),
            &reader.access_token,
            &CreateReplyRequest {
                content: "Focus on chapter 3.".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/forum/posts/{}", post.id);
    let response = server.get_auth(&path, &reader.access_token).await.unwrap();
    let detail: PostDetailResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.post.reply_count, 1);
    assert_eq!(detail.replies.len(), 1);
    let views = detail.post.views;

    // A second view by the same reader within the window is not counted
    let response = server.get_auth(&path, &reader.access_token).await.unwrap();
    let detail: PostDetailResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.post.views, views);

    let response = server.delete_auth(&path, &reader.access_token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Library Tests
// ============================================================================

#[tokio::test]
async fn test_bookmarks() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let response = server
        .upload_auth(
            "/api/syllabus/upload",
            &auth.access_token,
            upload_form("CS syllabus", "Curriculum", 1),
        )
        .await
        .unwrap();
    let resource: ResourceResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let body = CreateBookmarkRequest {
        resource_id: resource.id.clone(),
    };

    let response = server
        .post_auth("/api/bookmarks", &auth.access_token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth("/api/bookmarks", &auth.access_token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server
        .get_auth("/api/bookmarks", &auth.access_token)
        .await
        .unwrap();
    let bookmarks: Vec<serde_json::Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(bookmarks.len(), 1);

    let response = server
        .delete_auth(&format!("/api/bookmarks/{}", resource.id), &auth.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_goal_completion() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.student().await.unwrap();

    let response = server
        .post_auth(
            "/api/goals",
            &auth.access_token,
            &CreateGoalRequest {
                title: "Finish DBMS revision".to_string(),
                target_date: Some("2030-01-15".to_string()),
            },
        )
        .await
        .unwrap();
    let goal: GoalResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(!goal.completed);

    let response = server
        .patch_auth(
            &format!("/api/goals/{}", goal.id),
            &auth.access_token,
            &CompleteGoalRequest { completed: true },
        )
        .await
        .unwrap();
    let goal: GoalResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(goal.completed);
    assert!(goal.completed_at.is_some());

    let response = server
        .get_auth("/api/achievements", &auth.access_token)
        .await
        .unwrap();
    let achievements: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(achievements["earned_count"].as_u64().unwrap() >= 1);
}

// ============================================================================
// CMS and Admin Tests
// ============================================================================

#[tokio::test]
async fn test_cms_admin_only() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = server.admin().await.unwrap();
    let student = server.student().await.unwrap();
    let body = ContentRequest {
        title: "Exam timetable".to_string(),
        content: "Finals start on the 3rd.".to_string(),
        content_type: "announcement".to_string(),
        featured: true,
        published: true,
    };

    let response = server
        .post_auth("/api/cms/content", &student.access_token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth("/api/cms/content", &admin.access_token, &body)
        .await
        .unwrap();
    let content: ContentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(content.published);

    let response = server
        .get(&format!("/api/cms/content/{}", content.id))
        .await
        .unwrap();
    let fetched: ContentResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.title, "Exam timetable");
}

#[tokio::test]
async fn test_admin_role_management() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = server.admin().await.unwrap();
    let student = server.student().await.unwrap();
    assert_eq!(admin.user.role, "admin");

    let response = server
        .get_auth("/api/admin/dashboard", &student.access_token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "ADMIN_REQUIRED");

    let response = server
        .patch_auth(
            &format!("/api/admin/users/{}/role", student.user.id),
            &admin.access_token,
            &UpdateRoleRequest {
                role: "admin".to_string(),
            },
        )
        .await
        .unwrap();
    let promoted: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(promoted.role, "admin");

    let response = server
        .delete_auth(
            &format!("/api/admin/users/{}", student.user.id),
            &admin.access_token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get(&format!("/api/users/{}", student.user.id))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_platform_stats() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    server.student().await.unwrap();

    let response = server.get("/api/stats").await.unwrap();
    let stats: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(stats["total_users"].as_i64().unwrap() >= 1);
}
