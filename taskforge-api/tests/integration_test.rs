/// Integration tests for the TaskForge API
///
/// These tests verify the full system works end-to-end against a real
/// PostgreSQL database:
/// - Registration, login, and token handling
/// - Role gates on projects, tasks, comments, and user management
/// - Task visibility scoping and status updates
/// - Metrics aggregation and cascade deletes
/// - The AI assist endpoint through the mock completion backend
///
/// Each test builds its own router and mock backend; the database is
/// shared, so assertions stick to rows the test created itself.
mod common;

use axum::http::StatusCode;
use common::{request, TestContext};
use serde_json::json;
use taskforge_shared::models::user::Role;

/// Register via the API, then exercise both login outcomes
#[tokio::test]
async fn test_register_and_login_flow() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let email = common::unique_email();
    let register_body = json!({
        "full_name": "Reg User",
        "email": email,
        "password": "password123",
        "role": "Manager"
    });

    let (status, body) = request(&ctx, "POST", "/api/auth/register", None, Some(register_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");

    // Same email again is rejected
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "full_name": "Reg User Again",
            "email": email,
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");

    // Correct credentials
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Reg User");
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "Manager");

    // The token actually works
    let token = body["access_token"].as_str().unwrap().to_string();
    let (status, _) = request(&ctx, "GET", "/api/projects/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Wrong password and unknown email give the same answer
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": common::unique_email(), "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

/// Malformed registration bodies collapse to a 400 in the message envelope
#[tokio::test]
async fn test_register_validation() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "full_name": "Bad Email",
            "email": "not-an-email",
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "full_name": "Short Password",
            "email": common::unique_email(),
            "password": "short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("password"));

    // A missing required field never reaches the handler; the body
    // extractor still answers in the same envelope
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": common::unique_email(),
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("full_name"));
}

/// Unknown enum wire values are a 400 in the message envelope, not a
/// bare 422 from the body parser
#[tokio::test]
async fn test_malformed_body_rejections() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (dev, _) = ctx.create_user(Role::Developer).await;

    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/users/{}", dev.id),
        Some(&admin_token),
        Some(json!({ "role": "Wizard" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Wizard"));

    // Body parsing fails before the task lookup, so even a ghost ID
    // answers 400 rather than 404
    let (status, body) = request(
        &ctx,
        "PATCH",
        "/api/tasks/999999999/status",
        Some(&admin_token),
        Some(json!({ "status": "Bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Bogus"));
}

/// Banner and health endpoints answer without authentication
#[tokio::test]
async fn test_index_and_health() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (status, body) = request(&ctx, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project Management API running");
    assert_eq!(body["status"], "OK");

    let (status, body) = request(&ctx, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

/// Missing, malformed, expired, and revoked tokens each get their own answer
#[tokio::test]
async fn test_token_failures() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (user, _) = ctx.create_user(Role::Developer).await;

    // No Authorization header
    let (status, body) = request(&ctx, "GET", "/api/tasks/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization token. Please login.");

    // Garbage token
    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid token. Please login again.");

    // Expired token
    let expired = ctx.expired_token_for(user.id);
    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired. Please login again.");

    // Well-formed token whose subject never existed
    let ghost = ctx.token_for(999_999_999);
    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");
}

/// Project creation and deletion follow the role table
#[tokio::test]
async fn test_project_role_gates() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (_manager, manager_token) = ctx.create_user(Role::Manager).await;
    let (_dev, dev_token) = ctx.create_user(Role::Developer).await;

    let project_body = json!({ "title": "Gate Check", "description": "role gating" });

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&dev_token),
        Some(project_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Unauthorized. Only Admin and Manager can create projects."
    );

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&manager_token),
        Some(project_body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Project created");
    let project_id = body["id"].as_i64().unwrap();

    // Only Admin deletes; Manager is refused too
    for token in [&dev_token, &manager_token] {
        let (status, body) = request(
            &ctx,
            "DELETE",
            &format!("/api/projects/{}", project_id),
            Some(token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Unauthorized. Only Admin can delete projects.");
    }

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/projects/{}", project_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted");

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/projects/{}", project_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");
}

/// Project listings carry the creator's name and a live task count
#[tokio::test]
async fn test_project_listing_shape() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (manager, manager_token) = ctx.create_user(Role::Manager).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&manager_token),
        Some(json!({ "title": "Listing Shape" })),
    )
    .await;
    let project_id = body["id"].as_i64().unwrap();

    for title in ["first task", "second task"] {
        let (status, _) = request(
            &ctx,
            "POST",
            "/api/tasks/",
            Some(&manager_token),
            Some(json!({ "title": title, "project_id": project_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(&ctx, "GET", "/api/projects/", Some(&manager_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let listing = body
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_i64() == Some(project_id))
        .expect("created project should be listed");

    assert_eq!(listing["title"], "Listing Shape");
    assert_eq!(listing["created_by"], manager.full_name.as_str());
    assert_eq!(listing["task_count"], 2);
}

/// Developers see only their own tasks; Admin and Manager see everything
#[tokio::test]
async fn test_task_visibility_scoping() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (dev, dev_token) = ctx.create_user(Role::Developer).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "assigned to dev", "assigned_to": dev.id })),
    )
    .await;
    let assigned_id = body["id"].as_i64().unwrap();

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "unassigned task" })),
    )
    .await;
    let unassigned_id = body["id"].as_i64().unwrap();

    // Developer list: exactly their assignments
    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let dev_tasks = body.as_array().unwrap();
    assert!(dev_tasks
        .iter()
        .all(|t| t["assigned_to"].as_i64() == Some(dev.id)));
    assert!(dev_tasks
        .iter()
        .any(|t| t["id"].as_i64() == Some(assigned_id)));
    assert!(!dev_tasks
        .iter()
        .any(|t| t["id"].as_i64() == Some(unassigned_id)));

    let assigned = dev_tasks
        .iter()
        .find(|t| t["id"].as_i64() == Some(assigned_id))
        .unwrap();
    assert_eq!(assigned["assigned_to_name"], dev.full_name.as_str());
    assert_eq!(assigned["status"], "ToDo");
    assert_eq!(assigned["is_overdue"], false);

    // Admin list: both tasks, unassigned one labelled
    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let all_tasks = body.as_array().unwrap();
    assert!(all_tasks
        .iter()
        .any(|t| t["id"].as_i64() == Some(assigned_id)));
    let unassigned = all_tasks
        .iter()
        .find(|t| t["id"].as_i64() == Some(unassigned_id))
        .expect("admin should see the unassigned task");
    assert_eq!(unassigned["assigned_to_name"], "Unassigned");
}

/// Task creation resolves its references or answers 404
#[tokio::test]
async fn test_task_referential_checks() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_manager, manager_token) = ctx.create_user(Role::Manager).await;
    let (_dev, dev_token) = ctx.create_user(Role::Developer).await;

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&dev_token),
        Some(json!({ "title": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Unauthorized. Only Admin and Manager can create tasks."
    );

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&manager_token),
        Some(json!({ "title": "ghost project", "project_id": 999_999_999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&manager_token),
        Some(json!({ "title": "ghost assignee", "assigned_to": 999_999_999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Assigned user not found");
}

/// Status updates: assignees and elevated roles only
#[tokio::test]
async fn test_task_status_scope() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (dev1, dev1_token) = ctx.create_user(Role::Developer).await;
    let (_dev2, dev2_token) = ctx.create_user(Role::Developer).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "dev1's work", "assigned_to": dev1.id })),
    )
    .await;
    let task_id = body["id"].as_i64().unwrap();

    let status_body = json!({ "status": "InProgress" });

    // Another developer is refused
    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", task_id),
        Some(&dev2_token),
        Some(status_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update your own tasks");

    // The assignee may move it
    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", task_id),
        Some(&dev1_token),
        Some(status_body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Status updated");

    // Admin may move anything, including backwards
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", task_id),
        Some(&admin_token),
        Some(json!({ "status": "ToDo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // An unassigned task is off-limits to every developer
    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "nobody's work" })),
    )
    .await;
    let unassigned_id = body["id"].as_i64().unwrap();

    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", unassigned_id),
        Some(&dev1_token),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown task is a 404 even for Admin
    let (status, body) = request(
        &ctx,
        "PATCH",
        "/api/tasks/999999999/status",
        Some(&admin_token),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

/// Deadlines round-trip as YYYY-MM-DD and drive the overdue flag
#[tokio::test]
async fn test_task_deadline_and_overdue() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "long overdue", "deadline": "2020-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let overdue_id = body["id"].as_i64().unwrap();

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "far future", "deadline": "2099-01-01" })),
    )
    .await;
    let future_id = body["id"].as_i64().unwrap();

    let find = |body: &serde_json::Value, id: i64| -> serde_json::Value {
        body.as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"].as_i64() == Some(id))
            .cloned()
            .expect("task should be listed")
    };

    let (_, body) = request(&ctx, "GET", "/api/tasks/", Some(&admin_token), None).await;
    let overdue = find(&body, overdue_id);
    assert_eq!(overdue["deadline"], "2020-01-01");
    assert_eq!(overdue["is_overdue"], true);
    assert_eq!(find(&body, future_id)["is_overdue"], false);

    // Done tasks are never overdue
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", overdue_id),
        Some(&admin_token),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&ctx, "GET", "/api/tasks/", Some(&admin_token), None).await;
    assert_eq!(find(&body, overdue_id)["is_overdue"], false);
}

/// Metrics aggregate the live task set and stay stable across reads
#[tokio::test]
async fn test_project_metrics() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&admin_token),
        Some(json!({ "title": "Metrics Project" })),
    )
    .await;
    let project_id = body["id"].as_i64().unwrap();

    let create = |title: &str, deadline: Option<&str>| {
        let mut task = json!({ "title": title, "project_id": project_id });
        if let Some(deadline) = deadline {
            task["deadline"] = json!(deadline);
        }
        task
    };

    let mut task_ids = Vec::new();
    for spec in [
        create("done one", None),
        create("done two", None),
        create("stuck", Some("2020-01-01")),
        create("untouched", None),
    ] {
        let (status, body) =
            request(&ctx, "POST", "/api/tasks/", Some(&admin_token), Some(spec)).await;
        assert_eq!(status, StatusCode::CREATED);
        task_ids.push(body["id"].as_i64().unwrap());
    }

    for (task_id, status_name) in [
        (task_ids[0], "Done"),
        (task_ids[1], "Done"),
        (task_ids[2], "InProgress"),
    ] {
        let (status, _) = request(
            &ctx,
            "PATCH",
            &format!("/api/tasks/{}/status", task_id),
            Some(&admin_token),
            Some(json!({ "status": status_name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let metrics_uri = format!("/api/projects/{}/metrics", project_id);
    let (status, body) = request(&ctx, "GET", &metrics_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total": 4,
            "done": 2,
            "in_progress": 1,
            "todo": 1,
            "overdue": 1,
            "progress": 50
        })
    );

    // Reading is pure aggregation; a second read agrees
    let (_, again) = request(&ctx, "GET", &metrics_uri, Some(&admin_token), None).await;
    assert_eq!(body, again);

    let (status, body) = request(
        &ctx,
        "GET",
        "/api/projects/999999999/metrics",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");
}

/// Deleting a project takes its tasks and their comments with it
#[tokio::test]
async fn test_project_delete_cascades() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&admin_token),
        Some(json!({ "title": "Doomed Project" })),
    )
    .await;
    let project_id = body["id"].as_i64().unwrap();

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "doomed task", "project_id": project_id })),
    )
    .await;
    let task_id = body["id"].as_i64().unwrap();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/comments/task/{}", task_id),
        Some(&admin_token),
        Some(json!({ "content": "doomed comment" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &ctx,
        "DELETE",
        &format!("/api/projects/{}", project_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The task is gone
    let (status, _) = request(
        &ctx,
        "PATCH",
        &format!("/api/tasks/{}/status", task_id),
        Some(&admin_token),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Its comments read as an empty list, not an error
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/comments/task/{}", task_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

/// Comment lifecycle: newest-first listing, author/Admin deletion
#[tokio::test]
async fn test_comment_lifecycle() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (dev1, dev1_token) = ctx.create_user(Role::Developer).await;
    let (_dev2, dev2_token) = ctx.create_user(Role::Developer).await;

    let (_, body) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&admin_token),
        Some(json!({ "title": "discussed task" })),
    )
    .await;
    let task_id = body["id"].as_i64().unwrap();
    let comments_uri = format!("/api/comments/task/{}", task_id);

    let (status, body) = request(
        &ctx,
        "POST",
        &comments_uri,
        Some(&dev1_token),
        Some(json!({ "content": "first" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Comment added");
    let first_id = body["id"].as_i64().unwrap();

    let (_, body) = request(
        &ctx,
        "POST",
        &comments_uri,
        Some(&dev1_token),
        Some(json!({ "content": "second" })),
    )
    .await;
    let second_id = body["id"].as_i64().unwrap();

    // Newest first, with author name and role
    let (status, body) = request(&ctx, "GET", &comments_uri, Some(&dev2_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let comments = body.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "second");
    assert_eq!(comments[1]["content"], "first");
    assert_eq!(comments[0]["user_name"], dev1.full_name.as_str());
    assert_eq!(comments[0]["user_role"], "Developer");
    let created_at = comments[0]["created_at"].as_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S").is_ok());

    // Only the author or an Admin may delete
    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/comments/{}", first_id),
        Some(&dev2_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/comments/{}", first_id),
        Some(&dev1_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment deleted");

    let (status, _) = request(
        &ctx,
        "DELETE",
        &format!("/api/comments/{}", second_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&ctx, "GET", &comments_uri, Some(&dev1_token), None).await;
    assert_eq!(body, json!([]));

    // Edge cases: empty content, unknown task, unknown comment
    let (status, _) = request(
        &ctx,
        "POST",
        &comments_uri,
        Some(&dev1_token),
        Some(json!({ "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/comments/task/999999999",
        Some(&dev1_token),
        Some(json!({ "content": "into the void" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (status, body) = request(
        &ctx,
        "DELETE",
        "/api/comments/999999999",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found");
}

/// User management: Admin-only writes, role changes visible in listings
#[tokio::test]
async fn test_user_management() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (_dev, dev_token) = ctx.create_user(Role::Developer).await;

    let email = common::unique_email();
    let create_body = json!({
        "full_name": "Managed User",
        "email": email,
        "password": "password123",
        "role": "Developer"
    });

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/users/",
        Some(&dev_token),
        Some(create_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/users/",
        Some(&admin_token),
        Some(create_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    let user_id = body["id"].as_i64().unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/users/",
        Some(&admin_token),
        Some(create_body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");

    // Role change, Admin only
    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/users/{}", user_id),
        Some(&dev_token),
        Some(json!({ "role": "Manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/users/{}", user_id),
        Some(&admin_token),
        Some(json!({ "role": "Manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User role updated");

    let (status, body) = request(
        &ctx,
        "PATCH",
        "/api/users/999999999",
        Some(&admin_token),
        Some(json!({ "role": "Manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    // The listing reflects the change and never leaks hashes
    let (status, body) = request(&ctx, "GET", "/api/users/", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"].as_i64() == Some(user_id))
        .cloned()
        .expect("created user should be listed");
    assert_eq!(listed["full_name"], "Managed User");
    assert_eq!(listed["role"], "Manager");
    assert!(listed.get("password_hash").is_none());

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/users/{}", user_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/users/{}", user_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

/// Admins cannot delete their own account
#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (admin, admin_token) = ctx.create_user(Role::Admin).await;

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/users/{}", admin.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You cannot delete your own account.");
}

/// Deleting a user revokes their outstanding tokens
#[tokio::test]
async fn test_deleted_user_token_revoked() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_admin, admin_token) = ctx.create_user(Role::Admin).await;
    let (dev, dev_token) = ctx.create_user(Role::Developer).await;

    let (status, _) = request(&ctx, "GET", "/api/tasks/", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &ctx,
        "DELETE",
        &format!("/api/users/{}", dev.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&ctx, "GET", "/api/tasks/", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");
}

/// The assist endpoint validates input and threads context to the backend
#[tokio::test]
async fn test_ai_assist() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let (_dev, dev_token) = ctx.create_user(Role::Developer).await;
    let (_manager, manager_token) = ctx.create_user(Role::Manager).await;

    // Neither prompt nor project
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/ai/assist",
        Some(&dev_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Provide 'prompt' or 'project_id'");

    // Prompt only: empty context, default mode
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/ai/assist",
        Some(&dev_token),
        Some(json!({ "prompt": "What should we do next?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Mock assistant reply");

    let seen = ctx.ai.requests();
    let last = seen.last().unwrap();
    assert_eq!(last.prompt, "What should we do next?");
    assert_eq!(last.context, "");
    assert_eq!(last.mode, "general");

    // Project only: context is built, default prompt summarizes it
    let (_, body) = request(
        &ctx,
        "POST",
        "/api/projects/",
        Some(&manager_token),
        Some(json!({ "title": "Assist Context", "description": "context check" })),
    )
    .await;
    let project_id = body["id"].as_i64().unwrap();

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/tasks/",
        Some(&manager_token),
        Some(json!({ "title": "Ship reports", "project_id": project_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/ai/assist",
        Some(&dev_token),
        Some(json!({ "project_id": project_id, "mode": "risks" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let seen = ctx.ai.requests();
    let last = seen.last().unwrap();
    assert_eq!(last.mode, "risks");
    assert!(last.context.contains("Project: Assist Context"));
    assert!(last.context.contains("Description: context check"));
    assert!(last.context.contains("- Ship reports | To Do | Deadline: N/A"));
    assert!(last.prompt.starts_with("Summarize the following project"));

    // A project that doesn't resolve still answers the prompt
    let (status, _) = request(
        &ctx,
        "POST",
        "/api/ai/assist",
        Some(&dev_token),
        Some(json!({ "prompt": "hello", "project_id": 999_999_999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seen = ctx.ai.requests();
    assert_eq!(seen.last().unwrap().context, "");
}
