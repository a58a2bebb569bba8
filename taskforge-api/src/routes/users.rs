/// User management endpoints (admin)
///
/// # Endpoints
///
/// - `GET /api/users/` - List users
/// - `POST /api/users/` - Create user with an explicit role (Admin)
/// - `PATCH /api/users/:id` - Change a user's role (Admin)
/// - `DELETE /api/users/:id` - Delete a user (Admin, not self)
///
/// Deleting a user is also the token revocation mechanism: their tokens
/// stop resolving on the next request.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Json},
    routes::{CreatedResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::{
        password,
        policy::{authorize, Action, Caller},
    },
    models::user::{CreateUser, Role, User},
};
use validator::Validate;

/// User list item
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Role,
}

/// Update role request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// List all users
///
/// Visible to every authenticated user; password hashes never leave the
/// database layer.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list(&state.db).await?;

    let response = users
        .into_iter()
        .map(|u| UserResponse {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
        })
        .collect();

    Ok(Json(response))
}

/// Create a user with an explicit role
///
/// Unlike self-registration, the role here is required, so an Admin can
/// provision Managers and other Admins directly.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email already registered
/// - `403 Forbidden`: Caller is not Admin
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    authorize(&caller, &Action::CreateUser)?;
    req.validate().map_err(ApiError::from_validation)?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            full_name: req.full_name,
            email: req.email,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = user.role.as_str(),
        created_by = caller.id,
        "User created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("User created successfully", user.id)),
    ))
}

/// Change a user's role
///
/// Takes effect on the target's next request; roles are read fresh from
/// the store, never trusted from tokens.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not Admin
/// - `404 Not Found`: No user with this ID
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<MessageResponse>> {
    authorize(&caller, &Action::UpdateUserRole)?;

    let updated = User::update_role(&state.db, id, req.role).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(
        user_id = id,
        role = req.role.as_str(),
        changed_by = caller.id,
        "User role updated"
    );

    Ok(Json(MessageResponse::new("User role updated")))
}

/// Delete a user
///
/// Admins cannot delete themselves; a deleted user's comments go with
/// them, their task assignments null out, and their tokens are revoked.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not Admin, or deleting their own account
/// - `404 Not Found`: No user with this ID
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    authorize(&caller, &Action::DeleteUser { target: id })?;

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, deleted_by = caller.id, "User deleted");

    Ok(Json(MessageResponse::new("User deleted")))
}
