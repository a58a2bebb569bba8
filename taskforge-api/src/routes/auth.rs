/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a token
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Json},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, Role, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub full_name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional role; defaults to Developer
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token, valid for 24 hours
    pub access_token: String,

    /// The authenticated user
    pub user: UserSummary,
}

/// Authenticated user summary
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Register a new user
///
/// Anyone can register; the role defaults to Developer when the request
/// doesn't name one.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "full_name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "SecureP@ss123",
///   "role": "Manager"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "User created successfully"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    // Checked up front for a friendly message; the unique index still
    // backstops races and maps to the same error
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
            role: req.role.unwrap_or(Role::Developer),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Login endpoint
///
/// Authenticates a user and returns a JWT.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "user": {
///     "id": 1,
///     "name": "Jane Doe",
///     "email": "jane@example.com",
///     "role": "Manager"
///   }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    // Same error for unknown email and wrong password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let claims = jwt::Claims::new(user.id);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        user: UserSummary {
            id: user.id,
            name: user.full_name,
            email: user.email,
            role: user.role,
        },
    }))
}
