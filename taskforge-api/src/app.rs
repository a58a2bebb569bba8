/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskforge_api::{ai::GroqClient, app::AppState, config::Config};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let ai = GroqClient::new(config.ai.groq_api_key.clone(), config.ai.model.clone())?;
/// let state = AppState::new(pool, config, Arc::new(ai));
/// let app = taskforge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{
    ai::CompletionClient, config::Config, error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskforge_shared::auth::{jwt, policy::Caller};
use taskforge_shared::models::user::User;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Completion backend for the assist endpoint
    pub ai: Arc<dyn CompletionClient>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, ai: Arc<dyn CompletionClient>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            ai,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── GET  /                          # API banner (public)
/// ├── GET  /health                    # Health check (public)
/// └── /api/
///     ├── /auth/                      # Authentication (public)
///     │   ├── POST /register
///     │   └── POST /login
///     ├── /projects/                  # Projects (authenticated)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── DELETE /:id
///     │   └── GET    /:id/metrics
///     ├── /tasks/                     # Tasks (authenticated)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PATCH  /:id/status
///     │   └── DELETE /:id
///     ├── /comments/                  # Comments (authenticated)
///     │   ├── GET    /task/:task_id
///     │   ├── POST   /task/:task_id
///     │   └── DELETE /:id
///     ├── /users/                     # User management (authenticated)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PATCH  /:id
///     │   └── DELETE /:id
///     └── /ai/                        # AI assistant (authenticated)
///         └── POST /assist
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Response compression
/// 4. Security headers
/// 5. Authentication (per-nest, protected routes only)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Banner and health check (public, no auth)
    let health_routes = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Project routes (require JWT authentication)
    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/metrics", get(routes::projects::project_metrics));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/:id/status", patch(routes::tasks::update_task_status))
        .route("/:id", delete(routes::tasks::delete_task));

    // Comment routes (require JWT authentication)
    let comment_routes = Router::new()
        .route(
            "/task/:task_id",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route("/:id", delete(routes::comments::delete_comment));

    // User management routes (require JWT authentication)
    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/:id",
            patch(routes::users::update_user_role).delete(routes::users::delete_user),
        );

    // AI assistant routes (require JWT authentication)
    let ai_routes = Router::new().route("/assist", post(routes::ai::assist));

    // Everything under /api except /api/auth requires a valid token
    //
    // The nest prefixes for routers with a "/" route carry a trailing
    // slash so the root endpoints register as "/api/projects/" etc.,
    // matching the documented paths; axum would otherwise strip the
    // slash when collapsing the nested "/" route into the prefix.
    let protected_routes = Router::new()
        .nest("/projects/", project_routes)
        .nest("/tasks/", task_routes)
        .nest("/comments", comment_routes)
        .nest("/users/", user_routes)
        .nest("/ai", ai_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.allow_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware
///
/// Extracts and validates the bearer token, resolves the subject against
/// the users table, and injects a `Caller` into request extensions. A
/// token whose subject no longer exists is treated as revoked; deleting a
/// user invalidates every token issued to them.
async fn require_auth(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or(ApiError::MissingToken)?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::RevokedToken)?;

    let caller = Caller {
        id: user.id,
        role: user.role,
    };

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// Pulls the token out of an `Authorization: Bearer ...` header
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
