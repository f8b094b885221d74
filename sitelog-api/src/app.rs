//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use sitelog_api::{app::{build_router, AppState}, config::Config};
//! use sitelog_shared::db::pool::create_pool;
//! use sitelog_shared::store::Stores;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(config.database.clone()).await?;
//! let state = AppState::new(Stores::postgres(pool), config);
//! let app = build_router(state);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use sitelog_shared::auth::identity::IdentityProvider;
use sitelog_shared::auth::middleware::{jwt_auth_middleware, route_class_gate, RouteClass};
use sitelog_shared::lifecycle::TaskLifecycle;
use sitelog_shared::oversight::AdminOversight;
use sitelog_shared::store::Stores;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; every field
/// is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub lifecycle: TaskLifecycle,
    pub oversight: AdminOversight,
    pub identity: Arc<IdentityProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the engine, the oversight layer and the identity provider to
    /// one set of stores
    pub fn new(stores: Stores, config: Config) -> Self {
        let identity = IdentityProvider::new(config.identity_config(), stores.users.clone());
        let oversight = AdminOversight::new(stores.clone())
            .with_member_validation(config.validate_project_members);

        Self {
            lifecycle: TaskLifecycle::new(stores.clone()),
            oversight,
            identity: Arc::new(identity),
            stores,
            config: Arc::new(config),
        }
    }
}

/// Puts bearer authentication and the role gate for `class` in front of
/// every route already on `router`
fn protect(router: Router<AppState>, class: RouteClass, state: &AppState) -> Router<AppState> {
    router
        .route_layer(from_fn_with_state(class, route_class_gate))
        .route_layer(from_fn_with_state(state.identity.clone(), jwt_auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use routes::admin;

    let protected = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/:id", delete(admin::delete_user))
        .route("/projects", get(admin::list_projects).post(admin::create_project))
        .route(
            "/projects/:id",
            get(admin::get_project)
                .put(admin::update_project)
                .delete(admin::delete_project),
        )
        .route("/tasks/daily", get(admin::daily_tasks))
        .route("/tasks/monthly", get(admin::monthly_tasks))
        .route("/tasks/project/:id", get(admin::project_tasks));

    protect(protected, RouteClass::Admin, state)
        .route("/login", post(routes::session::admin_login))
        .route("/logout", post(routes::session::logout))
}

fn engineer_routes(state: &AppState) -> Router<AppState> {
    use routes::engineer;

    let protected = Router::new()
        .route("/projects", get(engineer::projects))
        .route("/daily-tasks", post(engineer::create_daily_task))
        .route(
            "/daily-tasks/:id",
            get(engineer::daily_tasks).delete(engineer::delete_daily_task),
        )
        .route("/monthly-tasks", post(engineer::create_monthly_task))
        .route(
            "/monthly-tasks/:id",
            get(engineer::monthly_tasks).delete(engineer::delete_monthly_task),
        );

    protect(protected, RouteClass::Engineer, state)
        .route("/login", post(routes::session::engineer_login))
        .route("/logout", post(routes::session::logout))
}

fn supervisor_routes(state: &AppState) -> Router<AppState> {
    use routes::supervisor;

    let protected = Router::new()
        .route("/projects", get(supervisor::projects))
        .route("/daily-tasks/:id", get(supervisor::daily_tasks))
        .route("/daily-tasks/:id/review", put(supervisor::review_daily_task))
        .route("/monthly-tasks/:id", get(supervisor::monthly_tasks))
        .route("/monthly-tasks/:id/review", put(supervisor::review_monthly_task));

    protect(protected, RouteClass::Supervisor, state)
        .route("/login", post(routes::session::supervisor_login))
        .route("/logout", post(routes::session::logout))
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
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
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /                       # Service banner
/// ├── GET  /health                 # Store probe
/// └── /api/
///     ├── /admin/                  # login/logout public, rest admin-only
///     ├── /engineer/               # login/logout public, rest engineer-only
///     └── /supervisor/             # login/logout public, rest supervisor-only
/// ```
///
/// Protected routes validate the bearer token, then check the caller's
/// role against the route family. The engine repeats the role check and
/// adds membership and ownership checks.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/admin", admin_routes(&state))
        .nest("/engineer", engineer_routes(&state))
        .nest("/supervisor", supervisor_routes(&state));

    Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
