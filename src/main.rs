use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting DevLink API in {:?} mode", config.environment);

    // Create tables on first run. The server still starts when the database
    // is unreachable and reports the condition via /health.
    if let Err(e) = database::schema::ensure_schema().await {
        tracing::warn!("schema bootstrap skipped: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("DEVLINK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("DevLink API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Resource routers
        .merge(user_routes())
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(post_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::users;

    Router::new()
        // Registration issues a token directly
        .route("/api/users", post(users::register))
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    let public = Router::new().route("/api/auth", post(auth::login));

    let protected = Router::new()
        .route("/api/auth", get(auth::whoami))
        .layer(axum::middleware::from_fn(middleware::token_auth_middleware));

    public.merge(protected)
}

fn profile_routes() -> Router {
    use axum::routing::{delete, post, put};
    use handlers::profile;

    let public = Router::new()
        .route("/api/profile", get(profile::get_all))
        .route("/api/profile/user/:user_id", get(profile::get_by_user))
        .route("/api/profile/github/:username", get(profile::github_repos));

    let protected = Router::new()
        .route("/api/profile/me", get(profile::get_mine))
        .route(
            "/api/profile",
            post(profile::upsert).delete(profile::delete_mine),
        )
        .route("/api/profile/experience", put(profile::add_experience))
        .route(
            "/api/profile/experience/:exp_id",
            delete(profile::remove_experience),
        )
        .route("/api/profile/education", put(profile::add_education))
        .route(
            "/api/profile/education/:edu_id",
            delete(profile::remove_education),
        )
        .layer(axum::middleware::from_fn(middleware::token_auth_middleware));

    public.merge(protected)
}

fn post_routes() -> Router {
    use axum::routing::{delete, post, put};
    use handlers::posts;

    Router::new()
        .route("/api/posts", post(posts::create).get(posts::list_all))
        .route("/api/posts/:id", get(posts::get).delete(posts::delete))
        .route("/api/posts/like/:id", put(posts::like))
        .route("/api/posts/unlike/:id", put(posts::unlike))
        .route("/api/posts/comment/:id", post(posts::add_comment))
        .route(
            "/api/posts/comment/:id/:comment_id",
            delete(posts::remove_comment),
        )
        .layer(axum::middleware::from_fn(middleware::token_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "DevLink API",
            "version": version,
            "description": "Developer social network backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "users": "POST /api/users (public - registration)",
                "auth": "POST /api/auth (public - login), GET /api/auth (protected - current user)",
                "profile": "/api/profile[/me|/user/:user_id|/experience|/education|/github/:username]",
                "posts": "/api/posts[/:id|/like/:id|/unlike/:id|/comment/:id[/:comment_id]] (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
