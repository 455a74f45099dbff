use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bookshelf_api::context::AppContext;
use bookshelf_api::handlers;
use bookshelf_api::middleware::auth::attach_caller;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = bookshelf_api::config::config();
    tracing::info!("Starting Bookshelf API in {:?} mode", config.environment);

    let ctx = AppContext::from_env()
        .await
        .unwrap_or_else(|e| panic!("failed to initialize backends: {}", e));

    let app = app(ctx);

    // Allow tests or deployments to override port via env
    let port = std::env::var("BOOKSHELF_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Bookshelf API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(ctx: AppContext) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Development identity provider (token acquisition)
        .route("/auth/login", post(handlers::auth::login))
        // Catalogue operations
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        .route("/api/authors", post(handlers::authors::create_author))
        .route("/api/profiles", post(handlers::profiles::create_profile))
        .route("/api/books", post(handlers::books::create_book))
        .route("/api/comments", post(handlers::comments::post_comment))
        // Signed file retrieval
        .route("/files/*key", get(handlers::files::file_get))
        // Global middleware
        .layer(axum::middleware::from_fn(attach_caller))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Bookshelf API",
            "version": version,
            "description": "Backend API for a community book catalogue",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (authenticated)",
                "authors": "POST /api/authors (admin)",
                "profiles": "POST /api/profiles (authenticated)",
                "books": "POST /api/books (admin)",
                "comments": "POST /api/comments (authenticated, requires profile)",
                "files": "/files/*key (signed links)",
            }
        }
    }))
}

async fn health(State(ctx): State<AppContext>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match ctx.store.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "document store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
