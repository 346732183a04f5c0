use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bookbinder_api::handlers::{admin, auth, author, public, reader};
use bookbinder_api::middleware::{route_guard_middleware, session_auth_middleware};
use bookbinder_api::services::LogMailer;
use bookbinder_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "bookbinder-api", version, about = "Book publishing backend API")]
struct Args {
    /// Port to listen on (overrides BOOKBINDER_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = bookbinder_api::config::config();
    tracing_subscriber::fmt::init();
    tracing::info!("Starting bookbinder API in {:?} mode", config.environment);

    // Process-scoped services, injected into handlers through State
    let state = AppState::init(config, Arc::new(LogMailer)).await?;
    state.bootstrap_superadmin().await?;

    let app = app(state.clone());

    // Allow tests or deployments to override port via env
    let port = args
        .port
        .or_else(|| std::env::var("BOOKBINDER_PORT").ok().and_then(|s| s.parse().ok()))
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("bookbinder API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(public_routes())
        // Authenticated
        .merge(reader_routes())
        .merge(author_routes())
        .merge(admin_routes())
        // Global middleware
        .layer(axum::middleware::from_fn(route_guard_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/auth/me",
            get(auth::me).route_layer(axum::middleware::from_fn(session_auth_middleware)),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subjects",
            get(admin::subjects::list)
                .post(admin::subjects::create)
                .delete(admin::subjects::remove),
        )
        .route(
            "/topics",
            get(admin::topics::list)
                .post(admin::topics::create)
                .delete(admin::topics::remove),
        )
        .route(
            "/authors",
            get(admin::authors::list)
                .post(admin::authors::create)
                .delete(admin::authors::remove),
        )
        .route(
            "/mappings/author-subjects",
            get(admin::mappings::list)
                .post(admin::mappings::create)
                .delete(admin::mappings::remove),
        )
        .route("/admin/books", get(admin::books::list))
        .route_layer(axum::middleware::from_fn(session_auth_middleware))
}

fn author_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/author/books",
            get(author::books::list)
                .post(author::books::create)
                .put(author::books::update)
                .delete(author::books::remove),
        )
        .route(
            "/author/chapters",
            get(author::chapters::list)
                .post(author::chapters::create)
                .put(author::chapters::update)
                .delete(author::chapters::remove),
        )
        .route(
            "/author/subtopics",
            get(author::subtopics::list)
                .post(author::subtopics::create)
                .put(author::subtopics::update)
                .delete(author::subtopics::remove),
        )
        .route(
            "/author/pages",
            get(author::pages::list)
                .post(author::pages::create)
                .put(author::pages::update)
                .delete(author::pages::remove),
        )
        .route("/author/subjects", get(author::subjects::list))
        .route("/author/topics", get(author::subjects::topics))
        .route_layer(axum::middleware::from_fn(session_auth_middleware))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(public::books::catalogue))
        .route("/books/:id", get(public::books::detail))
        .route("/books/:id/chapters", get(public::books::chapters))
        .route(
            "/books/:id/chapters/:chapter_id/pages",
            get(public::books::chapter_pages),
        )
        .route("/books/:id/topics", get(public::books::topics))
        .route(
            "/books/:id/subtopics/:subtopic_id/pages",
            get(public::books::subtopic_pages),
        )
}

fn reader_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books/:id/bookmarks",
            get(reader::bookmarks::list)
                .post(reader::bookmarks::toggle)
                .delete(reader::bookmarks::remove),
        )
        .route(
            "/books/:id/highlights",
            get(reader::highlights::list)
                .post(reader::highlights::create)
                .delete(reader::highlights::remove),
        )
        .route_layer(axum::middleware::from_fn(session_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Bookbinder API",
            "version": version,
            "description": "Book publishing backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login, /auth/register, /auth/logout, /auth/me",
                "catalogue": "/books[/:id[/chapters|/topics|...]] (public)",
                "annotations": "/books/:id/bookmarks, /books/:id/highlights (authenticated)",
                "authoring": "/author/* (author role)",
                "administration": "/subjects, /topics, /authors, /mappings/author-subjects, /admin/books (superadmin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.health_check().await {
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

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
