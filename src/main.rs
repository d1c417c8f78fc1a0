use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use skillswap_api::database::manager::DatabaseManager;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = skillswap_api::config::config();
    tracing::info!("Starting skillswap API in {:?} mode", config.environment);

    // Bring the schema up to date. A failure is logged rather than fatal:
    // the pool connects lazily and /health reports the outage.
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::error!("Migrations not applied at startup: {}", e);
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("skillswap API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(offer_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    use axum::routing::put;
    use skillswap_api::handlers::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users-posts", get(users::list_paged))
        .route("/users/:id", put(users::update).delete(users::delete))
}

fn offer_routes() -> Router {
    use axum::routing::put;
    use skillswap_api::handlers::offers;

    Router::new()
        .route("/conhecimentos", get(offers::list).post(offers::create))
        .route(
            "/conhecimentos/:id",
            put(offers::update).delete(offers::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Skillswap API",
            "version": version,
            "description": "Knowledge-exchange API: user and offer CRUD over PostgreSQL",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "users": "/users, /users/:id",
                "users_paginated": "/users-posts?page=N&limit=M",
                "offers": "/conhecimentos[?categoria=&nivel=&busca=], /conhecimentos/:id",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
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
