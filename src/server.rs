use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router with shared state and global layers applied
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(user_routes())
        .merge(friend_routes())
        .merge(activity_routes())
        .merge(entry_routes())
        .merge(chart_routes())
        .merge(page_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected
        .merge(protected)
        .layer(cors_layer(&state.config));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(public::users::register_post))
        .route("/api/users/login", post(public::users::login_post))
        .route("/api/users/refresh", post(public::users::refresh_post))
        .route("/api/pages/home_page", get(public::pages::home_page_get))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users/logout", post(users::logout_post))
        .route(
            "/api/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
}

fn friend_routes() -> Router<AppState> {
    use protected::friends;

    Router::new()
        .route("/api/friends", get(friends::friends_get))
        .route(
            "/api/friends/:friend_id",
            post(friends::friend_post).delete(friends::friend_delete),
        )
}

fn activity_routes() -> Router<AppState> {
    use protected::activities;

    Router::new()
        .route(
            "/api/activities",
            get(activities::activities_get).post(activities::activities_post),
        )
        .route(
            "/api/activities/:id",
            get(activities::activity_get)
                .put(activities::activity_put)
                .delete(activities::activity_delete),
        )
        .route(
            "/api/activities/:id/related/:related_id",
            post(activities::related_post).delete(activities::related_delete),
        )
}

fn entry_routes() -> Router<AppState> {
    use protected::entries;

    Router::new()
        .route("/api/entries", post(entries::entries_post))
        .route(
            "/api/entries/bulk",
            post(entries::bulk_post).put(entries::bulk_put).delete(entries::bulk_delete),
        )
        .route(
            "/api/entries/:id",
            get(entries::entry_get).put(entries::entry_put).delete(entries::entry_delete),
        )
}

fn chart_routes() -> Router<AppState> {
    Router::new().route("/api/charts/data_for_chart", post(protected::charts::data_for_chart_post))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pages/Profile", get(protected::pages::profile_get))
        .route("/api/pages/get_username", get(protected::pages::username_get))
}

/// Development allows any origin; elsewhere only `SECURITY_CORS_ORIGINS`
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Activity Tracker API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "users": "/api/users/register, /api/users/login, /api/users/refresh (public); /api/users/:id, /api/users/logout (protected)",
                "friends": "/api/friends[/:friend_id] (protected)",
                "activities": "/api/activities[/:id[/related/:related_id]] (protected)",
                "entries": "/api/entries[/bulk|/:id] (protected)",
                "charts": "/api/charts/data_for_chart (protected)",
                "pages": "/api/pages/home_page (public), /api/pages/Profile, /api/pages/get_username (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
