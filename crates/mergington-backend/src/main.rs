use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::Redirect,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use mergington::errors::Report;
use mergington::log;

mod config;
mod errors;
mod handlers;
mod services;

use config::Config;
use services::ActivityServiceInMemory;

/// Shared state handed to every request handler.
pub struct AppState {
    pub activities: ActivityServiceInMemory,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(activities: ActivityServiceInMemory) -> Self {
        Self {
            activities,
            started_at: chrono::Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    // Setup logging
    mergington::log::setup()?;

    let config = Config::load()?;
    log::debug!("Loaded configuration: {:?}", config);

    let state = Arc::new(AppState::new(ActivityServiceInMemory::seeded()));
    log::info!(
        activities = state.activities.activity_count(),
        "Activity registry seeded"
    );

    let app = router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Starting server on http://{}", listener.local_addr()?);
    log::info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down server");

    Ok(())
}

/// Build the application router over the given state.
fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { Redirect::temporary("/static/index.html") }),
        )
        .route("/health", get(handlers::health::get))
        .route("/activities", get(handlers::activities::list))
        .route(
            "/activities/{activity_name}/signup",
            post(handlers::activities::signup),
        )
        .route(
            "/activities/{activity_name}/unregister",
            post(handlers::activities::unregister),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors() -> CorsLayer {
    let origins = if cfg!(debug_assertions) {
        let dev_ports = [3000, 8000, 8080, 8081, 5173];
        let mut allowed_origins = Vec::new();
        for port in dev_ports {
            allowed_origins.push(format!("http://localhost:{port}"));
            allowed_origins.push(format!("http://127.0.0.1:{port}"));
        }
        allowed_origins
    } else {
        // Production origins - add your domains here
        vec![]
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use mergington::serde_json::{self, Value};
    use tower::ServiceExt;

    const CHESS: &str = "Chess%20Club";

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = Arc::new(AppState::new(ActivityServiceInMemory::seeded()));
        router(state, &config.static_dir)
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn participants(activities: &Value, name: &str) -> Vec<String> {
        activities[name]["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p.as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn get_activities() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/activities").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["Chess Club"]["participants"].is_array());
        assert_eq!(body["Chess Club"]["max_participants"], 12);
        assert_eq!(body.as_object().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn signup_and_unregister() {
        let app = app();
        let email = "newstudent@example.com";

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/activities/{CHESS}/signup?email=newstudent%40example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], format!("Signed up {email} for Chess Club"));

        let (_, activities) = send(&app, Method::GET, "/activities").await;
        assert!(participants(&activities, "Chess Club").contains(&email.to_string()));

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/activities/{CHESS}/unregister?email=newstudent%40example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], format!("Removed {email} from Chess Club"));

        let (_, activities) = send(&app, Method::GET, "/activities").await;
        assert!(!participants(&activities, "Chess Club").contains(&email.to_string()));
    }

    #[tokio::test]
    async fn signup_existing_returns_400() {
        let app = app();
        let (_, activities) = send(&app, Method::GET, "/activities").await;
        let existing = participants(&activities, "Chess Club")[0].replace('@', "%40");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/activities/{CHESS}/signup?email={existing}"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Student is already signed up");
    }

    #[tokio::test]
    async fn unregister_missing_returns_404() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/activities/{CHESS}/unregister?email=notfound%40example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Student is not signed up for this activity");
    }

    #[tokio::test]
    async fn activity_not_found_returns_404() {
        let app = app();
        for action in ["signup", "unregister"] {
            let (status, body) = send(
                &app,
                Method::POST,
                &format!("/activities/NO_SUCH_ACTIVITY/{action}?email=x%40y.com"),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["detail"], "Activity not found");
        }
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let app = app();
        let (status, _) = send(&app, Method::POST, &format!("/activities/{CHESS}/signup")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_requires_post() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/activities/{CHESS}/signup?email=a%40b.com"),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn root_redirects_to_client() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/static/index.html"
        );
    }

    #[tokio::test]
    async fn serves_static_client() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/static/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_registry() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["registry"]["activities"], 9);
        assert_eq!(body["registry"]["participants"], 18);
    }
}
