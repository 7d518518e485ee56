use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use pharmafind_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db, events,
    events::EventSender,
    handlers::AppServices,
    AppState,
};

/// Test harness backed by an in-memory SQLite database. Each instance gets
/// its own database; the single-connection pool keeps it alive.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            cfg.jwt_expiration as i64,
        )));

        let services = AppServices::new(db_arc.clone(), auth.clone(), event_sender.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth,
            services,
        };

        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .nest("/api/v1", pharmafind_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Registers a pharmacy through the API and returns (pharmacy id, token).
    pub async fn signup_pharmacy(&self, name: &str, email: &str) -> (Uuid, String) {
        let response = self
            .request(
                Method::POST,
                "/api/v1/pharmacies/signup",
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "correct-horse-battery",
                    "city": "Douala",
                    "address": "12 Rue des Manguiers",
                    "latitude": 4.0511,
                    "longitude": 9.7679,
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "signup should succeed");

        let body = read_json(response).await;
        let data = &body["data"];
        let id = data["pharmacy"]["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("signup response should carry the pharmacy id");
        let token = data["token"]
            .as_str()
            .expect("signup response should carry a token")
            .to_string();
        (id, token)
    }

    /// Creates a catalog medicine through the API and returns its id.
    pub async fn seed_medicine(&self, name: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/medicines",
                Some(json!({
                    "name": name,
                    "dosage": "500 mg",
                    "form": "comprimé",
                    "manufacturer": "Laboratoires Test",
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed medicine should succeed");

        let body = read_json(response).await;
        body["data"]["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("create medicine response should carry an id")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Reads a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}
