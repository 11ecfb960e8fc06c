//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that assembles the router
//! in-process with a mock reservation runner and real sqlite stores on a
//! temp directory, so API behavior can be tested without a live portal.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use seatgrab_core::testing::MockRunner;
use seatgrab_core::{
    create_audit_system, AuditStore, Config, ProgressBroadcaster, ReservationRunner,
    SettingsStore, SqliteAuditStore, SqliteSettingsStore, TriggerScheduler,
};

use seatgrab_server::api::create_router;
use seatgrab_server::state::AppState;

/// Test fixture for API testing with a mock reservation runner.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_reserve() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/api/v1/reserve", json!({ "windows": ["8-11"] }))
///         .await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock runner - inspect recorded runs, script failures
    pub runner: Arc<MockRunner>,
    /// Settings store backing the API
    pub settings: Arc<SqliteSettingsStore>,
    /// Audit store backing the history API
    pub audit_store: Arc<dyn AuditStore>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default config.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: seatgrab_core::DatabaseConfig {
                path: db_path.clone(),
            },
            ..Config::default()
        };

        // Create stores
        let settings = Arc::new(
            SqliteSettingsStore::new(&db_path).expect("Failed to create settings store"),
        );
        let audit_store: Arc<dyn AuditStore> = Arc::new(
            SqliteAuditStore::new(&db_path).expect("Failed to create audit store"),
        );

        // Create audit system and spawn the writer
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        // Mock runner instead of the real orchestrator
        let runner = Arc::new(MockRunner::new());

        // Scheduler is wired but never started in tests
        let scheduler = TriggerScheduler::new(
            config.scheduler.clone(),
            Arc::clone(&settings) as Arc<dyn SettingsStore>,
            Arc::clone(&runner) as Arc<dyn ReservationRunner>,
        );

        let state = Arc::new(AppState::new(
            Arc::clone(&settings) as Arc<dyn SettingsStore>,
            Arc::clone(&audit_store),
            audit_handle,
            Arc::clone(&runner) as Arc<dyn ReservationRunner>,
            scheduler,
            ProgressBroadcaster::default(),
        ));

        let router = create_router(state);

        Self {
            router,
            runner,
            settings,
            audit_store,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
