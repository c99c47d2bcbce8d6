//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock upstream, watermark and package sync dependencies, so the HTTP
//! surface can be exercised without a network or a database.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use mirror_sync_core::{
    load_config_from_str,
    testing::{MockPackageSyncer, MockRegistry, MockWatermarkStore},
    PackageSyncWorker, PackageSyncer, RegistryClient, StatusBoard, StatusReporter, SyncOrchestrator,
    SyncPlanner, WatermarkStore, WorkerDriver,
};
use mirror_sync_server::{api::create_router, scheduler::SyncScheduler, state::AppState};

/// Re-export fixtures for test convenience
pub use mirror_sync_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[registry]
url = "http://registry.test"

[sync]
concurrency = 2

[scheduler]
interval_secs = 0
run_on_start = false
"#;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_trigger() {
///     let fixture = TestFixture::new();
///     fixture.registry.set_listing(fixtures::names(&["a"])).await;
///
///     let response = fixture.post("/api/v1/sync").await;
///     assert_eq!(response.status, StatusCode::ACCEPTED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock upstream registry - configure listings and change feeds
    pub registry: Arc<MockRegistry>,
    /// Mock watermark store - inspect writes
    pub watermarks: Arc<MockWatermarkStore>,
    /// Mock per-package syncer behind a real worker pool
    pub syncer: Arc<MockPackageSyncer>,
    /// The orchestrator behind the router
    pub orchestrator: Arc<SyncOrchestrator>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new fixture for a mirror that has never synced.
    pub fn new() -> Self {
        Self::with_watermarks(MockWatermarkStore::new())
    }

    /// Create a fixture around a specific watermark store.
    pub fn with_watermarks(watermarks: MockWatermarkStore) -> Self {
        let config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");

        let registry = Arc::new(MockRegistry::new());
        let watermarks = Arc::new(watermarks);
        let syncer = Arc::new(MockPackageSyncer::new());

        let worker = PackageSyncWorker::new(Arc::clone(&syncer) as Arc<dyn PackageSyncer>)
            .with_checkpoints(Arc::clone(&watermarks) as Arc<dyn WatermarkStore>);
        let planner = SyncPlanner::new(
            config.planner.clone(),
            Arc::clone(&registry) as Arc<dyn RegistryClient>,
        );
        let status_board = Arc::new(StatusBoard::new());
        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                config.sync.clone(),
                Arc::clone(&watermarks) as Arc<dyn WatermarkStore>,
                planner,
                Arc::new(worker) as Arc<dyn WorkerDriver>,
            )
            .with_status_reporter(Arc::clone(&status_board) as Arc<dyn StatusReporter>),
        );
        let scheduler = Arc::new(SyncScheduler::new(
            config.scheduler.clone(),
            Arc::clone(&orchestrator),
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&orchestrator),
            scheduler,
            status_board,
        ));

        Self {
            router: create_router(state),
            registry,
            watermarks,
            syncer,
            orchestrator,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Poll the status endpoint until no run is active.
    pub async fn wait_until_idle(&self) -> TestResponse {
        for _ in 0..100 {
            let response = self.get("/api/v1/status").await;
            if response.body["running"] == Value::Bool(false) {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Sync run did not finish in time");
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
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

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
