//! Common test utilities for ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use ledger_service::{create_router, AppState, ServiceConfig};
use ledger_store::RocksTable;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The underlying table, for seeding rows directly.
    pub table: Arc<RocksTable>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user for authenticated requests.
    pub test_user_id: String,
    /// The admin API key for privileged requests.
    pub admin_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let table = Arc::new(RocksTable::open(temp_dir.path()).expect("Failed to open store"));

        let admin_api_key = "test-admin-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_base_url: "http://localhost".into(),
            auth_audience: "ledger".into(),
            admin_api_key: Some(admin_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(table.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            table,
            _temp_dir: temp_dir,
            test_user_id: "user-1".to_string(),
            admin_api_key,
        }
    }

    /// Get the authorization header for the default test user.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get an authorization header for an arbitrary user.
    pub fn auth_header_for(user: &str) -> String {
        format!("Bearer test-token:{user}")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
