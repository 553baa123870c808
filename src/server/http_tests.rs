// Integration tests for the HTTP surface
use crate::{
    engine::{
        connection::{ConnectionManager, ConnectionState},
        storage::{InMemoryStorage, StoreConnector, UserStorage},
        supervisor::{ConnectionOutcome, ConnectionSupervisor, SupervisorConfig},
    },
    models::User,
    server::http::{create_router, welcome_message, WelcomeServerBuilder},
    Result, WelcomeError,
};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::{net::TcpListener, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

// Test helpers
struct UnreachableConnector;

#[async_trait::async_trait]
impl StoreConnector for UnreachableConnector {
    async fn connect(&self, _uri: &str) -> Result<Arc<dyn UserStorage>> {
        Err(WelcomeError::Storage(anyhow::anyhow!(
            "server selection timeout: no available servers"
        )))
    }
}

struct BrokenStorage;

#[async_trait::async_trait]
impl UserStorage for BrokenStorage {
    async fn insert_user(&self, _user: User) -> Result<User> {
        Err(WelcomeError::Storage(anyhow::anyhow!("socket closed")))
    }
    async fn first_user(&self) -> Result<Option<User>> {
        Err(WelcomeError::Storage(anyhow::anyhow!("socket closed")))
    }
    async fn list_users(&self) -> Result<Vec<User>> {
        Err(WelcomeError::Storage(anyhow::anyhow!("socket closed")))
    }
    async fn count_users(&self) -> Result<u64> {
        Err(WelcomeError::Storage(anyhow::anyhow!("socket closed")))
    }
    async fn delete_all_users(&self) -> Result<u64> {
        Err(WelcomeError::Storage(anyhow::anyhow!("socket closed")))
    }
}

async fn connected_app(names: &[&str]) -> Router {
    let storage = Arc::new(InMemoryStorage::new());
    for name in names {
        storage.insert_user(User::new(*name)).await.unwrap();
    }

    let manager = Arc::new(ConnectionManager::new());
    manager.attach(storage);
    create_router(manager, true)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_welcome_returns_first_record() {
    let app = connected_app(&["Big Bill Brown"]).await;
    let (status, body) = get(app, "/welcome").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "Hello Client! There is one record in the database for Big Bill Brown"
    );
}

#[tokio::test]
async fn test_welcome_is_plain_text() {
    let app = connected_app(&["Big Bill Brown"]).await;
    let response = app
        .oneshot(Request::builder().uri("/welcome").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_welcome_uses_earliest_of_duplicates() {
    let app = connected_app(&["Big Bill Brown", "Big Bill Brown", "Someone Else"]).await;
    let (status, body) = get(app, "/welcome").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, welcome_message("Big Bill Brown"));
}

#[tokio::test]
async fn test_welcome_on_empty_store_is_not_found() {
    let app = connected_app(&[]).await;
    let (status, body) = get(app, "/welcome").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("no records"));
}

#[tokio::test]
async fn test_welcome_before_connect_is_unavailable() {
    let app = create_router(Arc::new(ConnectionManager::new()), false);
    let (status, _) = get(app, "/welcome").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_query_failure_is_internal_error() {
    let manager = Arc::new(ConnectionManager::new());
    manager.attach(Arc::new(BrokenStorage));
    let (status, body) = get(create_router(manager, true), "/welcome").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("socket closed"));
}

#[tokio::test]
async fn test_health_reports_store_state() {
    let (status, body) = get(
        create_router(Arc::new(ConnectionManager::new()), true),
        "/health",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "disconnected");

    let (_, body) = get(connected_app(&["Big Bill Brown"]).await, "/health").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["store"], "connected");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = get(connected_app(&["Big Bill Brown"]).await, "/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listener_serves_while_store_is_unreachable() {
    let manager = Arc::new(ConnectionManager::new());
    let shutdown = CancellationToken::new();

    let supervisor = ConnectionSupervisor::new(
        Arc::new(UnreachableConnector),
        manager.clone(),
        SupervisorConfig {
            retry_delay: Duration::from_millis(20),
            ..SupervisorConfig::default()
        },
    )
    .spawn(shutdown.clone());

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = WelcomeServerBuilder::new(manager.clone()).build();
    let server_shutdown = shutdown.clone();
    let server_task = tokio::spawn(async move {
        server
            .serve(listener, async move { server_shutdown.cancelled().await })
            .await
    });

    // Let a few retries fail before probing
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ne!(manager.state(), ConnectionState::Connected);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let health = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let welcome = client
        .get(format!("http://{}/welcome", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(welcome.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    shutdown.cancel();
    tokio_test::assert_ok!(server_task.await.unwrap());
    assert!(matches!(
        supervisor.await.unwrap(),
        ConnectionOutcome::Cancelled { .. }
    ));
}

#[test]
fn test_builder_overrides_config() {
    let server = WelcomeServerBuilder::new(Arc::new(ConnectionManager::new()))
        .with_host("127.0.0.1")
        .with_port(8081)
        .with_cors(false)
        .build();

    assert_eq!(server.config().host, "127.0.0.1");
    assert_eq!(server.config().port, 8081);
    assert!(!server.config().cors_enabled);
}
