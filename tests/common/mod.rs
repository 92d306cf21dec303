//! Shared harness for router-level tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use campus_careers::{
    account::{NewAccount, Role},
    config::{
        AuthConfig, ImportConfig, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig,
    },
    context::AppContext,
    db::memory_pool,
    error::PortalResult,
    mailer::Notifier,
    server::build_router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const BOUNDARY: &str = "campus-careers-test-boundary";

/// Notifier that remembers every send instead of mailing
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_account_created(&self, to_email: &str, password: &str) -> PortalResult<()> {
        self.sent
            .lock()
            .await
            .push((to_email.to_string(), password.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub ctx: AppContext,
    pub notifier: Arc<RecordingNotifier>,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config(uploads: &TempDir) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 0,
            public_url: "http://localhost:3000".to_string(),
            upload_limit: 64 * 1024,
        },
        storage: StorageConfig {
            data_directory: uploads.path().to_path_buf(),
            database: ":memory:".into(),
            uploads_directory: uploads.path().join("uploads"),
        },
        authentication: AuthConfig {
            jwt_secret: "integration-test-secret-key-0123456789".to_string(),
            token_ttl_hours: 1,
            bootstrap_admin: None,
        },
        email: None,
        import: ImportConfig {
            default_password: "default123".to_string(),
            default_role: Role::Student,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            json: false,
        },
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let db = memory_pool().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());

        let ctx = AppContext::with_pool(test_config(&uploads), db, notifier.clone());
        let router = build_router(ctx.clone());

        Self {
            router,
            ctx,
            notifier,
            _uploads: uploads,
        }
    }

    /// Create an account directly and return its bearer token
    pub async fn account_token(&self, email: &str, role: Role) -> String {
        self.ctx
            .account_manager
            .issue_credentials(NewAccount {
                email: email.to_string(),
                password: "password123".to_string(),
                role,
                first_name: "Test".to_string(),
                middle_name: None,
                surname: "User".to_string(),
                mobile_number: None,
            })
            .await
            .unwrap()
            .token
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn multipart(&self, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }
}

/// One multipart part: a text field when `file_name` is `None`
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
