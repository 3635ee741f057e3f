//! Shared harness for the integration tests: an in-memory database, a
//! throwaway uploads directory and helpers to drive the router.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use bytes::Bytes;
use recipebox::{
    app::build_app,
    auth::repo_types::User,
    config::{AppConfig, SessionConfig},
    db,
    state::AppState,
    storage::{LocalStorage, StorageClient},
};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

pub const BOUNDARY: &str = "recipebox-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub db: SqlitePool,
    pub upload_dir: PathBuf,
}

/// Storage that refuses every write.
pub struct FailingStorage;

#[async_trait]
impl StorageClient for FailingStorage {
    async fn put_object(&self, key: &str, _body: Bytes) -> anyhow::Result<()> {
        anyhow::bail!("disk full while writing {key}")
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("recipebox-test-{}", Uuid::new_v4()));
        let storage = Arc::new(LocalStorage::new(&upload_dir)) as Arc<dyn StorageClient>;
        Self::build(upload_dir, storage).await
    }

    pub async fn with_failing_storage() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("recipebox-test-{}", Uuid::new_v4()));
        Self::build(upload_dir, Arc::new(FailingStorage)).await
    }

    async fn build(upload_dir: PathBuf, storage: Arc<dyn StorageClient>) -> Self {
        let db = db::connect_in_memory().await.expect("in-memory db");
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "recipebox-test".into(),
                ttl_minutes: 60,
                cookie_secure: false,
            },
            upload_dir: upload_dir.to_string_lossy().into_owned(),
        });
        let state = AppState::from_parts(db.clone(), config, storage);
        Self {
            app: build_app(state),
            db,
            upload_dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        parts: &[Part<'_>],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(multipart_body(parts))).unwrap()).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Response<Body> {
        let body = format!("name={name}&email={email}&password={password}");
        self.post_form("/register", &body, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        let body = format!("email={email}&password={password}");
        self.post_form("/login", &body, None).await
    }

    /// Register and log in; returns the user row and a `Cookie` header value.
    pub async fn signed_in(&self, name: &str, email: &str) -> (User, String) {
        let res = self.register(name, email, "pw1").await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "register {email}");
        let res = self.login(email, "pw1").await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "login {email}");
        let cookie = session_cookie(&res).expect("login sets a session cookie");
        let user = User::find_by_email(&self.db, email)
            .await
            .unwrap()
            .expect("registered user");
        (user, cookie)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                out.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                data,
            } => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(data);
            }
        }
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

/// `name=value` of the session cookie set by a response, if any.
pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
