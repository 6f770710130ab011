//! Shared test setup, and tests which drive the whole application through
//! its router.

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::header::{CONTENT_TYPE, COOKIE},
    response::Response,
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};
use diesel_migrations::MigrationHarness;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    MIGRATIONS,
    config::create_app,
    state::{AppState, DbPool},
    storage::ObjectStore,
};

mod site_flow;

// This is a macro rather than a function because the `assert!` panic
// then directly notes the span of the call site (rather than requiring
// a look at the stack trace to find it).
macro_rules! assert_res_ok {
    ($response:expr) => {
        assert!(
            $response.status().is_success()
                || $response.status().is_redirection(),
            "response status = {:?}, str = {}",
            $response.status(),
            {
                let body_bytes =
                    axum::body::to_bytes($response.into_body(), usize::MAX)
                        .await
                        .unwrap();
                String::from_utf8_lossy(&body_bytes).to_string()
            }
        );
    };
}
pub(crate) use assert_res_ok;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

const BOUNDARY: &str = "matchday-test-boundary";

/// A migrated, single-connection in-memory database.
pub fn test_pool() -> DbPool {
    let pool: DbPool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<SqliteConnection>::new(":memory:"))
        .unwrap();

    pool.get().unwrap().run_pending_migrations(MIGRATIONS).unwrap();

    pool
}

pub struct TestApp {
    pub app: Router,
    pub pool: DbPool,
    pub assets: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = test_pool();
        let assets = tempfile::tempdir().unwrap();

        let app = create_app(AppState {
            pool: pool.clone(),
            key: Key::from(&[7u8; 64][..]),
            store: ObjectStore::new(assets.path()),
        });

        TestApp { app, pool, assets }
    }

    /// How many uploads are on disk in one folder of the store.
    pub fn stored_files(&self, folder: &str) -> usize {
        match std::fs::read_dir(self.assets.path().join(folder)) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub async fn send(&self, request: Request) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Posts a `multipart/form-data` body; files are `(field, file name,
    /// contents)`.
    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(COOKIE, cookie)
            .body(Body::from(multipart_body(fields, files)))
            .unwrap();
        self.send(request).await
    }

    /// Registers the admin account and returns its session cookie.
    pub async fn sign_in(&self) -> String {
        let registered = self
            .post_form(
                "/register",
                None,
                &[
                    ("username", ADMIN_USERNAME),
                    ("email", "admin@club.test"),
                    ("password", ADMIN_PASSWORD),
                    ("password2", ADMIN_PASSWORD),
                ],
            )
            .await;
        assert_res_ok!(registered);

        let response = self
            .post_form(
                "/login",
                None,
                &[("id", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert!(response.status().is_redirection());

        session_cookie(&response)
    }
}

pub fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, contents) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    body
}
