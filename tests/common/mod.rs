use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response},
};
use serde_json::Value;
use subtally::test_utils::test_server;
use tower::ServiceExt;

/// Test harness that runs the full router against an in-memory database
pub struct TestHarness {
    pub app: Router,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = test_server().await;
        Self {
            app: server.create_app(),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<axum::body::Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str) -> Response<axum::body::Body> {
        self.request(Method::GET, uri, None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, uri: &str, body: Value) -> Response<axum::body::Body> {
        self.request(Method::POST, uri, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn put(&self, uri: &str, body: Value) -> Response<axum::body::Body> {
        self.request(Method::PUT, uri, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, uri: &str) -> Response<axum::body::Body> {
        self.request(Method::DELETE, uri, None).await
    }
}

pub async fn json_body(response: Response<axum::body::Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
