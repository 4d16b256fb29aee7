//! HTTP server for a tally node.
//!
//! Exposes the three append entry points, point reads, the reconciled
//! history view, and refresh control over HTTP. Authentication is
//! pluggable through [`AuthProvider`]; the append policy for anonymous
//! callers comes from [`ServerConfig`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::{AllowAllAuth, AuthProvider, Credentials, Identity, RequestSubmitter};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{AppState, TallyServer};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_server(allow_anonymous_append: bool) -> TallyServer {
        let config = ServerConfig {
            allow_anonymous_append,
            ..ServerConfig::default()
        };
        TallyServer::new(config)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json_bearer(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_server(true).router();
        let response = app.oneshot(get("/v1/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let app = test_server(true).router();
        let response = app.oneshot(get("/v1/info")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "tally-server");
        assert_eq!(body["allow_anonymous_append"], true);
    }

    #[tokio::test]
    async fn append_then_read_back() {
        let app = test_server(true).router();

        let response = app
            .clone()
            .oneshot(post_json("/v1/records", json!({"name": "alpha", "sum": 7})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["record"]["id"], 0);
        assert_eq!(body["record"]["name"], "alpha");
        assert!(body["tx"].is_string());

        let response = app.clone().oneshot(get("/v1/records/0")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "alpha");
        assert_eq!(body["sum"], 7);

        let response = app.clone().oneshot(get("/v1/count")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let app = test_server(true).router();
        let response = app.oneshot(get("/v1/records/9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn name_only_endpoint_defaults_the_sum() {
        let app = test_server(true).router();
        let response = app
            .oneshot(post_json("/v1/records/name-only", json!({"name": "solo"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["record"]["name"], "solo");
        assert_eq!(body["record"]["sum"], 0);
    }

    #[tokio::test]
    async fn sum_of_two_endpoint_adds() {
        let app = test_server(true).router();
        let response = app
            .oneshot(post_json("/v1/records/sum-of-two", json!({"a": 20, "b": 22})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["record"]["sum"], 42);
        assert_eq!(body["record"]["name"], "");
    }

    #[tokio::test]
    async fn overflowing_sum_is_forbidden() {
        let app = test_server(true).router();
        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/records/sum-of-two",
                json!({"a": u64::MAX, "b": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Nothing was stored.
        let response = app.oneshot(get("/v1/count")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn anonymous_append_can_be_disabled() {
        let app = test_server(false).router();

        let response = app
            .clone()
            .oneshot(post_json("/v1/records", json!({"name": "nope", "sum": 1})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // A bearer token still writes.
        let response = app
            .clone()
            .oneshot(post_json_bearer(
                "/v1/records",
                "sekrit",
                json!({"name": "yep", "sum": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Reads stay open either way.
        let response = app.oneshot(get("/v1/count")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn history_is_published_only_by_refresh() {
        let app = test_server(true).router();
        app.clone()
            .oneshot(post_json("/v1/records", json!({"name": "alpha", "sum": 7})))
            .await
            .unwrap();

        let response = app.clone().oneshot(get("/v1/history")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["entries"].as_array().unwrap().len(), 0);

        let response = app
            .clone()
            .oneshot(get("/v1/history?refresh=true"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["record"]["name"], "alpha");
        assert_eq!(entries[0]["commit_number"], 1);
        assert_eq!(body["ledger_count"], 1);
    }

    #[tokio::test]
    async fn history_order_is_selectable() {
        let app = test_server(true).router();
        for (name, sum) in [("first", 1), ("second", 2)] {
            app.clone()
                .oneshot(post_json("/v1/records", json!({"name": name, "sum": sum})))
                .await
                .unwrap();
        }

        let response = app
            .clone()
            .oneshot(get("/v1/history?refresh=true&order=oldest"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["entries"][0]["record"]["id"], 0);

        let response = app
            .clone()
            .oneshot(get("/v1/history?order=newest"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["entries"][0]["record"]["id"], 1);
    }

    #[tokio::test]
    async fn unknown_history_order_is_a_bad_request() {
        let app = test_server(true).router();
        let response = app
            .oneshot(get("/v1/history?order=sideways"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_endpoint_reports_the_cycle() {
        let app = test_server(true).router();
        app.clone()
            .oneshot(post_json("/v1/records", json!({"name": "r", "sum": 3})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/v1/refresh", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ledger_count"], 1);
        assert_eq!(body["published"], 1);
        assert_eq!(body["skipped"].as_array().unwrap().len(), 0);
    }
}
