use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use herald_common::HeraldError;

/// Source of raw status payloads, queried with the poll cursor.
pub trait StatusSource: Send + Sync {
    /// Fetch every review changed since `from_date` (unix seconds) as raw JSON.
    fn fetch_status(
        &self,
        from_date: i64,
    ) -> impl Future<Output = Result<serde_json::Value, HeraldError>> + Send;
}

/// HTTP client for the review status API.
pub struct StatusClient {
    client: reqwest::Client,
    endpoint: String,
}

impl StatusClient {
    /// Build a client that authenticates with `OAuth <token>` and gives up on
    /// any request after `timeout`.
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, HeraldError> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {token}"))
            .map_err(|_| HeraldError::Config("PRACTICUM_TOKEN is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn status_error(&self, status: StatusCode, from_date: i64) -> HeraldError {
        let reason = match status {
            StatusCode::BAD_REQUEST => "invalid from_date",
            StatusCode::UNAUTHORIZED => "invalid API token",
            _ => "unexpected status",
        };
        HeraldError::ApiStatus {
            status: status.as_u16(),
            reason,
            endpoint: self.endpoint.clone(),
            from_date,
        }
    }
}

impl StatusSource for StatusClient {
    async fn fetch_status(&self, from_date: i64) -> Result<serde_json::Value, HeraldError> {
        let transport = |source: reqwest::Error| HeraldError::Transport {
            endpoint: self.endpoint.clone(),
            from_date,
            source,
        };

        tracing::debug!(endpoint = %self.endpoint, from_date, "Requesting review statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.status_error(status, from_date));
        }

        let body = response.text().await.map_err(transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    }

    async fn spawn_api(status: StatusCode, body: &'static str) -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route(
                "/statuses/",
                get(
                    move |State(seen): State<Seen>,
                          headers: HeaderMap,
                          Query(params): Query<HashMap<String, String>>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.requests
                            .lock()
                            .unwrap()
                            .push((auth, params.get("from_date").cloned()));
                        (status, body)
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/statuses/"), seen)
    }

    fn client(endpoint: &str) -> StatusClient {
        StatusClient::new(endpoint, "api-token", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_token_and_cursor() {
        let (endpoint, seen) = spawn_api(
            StatusCode::OK,
            r#"{"homeworks": [], "current_date": 2000}"#,
        )
        .await;

        let payload = client(&endpoint).fetch_status(1000).await.unwrap();

        assert_eq!(payload, json!({"homeworks": [], "current_date": 2000}));
        let requests = seen.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[(Some("OAuth api-token".to_string()), Some("1000".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_bad_request_and_unauthorized_are_not_retriable() {
        for (code, reason) in [
            (StatusCode::BAD_REQUEST, "invalid from_date"),
            (StatusCode::UNAUTHORIZED, "invalid API token"),
        ] {
            let (endpoint, _) = spawn_api(code, r#"{"code": "error"}"#).await;
            let err = client(&endpoint).fetch_status(0).await.unwrap_err();

            match &err {
                HeraldError::ApiStatus {
                    status,
                    reason: got,
                    ..
                } => {
                    assert_eq!(*status, code.as_u16());
                    assert_eq!(*got, reason);
                }
                other => panic!("expected ApiStatus, got {other:?}"),
            }
            assert!(!err.is_retriable());
        }
    }

    #[tokio::test]
    async fn test_other_status_embeds_code() {
        let (endpoint, _) = spawn_api(StatusCode::SERVICE_UNAVAILABLE, "busy").await;
        let err = client(&endpoint).fetch_status(0).await.unwrap_err();

        assert!(matches!(err, HeraldError::ApiStatus { status: 503, .. }));
        assert!(err.to_string().contains("503"));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let (endpoint, _) = spawn_api(StatusCode::OK, "<html>maintenance</html>").await;
        let err = client(&endpoint).fetch_status(0).await.unwrap_err();

        assert!(matches!(err, HeraldError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retriable_transport_error() {
        let err = client("http://127.0.0.1:9/statuses/")
            .fetch_status(0)
            .await
            .unwrap_err();

        assert!(matches!(err, HeraldError::Transport { from_date: 0, .. }));
        assert!(err.is_retriable());
        assert!(!err.to_string().contains("api-token"));
    }

    #[tokio::test]
    async fn test_slow_api_hits_timeout() {
        let app = Router::new().route(
            "/statuses/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = StatusClient::new(
            &format!("http://{addr}/statuses/"),
            "api-token",
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client.fetch_status(0).await.unwrap_err();

        match err {
            HeraldError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
