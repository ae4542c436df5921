//! Fake email provider for tests.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;

/// One recorded send: the `Authorization` header and the JSON body.
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub authorization: Option<String>,
    pub body: Value,
}

pub type ProviderCalls = Arc<Mutex<Vec<ProviderCall>>>;

/// Start a provider on an ephemeral port that answers every send with
/// `status` and `reply`. Returns the send URL and the recorded calls.
pub async fn spawn_provider(status: StatusCode, reply: &'static str) -> (String, ProviderCalls) {
    let calls: ProviderCalls = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route(
            "/emails",
            post(
                move |State(calls): State<ProviderCalls>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| async move {
                    let authorization = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    calls.lock().unwrap().push(ProviderCall {
                        authorization,
                        body,
                    });
                    (status, reply)
                },
            ),
        )
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/emails", addr), calls)
}

/// A URL with nothing listening behind it.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/emails", addr)
}
