//! `HttpAskClient` against a throwaway backend on a random local port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use mattgpt::api::{AskClient, AskError, HttpAskClient};
use serde_json::{Value, json};

type Seen = Arc<Mutex<Vec<Value>>>;

/// Serve `app` on 127.0.0.1 and return its base URL.
async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_ask_posts_query_and_decodes_answer() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/ask",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(body);
                Json(json!({
                    "answer": "Matt grew the platform org from 12 to 80 engineers.",
                    "sources": [
                        {"id": "cs-1", "title": "Platform Scale-Up", "client": "Acme", "score": 0.91},
                        {"id": "cs-2", "title": "Hiring Loop Redesign", "client": "Globex"}
                    ],
                    "isNonsense": false
                }))
            }),
        )
        .with_state(Arc::clone(&seen));

    let base = spawn_backend(app).await;
    let client = HttpAskClient::new(&base).unwrap();

    let resp = client.ask("How did Matt scale engineering teams?").await.unwrap();

    assert!(resp.answer.starts_with("Matt grew"));
    assert_eq!(resp.sources.len(), 2);
    assert_eq!(resp.sources[0].score, Some(0.91));
    assert_eq!(resp.sources[1].score, None);
    assert!(!resp.is_nonsense);

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.as_slice(), [json!({"query": "How did Matt scale engineering teams?"})]);
}

#[tokio::test]
async fn test_ask_keeps_path_prefix() {
    let app = Router::new().route(
        "/prod/ask",
        post(|| async { Json(json!({"answer": "ok", "sources": [], "isNonsense": true})) }),
    );

    let base = spawn_backend(app).await;
    let client = HttpAskClient::new(format!("{base}/prod/")).unwrap();

    let resp = client.ask("what's for lunch?").await.unwrap();
    assert!(resp.is_nonsense);
}

#[tokio::test]
async fn test_server_error_is_status() {
    let app = Router::new().route(
        "/ask",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );

    let base = spawn_backend(app).await;
    let client = HttpAskClient::new(&base).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskError::Status { status: 500 }), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let app = Router::new().route("/ask", post(|| async { "not json at all" }));

    let base = spawn_backend(app).await;
    let client = HttpAskClient::new(&base).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_answer_is_decode_error() {
    let app = Router::new().route(
        "/ask",
        post(|| async { Json(json!({"sources": []})) }),
    );

    let base = spawn_backend(app).await;
    let client = HttpAskClient::new(&base).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAskClient::new(format!("http://{addr}")).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let app = Router::new().route(
        "/ask",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"answer": "too late"}))
        }),
    );

    let base = spawn_backend(app).await;
    let client = HttpAskClient::with_timeout(&base, Duration::from_millis(100)).unwrap();

    let err = client.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskError::Transport(_)), "got {err:?}");
}
