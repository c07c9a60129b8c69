//! Shared helpers for receiver integration tests.
//!
//! Mirrors the wiring in `main.rs`, but with a stub face processor and a
//! local fake sink that records every insert event it receives.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;

use enrolld_events::{Event, InsertPublisher};
use enrolld_pipeline::testing::StubProcessor;
use enrolld_pipeline::{Dispatcher, WorkerPool};
use enrolld_server::receiver;
use enrolld_server::state::AppState;

/// How the fake sink acknowledges an insert event.
#[derive(Clone, Copy)]
pub enum SinkMode {
    /// Reply with an acknowledgement event.
    Acknowledging,
    /// Reply with HTTP 500.
    Rejecting,
    /// Reply 200 with an empty body: delivered, never acknowledged.
    Silent,
}

/// The app under test plus everything needed to inspect and tear it down.
pub struct TestHarness {
    pub app: Router,
    pub inserts: Arc<Mutex<Vec<Event>>>,
    pool: WorkerPool,
}

impl TestHarness {
    /// Drop the app (releasing its pool handle) before joining the workers.
    pub fn shutdown(self) {
        let TestHarness { app, inserts, pool } = self;
        drop(app);
        drop(inserts);
        pool.shutdown();
    }
}

/// Build the receiver app wired to a stub pool and a fake sink.
pub async fn harness(mode: SinkMode, stub: StubProcessor) -> TestHarness {
    let inserts = Arc::new(Mutex::new(Vec::new()));
    let sink = spawn_sink(mode, Arc::clone(&inserts)).await;

    let pool = WorkerPool::start(2, move |_| Ok(stub.clone())).expect("stub pool starts");
    let state = AppState {
        dispatcher: Dispatcher::new(pool.handle()),
        publisher: Arc::new(InsertPublisher::new(sink)),
    };

    TestHarness {
        app: receiver::router().with_state(state),
        inserts,
        pool,
    }
}

/// Spawn the fake sink on an ephemeral port; returns its URL.
async fn spawn_sink(mode: SinkMode, inserts: Arc<Mutex<Vec<Event>>>) -> String {
    let app = Router::new().route(
        "/",
        post(move |Json(event): Json<Event>| {
            let inserts = Arc::clone(&inserts);
            async move {
                inserts.lock().unwrap().push(event);
                match mode {
                    SinkMode::Acknowledging => Json(Event::new("insert-ack")).into_response(),
                    SinkMode::Rejecting => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                    SinkMode::Silent => StatusCode::OK.into_response(),
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/")
}

/// POST a raw body to the receiver route.
pub async fn post_raw(app: Router, body: Vec<u8>) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
