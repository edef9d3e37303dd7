#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Job runs for one poll, then completes cleanly.
    Succeeds,
    /// Job completes with two failed pipelines.
    FailsPipelines,
    /// Start request is answered with this status.
    RejectsStart(u16),
    /// Job stays `running` forever.
    NeverFinishes,
}

#[derive(Clone)]
struct Backend {
    behavior: Behavior,
    polls: Arc<Mutex<HashMap<String, u32>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn start_all(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    if let Behavior::RejectsStart(code) = backend.behavior {
        let code = StatusCode::from_u16(code).unwrap();
        return (code, Json(json!({"error": "rejected"})));
    }
    let job_id = uuid::Uuid::new_v4().to_string();
    backend.polls.lock().unwrap().insert(job_id.clone(), 0);
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "success",
            "message": "pipeline job started",
            "data": {
                "job_id": job_id,
                "status": "pending",
                "created_at": "2026-10-18T02:00:00Z",
                "pipelines_total": 3
            }
        })),
    )
}

async fn job_status(
    State(backend): State<Backend>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let polls = {
        let mut map = backend.polls.lock().unwrap();
        match map.get_mut(&job_id) {
            Some(n) => {
                *n += 1;
                *n
            }
            None => return (StatusCode::NOT_FOUND, Json(json!({"error": "job not found"}))),
        }
    };

    let (status, completed, failed) = match (backend.behavior, polls) {
        (_, 1) | (Behavior::NeverFinishes, _) => ("running", 1, 0),
        (Behavior::FailsPipelines, _) => ("completed", 1, 2),
        _ => ("completed", 3, 0),
    };
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "",
            "data": {
                "job_id": job_id,
                "status": status,
                "created_at": "2026-10-18T02:00:00Z",
                "pipelines_total": 3,
                "pipelines_completed": completed,
                "pipelines_failed": failed,
                "error": if failed > 0 { Value::from("2 pipelines failed") } else { Value::Null }
            }
        })),
    )
}

pub fn backend_router(behavior: Behavior) -> Router {
    let backend = Backend {
        behavior,
        polls: Arc::new(Mutex::new(HashMap::new())),
    };
    Router::new()
        .route("/v1/internal/pipelines/all", post(start_all))
        .route("/v1/internal/pipelines/jobs/{job_id}", get(job_status))
        .with_state(backend)
}

pub async fn spawn_backend(behavior: Behavior) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend_router(behavior)).await.unwrap();
    });
    addr
}

/// Runs the fake backend on its own runtime thread, for tests that block on a child process.
pub fn spawn_backend_thread(behavior: Behavior) -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, backend_router(behavior)).await.unwrap();
        });
    });
    rx.recv().unwrap()
}
