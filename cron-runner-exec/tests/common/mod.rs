#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cron_runner_exec::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use tokio::time::Instant;

pub type Scripted = Result<HttpResponseParts, HttpError>;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub at: Instant,
}

/// Replays scripted responses per method. The last entry of a queue repeats forever.
#[derive(Default)]
pub struct ScriptedHttp {
    posts: Mutex<VecDeque<Scripted>>,
    gets: Mutex<VecDeque<Scripted>>,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_post(self, r: Scripted) -> Self {
        self.posts.lock().unwrap().push_back(r);
        self
    }

    pub fn on_get(self, r: Scripted) -> Self {
        self.gets.lock().unwrap().push_back(r);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn times(&self, method: &str) -> Vec<Instant> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.at)
            .collect()
    }
}

fn next(queue: &Mutex<VecDeque<Scripted>>) -> Scripted {
    let mut q = queue.lock().unwrap();
    if q.len() > 1 {
        q.pop_front().unwrap()
    } else {
        q.front()
            .cloned()
            .unwrap_or_else(|| Err(HttpError::Other("nothing scripted".to_string())))
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
    ) -> Result<HttpResponseParts, HttpError> {
        self.log.lock().unwrap().push(Recorded {
            method: req.method.clone(),
            url: req.url.to_string(),
            headers: req.headers.clone(),
            at: Instant::now(),
        });
        match req.method.as_str() {
            "POST" => next(&self.posts),
            _ => next(&self.gets),
        }
    }
}

pub fn status(code: u16) -> Scripted {
    Ok(HttpResponseParts {
        status: code,
        headers: BTreeMap::new(),
        body: Vec::new(),
    })
}

pub fn json(code: u16, body: serde_json::Value) -> Scripted {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    Ok(HttpResponseParts {
        status: code,
        headers,
        body: serde_json::to_vec(&body).unwrap(),
    })
}

pub fn with_header(code: u16, name: &str, value: &str) -> Scripted {
    let mut headers = BTreeMap::new();
    headers.insert(name.to_string(), value.to_string());
    Ok(HttpResponseParts {
        status: code,
        headers,
        body: Vec::new(),
    })
}

pub fn job_created(job_id: &str) -> Scripted {
    json(
        202,
        serde_json::json!({
            "status": "success",
            "message": "pipeline job started",
            "data": {
                "job_id": job_id,
                "status": "pending",
                "created_at": "2026-10-18T02:00:00Z",
                "pipelines_total": 3
            }
        }),
    )
}

pub fn job_status(job_id: &str, state: &str, completed: u32, failed: u32) -> Scripted {
    json(
        200,
        serde_json::json!({
            "status": "success",
            "message": "",
            "data": {
                "job_id": job_id,
                "status": state,
                "created_at": "2026-10-18T02:00:00Z",
                "pipelines_total": 3,
                "pipelines_completed": completed,
                "pipelines_failed": failed,
                "current_pipeline": "orders",
                "results": {
                    "orders": {
                        "pipeline_name": "orders",
                        "status": if failed > 0 { "failed" } else { "completed" },
                        "message": "",
                        "error": if failed > 0 { serde_json::Value::from("boom") } else { serde_json::Value::Null }
                    }
                }
            }
        }),
    )
}
