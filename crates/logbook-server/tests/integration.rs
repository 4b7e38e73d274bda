//! End-to-end tests against a real listener and a file-backed ledger.

use std::sync::Arc;
use std::time::Duration;

use logbook_ledger::sqlite::{new_file, run_migrations, ConnectionConfig};
use logbook_ledger::LedgerStore;
use logbook_server::metrics::detached_handle;
use logbook_server::{LogbookServer, QueryLimits, ServerConfig};
use reqwest::StatusCode;
use serde_json::{json, Value};

const TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    base: String,
    server: LogbookServer,
    handle: tokio::task::JoinHandle<()>,
    client: reqwest::Client,
    _dir: tempfile::TempDir,
}

async fn boot_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
    let _ = run_migrations(&pool.get().unwrap()).unwrap();

    let server = LogbookServer::new(
        ServerConfig::default(),
        Arc::new(LedgerStore::new(pool)),
        QueryLimits::default(),
        detached_handle(),
    );
    let (addr, handle) = server.listen().await.unwrap();
    TestServer {
        base: format!("http://{addr}"),
        server,
        handle,
        client: reqwest::Client::builder().timeout(TIMEOUT).build().unwrap(),
        _dir: dir,
    }
}

impl TestServer {
    async fn post_set(&self, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}/api/v1/logs", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }
}

fn set(user: &str, exercise: &str, set_number: u32, ts: &str) -> Value {
    json!({
        "user_id": user,
        "exercise_name": exercise,
        "set_number": set_number,
        "weight_used": 60.0,
        "reps_completed": 10,
        "timestamp": ts,
    })
}

#[tokio::test]
async fn log_sets_then_read_latest_session() {
    let ts = boot_server().await;

    for (n, time) in [
        (1, "2025-06-01T08:00:00Z"),
        (2, "2025-06-01T08:04:00Z"),
        (1, "2025-06-02T17:30:00Z"),
        (2, "2025-06-02T17:33:00Z"),
        (3, "2025-06-02T17:37:00Z"),
    ] {
        let (status, _) = ts.post_set(set("alice", "Overhead Press", n, time)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, latest) = ts
        .get("/api/v1/logs/alice/Overhead%20Press/latest-session")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["total_sets"], 3);
    assert_eq!(latest["session_timestamp"], "2025-06-02T17:30:00Z");

    let (_, sessions) = ts.get("/api/v1/logs/alice/Overhead%20Press/sessions").await;
    assert_eq!(sessions["total_sessions"], 2);
    assert_eq!(sessions["sessions"][1]["total_sets"], 2);

    let (_, other_user) = ts
        .get("/api/v1/logs/bob/Overhead%20Press/latest-session")
        .await;
    assert_eq!(other_user["status"], "error");
}

#[tokio::test]
async fn concurrent_http_appends_are_all_durable() {
    let ts = Arc::new(boot_server().await);

    let tasks: Vec<_> = (1..=20u32)
        .map(|n| {
            let ts = Arc::clone(&ts);
            tokio::spawn(async move {
                let (status, body) = ts.post_set(json!({
                    "user_id": "carol",
                    "exercise_name": "Row",
                    "set_number": n,
                    "weight_used": 50.0,
                    "reps_completed": 12,
                }))
                .await;
                assert_eq!(status, StatusCode::CREATED);
                body["log_entry_id"].as_str().unwrap().to_string()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let (_, history) = ts.get("/api/v1/logs/carol/history?exercise_name=Row").await;
    assert_eq!(history["total_entries"], 20);
}

#[tokio::test]
async fn delete_is_refused_over_http() {
    let ts = boot_server().await;
    let (_, created) = ts
        .post_set(set("dave", "Squat", 1, "2025-06-01T08:00:00Z"))
        .await;
    let id = created["log_entry_id"].as_str().unwrap();

    let resp = ts
        .client
        .delete(format!("{}/api/v1/logs/{id}", ts.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let (_, history) = ts.get("/api/v1/logs/dave/history").await;
    assert_eq!(history["total_entries"], 1);
}

#[tokio::test]
async fn health_reports_database() {
    let ts = boot_server().await;
    let (status, health) = ts.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "ok");
}

#[tokio::test]
async fn graceful_shutdown_stops_listener() {
    let TestServer {
        base,
        server,
        handle,
        client,
        _dir,
    } = boot_server().await;

    let drained = server
        .shutdown()
        .graceful_shutdown(vec![handle], TIMEOUT)
        .await;
    assert!(drained);
    assert!(client.get(format!("{base}/health")).send().await.is_err());
}
