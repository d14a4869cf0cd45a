#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clustermon::core::errors::FetchError;
use clustermon::fetcher::{Fetcher, Request};
use parking_lot::Mutex;

// ──────────────────── CLI runner ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_clustermon") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "clustermon.exe"
    } else {
        "clustermon"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve clustermon binary path for integration test"),
    }
}

/// Run the binary with an isolated activity log, capturing output to a case log.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("clustermon-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let stamp = format!("{}-{}", sanitize(case_name), now_millis());
    let log_path = root.join(format!("{stamp}.log"));
    let activity_path = root.join(format!("{stamp}.jsonl"));
    let bin_path = resolve_bin_path();

    let output = Command::new(&bin_path)
        .args(args)
        .env("CLUSTERMON_JSONL_LOG", &activity_path)
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1")
        .output()
        .expect("execute clustermon command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

// ──────────────────── scripted fetcher ────────────────────

/// Fetcher answering from a script; unscripted requests are `NotFound`.
/// Every call is counted, per request and in total.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<Request, Result<Vec<u8>, FetchError>>,
    calls: Mutex<HashMap<Request, usize>>,
    total: AtomicUsize,
    delay: Option<Duration>,
    down: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, request: Request, body: &str) -> Self {
        self.responses.insert(request, Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn fail(mut self, request: Request, err: FetchError) -> Self {
        self.responses.insert(request, Err(err));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// While down, every request fails as a refused connection.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls(&self, request: &Request) -> usize {
        self.calls.lock().get(request).copied().unwrap_or(0)
    }

    pub fn requested(&self) -> Vec<Request> {
        self.calls.lock().keys().cloned().collect()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(request.clone()).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(FetchError::Transport {
                details: "connection refused".to_string(),
            });
        }
        self.responses
            .get(request)
            .cloned()
            .unwrap_or(Err(FetchError::NotFound))
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}

// ──────────────────── payloads ────────────────────

pub const CLUSTER: &str = r#"{"clusterName":"grid-a","clusterSize":2,"version":"14.1.2.0.0","running":true,"membersDepartureCount":0}"#;

pub const MEMBERS: &str = r#"{"items":[
  {"nodeId":"1","machineName":"host-a","memoryMaxMB":1024,"memoryAvailableMB":512,"storageEnabled":true},
  {"nodeId":"2","machineName":"host-b","memoryMaxMB":1024,"memoryAvailableMB":256,"storageEnabled":false}
]}"#;

pub const SERVICES: &str = r#"{"items":[
  {"nodeId":"1","name":"PartitionedCache","type":"DistributedCache","memberCount":2,"statusHA":"NODE-SAFE"},
  {"nodeId":"2","name":"PartitionedCache","type":"DistributedCache","memberCount":2,"statusHA":"NODE-SAFE"}
]}"#;

pub const CACHES: &str = r#"{"items":[{"name":"orders","size":10}]}"#;

/// A healthy two-member cluster with one partitioned service and one cache.
pub fn healthy_cluster() -> ScriptedFetcher {
    ScriptedFetcher::new()
        .respond(Request::Cluster, CLUSTER)
        .respond(Request::Members, MEMBERS)
        .respond(Request::Storage, r#"{"items":[]}"#)
        .respond(Request::Services, SERVICES)
        .respond(
            Request::Caches {
                service: "PartitionedCache".to_string(),
            },
            CACHES,
        )
        .respond(Request::Health, r#"{"items":[]}"#)
        .respond(Request::Proxies, r#"{"items":[]}"#)
}

/// Write the payloads of [`healthy_cluster`] as fixture files under `dir`.
pub fn write_fixtures(dir: &Path) {
    let files = [
        (Request::Cluster, CLUSTER),
        (Request::Members, MEMBERS),
        (Request::Services, SERVICES),
        (
            Request::Caches {
                service: "PartitionedCache".to_string(),
            },
            CACHES,
        ),
    ];
    for (request, body) in files {
        fs::write(dir.join(request.fixture_name()), body).expect("write fixture");
    }
}
