//! Shared helpers: a throwaway scoring service and a sandboxed `walletrisk` command.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

pub const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

pub const HIGH_RISK_BODY: &str = r#"{
  "risk_score": 85,
  "risk_level": 92,
  "timestamp": "",
  "features": {
    "total_transactions": 1543,
    "average_fee": 0.0001234567,
    "label": "exchange",
    "burst_ratio": 3.5
  }
}"#;

/// Mock scoring service answering every request with the same status and body.
/// Request bodies are recorded in arrival order.
pub struct MockService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    _rt: Runtime,
}

impl MockService {
    pub fn start(status: u16, body: &str) -> Self {
        let rt = Runtime::new().expect("tokio runtime");
        let listener = rt
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock service");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        let body = body.to_string();
        rt.spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let seen = seen.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    let request = read_request_body(&mut socket).await;
                    seen.lock().expect("lock requests").push(request);
                    let response = format!(
                        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        reason(status),
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            addr,
            requests,
            _rt: rt,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/predict-wallet-risk", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock requests").clone()
    }
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(header_end + content_length);
    String::from_utf8_lossy(&buf[header_end..end]).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// An endpoint nothing listens on.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/predict-wallet-risk")
}

pub fn walletrisk_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_walletrisk"));
    cmd.env("HOME", home);
    cmd.env_remove("WALLETRISK_CONFIG");
    cmd.env_remove("WALLETRISK_SERVICE_ENDPOINT");
    cmd.env_remove("WALLETRISK_SERVICE_TIMEOUT_SECS");
    cmd.env_remove("WALLETRISK_SERVICE_MIN_LATENCY_MS");
    cmd.env_remove("WALLETRISK_UI_COLOR");
    cmd.env_remove("WALLETRISK_UI_MAX_TABLE_ROWS");
    cmd.env_remove("WALLETRISK_LOG");
    cmd
}

pub fn run(home: &Path, args: &[&str]) -> Output {
    walletrisk_cmd(home).args(args).output().expect("run walletrisk")
}

pub fn run_against(home: &Path, endpoint: &str, args: &[&str]) -> Output {
    walletrisk_cmd(home)
        .env("WALLETRISK_SERVICE_ENDPOINT", endpoint)
        .args(args)
        .output()
        .expect("run walletrisk")
}

pub fn make_temp_home(tag: &str) -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!(
        "walletrisk-{tag}-test-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}
