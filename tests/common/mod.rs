//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::JoinHandle;
use tempfile::TempDir;

/// Scratch session directory plus a handle for running `ilaunch` against it.
pub struct Session {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Session {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("session");
        Self { _dir: dir, root }
    }

    /// Run `ilaunch` with `--session` pointed at this session.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ilaunch"))
            .args(args)
            .arg("--session")
            .arg(&self.root)
            .env_remove("INTEL_WEBHOOK_URL")
            .env_remove("INTEL_LOG")
            .output()
            .expect("run ilaunch")
    }

    /// Run and require success, returning stdout.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "ilaunch {args:?} failed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Write a config.json tuned for fast tests.
    pub fn write_config(&self, webhook_url: &str, max_retries: usize) {
        self.write_config_with_timeout(webhook_url, max_retries, 5000);
    }

    pub fn write_config_with_timeout(&self, webhook_url: &str, max_retries: usize, timeout_ms: u64) {
        std::fs::create_dir_all(&self.root).expect("create session root");
        let config = serde_json::json!({
            "schema_version": 1,
            "webhook_url": webhook_url,
            "timeout_ms": timeout_ms,
            "max_retries": max_retries,
            "retry_delay_ms": 0,
            "progress_ms": 0,
        });
        std::fs::write(
            self.root.join("config.json"),
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("write config");
    }

    pub fn wizard_state(&self) -> serde_json::Value {
        let stdout = self.run_ok(&["wizard", "show", "--json"]);
        serde_json::from_str(&stdout).expect("parse wizard state")
    }

    pub fn launches(&self) -> Vec<serde_json::Value> {
        read_jsonl(&self.root.join("launches.jsonl"))
    }

    /// Drive the wizard to step 4 with `kind` and the given competitors.
    pub fn walk_to_review(&self, kind: &str, competitors: &[&str]) {
        self.run_ok(&["wizard", "type", kind]);
        self.run_ok(&["wizard", "next"]);
        for id in competitors {
            self.run_ok(&["wizard", "toggle-competitor", id]);
        }
        self.run_ok(&["wizard", "next"]);
        self.run_ok(&["wizard", "next"]);
    }
}

pub fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("parse jsonl line"))
        .collect()
}

/// Listener that completes the TCP handshake but never answers.
/// The webhook stays silent for as long as the listener is alive.
pub fn silent_webhook() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent webhook");
    let addr = listener.local_addr().expect("silent webhook addr");
    (listener, format!("http://{addr}/webhook/silent"))
}

/// URL on a loopback port with nothing listening.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind scratch port");
    let addr = listener.local_addr().expect("scratch port addr");
    drop(listener);
    format!("http://{addr}/webhook/closed")
}

/// One-shot HTTP endpoint answering each connection with the next scripted
/// status and capturing the request bodies.
pub struct MockWebhook {
    pub url: String,
    handle: JoinHandle<Vec<String>>,
}

impl MockWebhook {
    pub fn start(statuses: &[u16]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock webhook");
        let addr = listener.local_addr().expect("mock webhook addr");
        let statuses = statuses.to_vec();
        let handle = std::thread::spawn(move || {
            let mut bodies = Vec::new();
            for status in statuses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                bodies.push(read_request_body(&mut reader));
                let reply = format!("{{\"status\":{status}}}");
                let response = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                    reason(status),
                    reply.len()
                );
                let mut stream = stream;
                stream
                    .write_all(response.as_bytes())
                    .expect("write response");
                stream.flush().ok();
            }
            bodies
        });
        Self {
            url: format!("http://{addr}/webhook/competitive-analysis"),
            handle,
        }
    }

    /// Wait for every scripted request and return their bodies.
    pub fn finish(self) -> Vec<serde_json::Value> {
        self.handle
            .join()
            .expect("mock webhook thread")
            .iter()
            .map(|body| serde_json::from_str(body).expect("parse request body"))
            .collect()
    }
}

fn read_request_body(reader: &mut impl BufRead) -> String {
    let mut content_length = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<usize>().ok();
            } else if name.eq_ignore_ascii_case("transfer-encoding")
                && value.eq_ignore_ascii_case("chunked")
            {
                chunked = true;
            }
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).expect("read chunk size");
            let size = usize::from_str_radix(size_line.trim(), 16).expect("chunk size");
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk).expect("read chunk");
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else if let Some(len) = content_length {
        body.resize(len, 0);
        reader.read_exact(&mut body).expect("read body");
    }
    String::from_utf8(body).expect("utf-8 body")
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
