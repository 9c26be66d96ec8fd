//! Jobboard RPC Server: JSON-RPC over stdin/stdout for a UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"view.load", "params":{"view":"jobs"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr so stdout carries protocol lines only.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use jobboard::app::{App, Transports};
use jobboard::platform;
use jobboard::rpc_handler::handle_method;
use jobboard::services::preference_store::SqlitePreferenceStore;
use jobboard::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Requests accepted per one-second window.
const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed-window rate limiter over all methods.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(line: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        error!("stdout closed");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobboard=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_app() -> Result<App, String> {
    let mut engine = SettingsEngine::new(std::env::var("JOBBOARD_CONFIG").ok());
    if let Err(e) = engine.load() {
        warn!(error = %e, path = engine.get_config_path(), "using default settings");
    }
    let settings = engine.effective_settings();

    let db_path = settings
        .storage
        .preferences_db
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| platform::get_data_dir().join("preferences.db"));
    let store = SqlitePreferenceStore::open(&db_path).map_err(|e| e.to_string())?;
    info!(path = %db_path.display(), "preference store opened");

    let transports = Transports::http(&settings.api).map_err(|e| e.to_string())?;
    let mut app = App::new(settings, transports, Arc::new(store))
        .map_err(|e| e.to_string())?
        .with_settings_engine(engine);
    app.startup().map_err(|e| e.to_string())?;
    Ok(app)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let app = match build_app() {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize");
            emit(&json!({"event": "fatal", "error": e}));
            std::process::exit(1);
        }
    };

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or_else(|| json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
    }

    info!("stdin closed, shutting down");
}
