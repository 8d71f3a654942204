#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub api: String,
    cargo_home: PathBuf,
    rustup_home: PathBuf,
}

impl TestEnv {
    pub fn new(api: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let orig_home = std::env::var("HOME").unwrap_or_default();
        let cargo_home = PathBuf::from(&orig_home).join(".cargo");
        let rustup_home = PathBuf::from(&orig_home).join(".rustup");

        Self {
            _tmp: tmp,
            home,
            api: api.to_string(),
            cargo_home,
            rustup_home,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("shopfront");
        cmd.env("HOME", &self.home)
            .env("CARGO_HOME", &self.cargo_home)
            .env("RUSTUP_HOME", &self.rustup_home)
            .env("SHOPFRONT_API", &self.api)
            .env("SHOPFRONT_LOG", "off");
        for var in [
            "HTTP_PROXY",
            "HTTPS_PROXY",
            "ALL_PROXY",
            "http_proxy",
            "https_proxy",
            "all_proxy",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Runs a command expected to fail and returns its error envelope.
    pub fn run_json_err(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json error output")
    }

    /// Every persisted session file under the isolated storage root.
    pub fn session_files(&self) -> Vec<PathBuf> {
        stored_files(&self.home, "user.json")
    }

    pub fn cart_files(&self) -> Vec<PathBuf> {
        stored_files(&self.home, "cart.json")
    }
}

fn stored_files(home: &Path, name: &str) -> Vec<PathBuf> {
    let root = home.join(".local/share/shopfront/storage");
    let Ok(entries) = fs::read_dir(&root) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.path().join(name))
        .filter(|p| p.exists())
        .collect()
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub route: String,
    pub query: String,
    pub body: Value,
}

type Routes = HashMap<String, (u16, Value)>;

#[derive(Default)]
struct StubState {
    routes: Mutex<Routes>,
    seen: Mutex<Vec<Recorded>>,
}

/// Canned-JSON backend on an ephemeral local port. Routes are keyed by
/// `"METHOD /path"`; the query string is not part of the key.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubBackend {
    pub fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(canned).with_state(state.clone());

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind listener");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report addr");
                axum::serve(listener, app).await.expect("serve stub");
            });
        });
        let addr = rx.recv().expect("stub backend started");

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn route(&self, key: &str, status: u16, body: Value) -> &Self {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert(key.to_string(), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.seen.lock().expect("seen lock").clone()
    }

    pub fn hits(&self, key: &str) -> usize {
        self.requests().iter().filter(|r| r.route == key).count()
    }
}

async fn canned(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let route = format!("{} {}", method, uri.path());
    state.seen.lock().expect("seen lock").push(Recorded {
        route: route.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    let (status, payload) = state
        .routes
        .lock()
        .expect("routes lock")
        .get(&route)
        .cloned()
        .unwrap_or((404, json!({"detail": "Not Found"})));
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(payload),
    )
}

pub fn customer_login() -> Value {
    json!({
        "message": "Login successful",
        "user": {
            "user_id": 7,
            "user_name": "Ana",
            "email_address": "ana@example.com",
            "phone_number": "5550100",
            "role": 2,
            "password": "$2b$12$hash"
        }
    })
}

pub fn admin_login() -> Value {
    json!({
        "message": "Login successful",
        "user": {
            "user_id": 1,
            "user_name": "Root",
            "email_address": "root@example.com",
            "role": 1
        }
    })
}

/// Backend with a customer login and the catalog routes most flows touch.
pub fn shop_backend() -> StubBackend {
    let stub = StubBackend::start();
    stub.route("POST /login", 200, customer_login())
        .route(
            "GET /products/search",
            404,
            json!({"detail": "No products found"}),
        )
        .route(
            "GET /getAllProductsFlat/",
            200,
            json!([
                {"product_id": "P1", "product_name": "USB cable", "discount_price_usd": "4.99", "average_rating": 4.5},
                {"product_id": "P2", "product_name": "Desk lamp", "discount_price_usd": 19.0}
            ]),
        );
    stub
}
