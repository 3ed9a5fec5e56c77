use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Header carrying the bearer token on protected requests.
pub const AUTH_HEADER: &str = "x-auth-token";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the server binary before integration tests run
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_devlink-api"));
        cmd.env("DEVLINK_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Inherit environment so the server can see DATABASE_URL and
        // JWT_SECRET from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready even when the database is down; those tests skip
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// True when /health reports a reachable database. Tests that need
/// persistence skip themselves when this is false.
pub async fn db_available(server: &TestServer) -> bool {
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
    {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(_) => false,
    }
}

/// Fresh email per call so reruns against a persistent database never
/// collide with earlier registrations.
pub fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    format!("{}+{}@example.com", prefix, nanos)
}

/// Register an account and return its bearer token.
pub async fn register_user(
    server: &TestServer,
    name: &str,
    email: &str,
    password: &str,
) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/users", server.base_url))
        .json(&json!({ "name": name, "email": email, "password": password }))
        .send()
        .await?;

    anyhow::ensure!(
        resp.status() == StatusCode::OK,
        "registration failed with status {}",
        resp.status()
    );

    let body: Value = resp.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("registration response carried no token")
}
