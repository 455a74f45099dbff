use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let blob_root = std::env::temp_dir().join(format!("bookshelf-test-{}", port));

        // Spawn the already-built binary to keep start fast during tests.
        // No DATABASE_URL is passed, so the server runs on its in-memory
        // document store with a fresh state per test binary.
        let mut cmd = Command::new("target/debug/bookshelf-api");
        cmd.env("BOOKSHELF_PORT", port.to_string())
            .env("PUBLIC_BASE_URL", &base_url)
            .env("BLOB_ROOT", &blob_root)
            .env("ACCOUNTS_ADMIN_EMAIL", "admin@example.com")
            .env("JWT_SECRET", "bookshelf-test-secret")
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
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
                if resp.status() == StatusCode::OK {
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

/// Obtain a token for (uid, email) from the dev identity provider.
#[allow(dead_code)]
pub async fn login(server: &TestServer, uid: &str, email: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "uid": uid, "email": email }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"]["token"]
        .as_str()
        .context("login response missing token")?
        .to_string())
}

/// Obtain a token carrying the admin claim. Promotion happens during
/// profile creation for the configured admin account, so this logs in,
/// creates the profile if needed, and logs in again to pick up the claim.
#[allow(dead_code)]
pub async fn admin_token(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let token = login(server, "admin-uid", "admin@example.com").await?;

    let res = client
        .post(format!("{}/api/profiles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "username": "the-admin" }))
        .send()
        .await?;
    // CONFLICT means the profile (and the promotion) already happened
    anyhow::ensure!(
        res.status() == StatusCode::CREATED || res.status() == StatusCode::CONFLICT,
        "admin profile creation failed: {}",
        res.status()
    );

    login(server, "admin-uid", "admin@example.com").await
}

/// Error code from a structured error body
#[allow(dead_code)]
pub async fn error_code(res: reqwest::Response) -> Result<String> {
    let body: Value = res.json().await?;
    Ok(body["code"].as_str().unwrap_or_default().to_string())
}
