use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use bookbinder_api::access::Role;

static SERVER: OnceLock<Option<TestServer>> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/bookbinder-api");
        cmd.env("BOOKBINDER_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and friends
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
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
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Spawn (once) and return the shared test server. Returns None, skipping
/// the calling test, when DATABASE_URL is not configured - these tests
/// exercise a live server against a disposable database.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let server = SERVER.get_or_init(|| {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
        Some(TestServer::spawn().expect("failed to spawn server binary"))
    });
    match server {
        Some(server) => {
            server.wait_ready(Duration::from_secs(10)).await?;
            Ok(Some(server))
        }
        None => Ok(None),
    }
}

/// Client with a cookie jar, so the session cookie set by /auth/login rides
/// along on subsequent requests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build http client")
}

/// Unique suffix so fixtures never collide across runs on a reused database
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Seeded account: id plus the credentials to log in through the API
pub struct SeededUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Insert a user row directly. Only login and the operations under test go
/// through the HTTP surface; account provisioning is fixture setup.
pub async fn seed_user(role: Role, suffix: &str) -> Result<SeededUser> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = sqlx::PgPool::connect(&url).await?;

    let username = format!("{}_{}", role.name(), suffix);
    let email = format!("{}@test.invalid", username);
    let password = format!("pw-{}", suffix);
    let password_hash = bookbinder_api::auth::password::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash fixture password: {}", e))?;

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, role_id)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(role as i32)
    .fetch_one(&pool)
    .await?;

    Ok(SeededUser { id, email, password })
}

/// Log in through the API; the session cookie lands in the client's jar.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<serde_json::Value> {
    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login for {} failed with {}",
        email,
        res.status()
    );
    Ok(res.json().await?)
}
