//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, redirect};
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use recipebook_server::{Server, ServerConfig};
use recipebook_session::{SessionConfig, SessionStore};
use recipebook_store::Database;

/// A test server that runs in the background over an on-disk database.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client with a cookie store; redirects are not followed.
    pub client: Client,
    /// Database shared with the server.
    pub db: Arc<Database>,
    /// Path of the database file.
    pub db_path: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    /// Temporary directory for test data.
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    /// Start a new test server with a fresh database.
    pub async fn start() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("recipebook.db");
        let mut server = Self::start_at(&db_path).await?;
        server._temp_dir = Some(temp_dir);
        Ok(server)
    }

    /// Start a test server over an existing database file.
    pub async fn start_at(db_path: &Path) -> Result<Self> {
        let addr = find_available_port().await?;

        let db = Arc::new(Database::open(db_path)?);
        let sessions = SessionStore::new(SessionConfig::default(), Arc::clone(&db));
        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_rate_limiting(false)
            .with_request_logging(false);

        let (tx, rx) = oneshot::channel::<()>();
        let server = Server::new(Arc::clone(&db), sessions, config);
        let handle = tokio::spawn(async move {
            let _ = server
                .run_on(addr, async {
                    let _ = rx.await;
                })
                .await;
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            db,
            db_path: db_path.to_path_buf(),
            shutdown: Some(tx),
            handle: Some(handle),
            _temp_dir: None,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Register an account.
    pub async fn register(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .form(&[
                ("username", username),
                ("password", password),
                ("fullname", "Test User"),
            ])
            .send()
            .await?)
    }

    /// Log in; the session cookie lands in the client's cookie store.
    pub async fn login(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?)
    }

    /// Register and log in.
    pub async fn sign_in(&self, username: &str) -> Result<()> {
        anyhow::ensure!(self.register(username, "secret").await?.status().is_success());
        anyhow::ensure!(self.login(username, "secret").await?.status().as_u16() == 303);
        Ok(())
    }

    /// Stop the server and wait for it to exit.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            timeout(Duration::from_secs(5), handle).await??;
        }
        Ok(())
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}

/// Percent-encode a query string value.
pub fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}
