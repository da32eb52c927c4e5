// SPDX-License-Identifier: MIT

//! Shared test fixtures: a minimal Steam endpoint stub and fake seams.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steam_shelf::db::{CredentialStore, MemoryCredentialStore, MemoryGameStore};
use steam_shelf::error::{AppError, Result};
use steam_shelf::services::{AuthPipeline, BrowserAuthBroker, BrowserLauncher, SteamAuthService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const TEST_RETURN_URL: &str = "steamshelf://auth/callback";
pub const TEST_REALM: &str = "https://my-app";

/// Canned check_auth body confirming the assertion.
#[allow(dead_code)]
pub const CHECK_AUTH_VALID: &str = "ns:http://specs.openid.net/auth/2.0\nis_valid:true\n";
/// Canned check_auth body rejecting the assertion.
#[allow(dead_code)]
pub const CHECK_AUTH_INVALID: &str = "ns:http://specs.openid.net/auth/2.0\nis_valid:false\n";

/// Player-summaries body for the canonical test user.
pub fn player_summaries_body(steam_id: &str, username: &str) -> String {
    format!(
        r#"{{"response":{{"players":[{{"steamid":"{}","personaname":"{}","avatarfull":"https://avatars.example/full.jpg"}}]}}}}"#,
        steam_id, username
    )
}

/// Spawn a one-shot HTTP stub standing in for the Steam servers.
///
/// Answers `check_auth` POSTs with `check_auth_body` and any
/// `GetPlayerSummaries` GET with `summaries_body`. Returns the base URL.
pub async fn spawn_steam_stub(
    check_auth_body: &'static str,
    summaries_body: String,
) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let summaries_body = summaries_body.clone();
            tokio::spawn(async move {
                let request = match read_request(&mut socket).await {
                    Some(request) => request,
                    None => return,
                };

                let body = if request.starts_with("GET") && request.contains("GetPlayerSummaries")
                {
                    summaries_body
                } else {
                    check_auth_body.to_string()
                };

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    base_url
}

/// Spawn a stub that answers every request with HTTP 503. Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_error_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_none() {
                    return;
                }
                let body = "service unavailable";
                let response = format!(
                    "HTTP/1.1 503 Service Unavailable\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    base_url
}

/// Read a full HTTP request (headers plus Content-Length body) as a string.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);

            let total = header_end + 4 + content_length;
            while buf.len() < total {
                let n = socket.read(&mut chunk).await.ok()?;
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return Some(String::from_utf8_lossy(&buf).to_string());
        }
    }

    None
}

/// Launcher that records opens and otherwise does nothing.
#[derive(Default)]
pub struct NoopLauncher {
    #[allow(dead_code)]
    pub opened: Mutex<Vec<String>>,
}

impl BrowserLauncher for NoopLauncher {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Credential store whose `remove` fails for one configured key.
#[allow(dead_code)]
pub struct FailingRemoveStore {
    inner: MemoryCredentialStore,
    failing_key: String,
}

impl FailingRemoveStore {
    #[allow(dead_code)]
    pub fn new(failing_key: &str) -> Self {
        Self {
            inner: MemoryCredentialStore::new(),
            failing_key: failing_key.to_string(),
        }
    }
}

#[async_trait]
impl CredentialStore for FailingRemoveStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if key == self.failing_key {
            return Err(AppError::Storage(format!(
                "secure storage rejected removal of {}",
                key
            )));
        }
        self.inner.remove(key).await
    }
}

/// Everything a pipeline test needs to inspect afterwards.
#[allow(dead_code)]
pub struct TestHarness {
    pub steam: Arc<SteamAuthService>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub games: Arc<MemoryGameStore>,
    pub broker: Arc<BrowserAuthBroker>,
    pub pipeline: AuthPipeline,
}

/// Build a pipeline against the given stub base URL (used for both the
/// OpenID endpoint and the Web API).
#[allow(dead_code)]
pub fn harness(stub_base_url: &str) -> TestHarness {
    harness_with_timeout(stub_base_url, Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn harness_with_timeout(stub_base_url: &str, timeout: Duration) -> TestHarness {
    let steam = Arc::new(SteamAuthService::with_endpoints(
        TEST_REALM.to_string(),
        format!("{}/openid/login", stub_base_url),
        stub_base_url.to_string(),
    ));
    let credentials = Arc::new(MemoryCredentialStore::new());
    let games = Arc::new(MemoryGameStore::new());
    let broker = Arc::new(BrowserAuthBroker::new(Arc::new(NoopLauncher::default())));

    let pipeline = AuthPipeline::new(
        steam.clone(),
        credentials.clone() as Arc<dyn CredentialStore>,
        broker.clone(),
        TEST_RETURN_URL.to_string(),
        timeout,
    );

    TestHarness {
        steam,
        credentials,
        games,
        broker,
        pipeline,
    }
}

/// Harness pointed at a port nothing listens on, for tests that must not
/// reach the network.
#[allow(dead_code)]
pub fn offline_harness() -> TestHarness {
    harness("http://127.0.0.1:9")
}
