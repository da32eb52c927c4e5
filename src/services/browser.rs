// SPDX-License-Identifier: MIT

//! Bridges the external browser round-trip into an awaited call.
//!
//! `authenticate` opens the auth URL and suspends until the platform's
//! deep-link dispatcher delivers the redirect to `handle_callback`, the
//! attempt is cancelled, or the timeout elapses. A single pending slot holds
//! the in-flight attempt; concurrent attempts are unsupported and resolve
//! last-writer-wins.

use crate::error::{AppError, Result};
use crate::services::openid::{self, CallbackParams};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// How long to wait for the browser callback by default.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Opens a URL in the system browser. The platform shell provides the real
/// implementation; tests substitute recording fakes.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Single-slot broker between `authenticate` and the deep-link callback.
pub struct BrowserAuthBroker {
    launcher: Arc<dyn BrowserLauncher>,
    pending: Mutex<Option<oneshot::Sender<CallbackParams>>>,
}

impl BrowserAuthBroker {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            pending: Mutex::new(None),
        }
    }

    /// Open `auth_url` and await the callback parameters.
    ///
    /// Exactly one resolution occurs per call: the delivered callback, a
    /// cancellation, or the timeout, which synthesizes
    /// `{openid.mode: "error", openid.error: "timeout"}`. A browser-launch
    /// failure rejects the attempt immediately.
    pub async fn authenticate(
        &self,
        auth_url: &str,
        timeout: Duration,
    ) -> Result<CallbackParams> {
        let (tx, rx) = oneshot::channel();

        // Binding the new sender drops any previous one; a superseded
        // awaiter observes a closed channel below.
        *self.lock_pending()? = Some(tx);

        if let Err(e) = self.launcher.open(auth_url) {
            tracing::warn!(error = %e, "Browser launch failed");
            self.lock_pending()?.take();
            return Err(e);
        }

        tracing::info!(timeout_secs = timeout.as_secs(), "Awaiting browser callback");

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(AppError::SteamApi(
                "authentication attempt superseded".to_string(),
            )),
            Err(_) => {
                tracing::warn!("Authentication timed out waiting for callback");
                self.lock_pending()?.take();
                Ok(CallbackParams::from_pairs([
                    ("openid.mode", "error"),
                    ("openid.error", "timeout"),
                ]))
            }
        }
    }

    /// Deliver the redirect URI from the platform's deep-link dispatcher.
    ///
    /// A missing URI resolves with `{openid.mode: "error"}`, as does an
    /// unparseable one. No-op when no attempt is pending.
    pub fn handle_callback(&self, callback_uri: Option<&str>) {
        let sender = match self.lock_pending().ok().and_then(|mut slot| slot.take()) {
            Some(sender) => sender,
            None => {
                tracing::debug!("Callback delivered with no pending authentication");
                return;
            }
        };

        let params = match callback_uri {
            None => {
                tracing::warn!("Callback URI is absent");
                CallbackParams::from_pairs([("openid.mode", "error")])
            }
            Some(uri) => match openid::parse_callback(uri) {
                Ok(params) => params,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse callback URI");
                    CallbackParams::from_pairs([("openid.mode", "error")])
                }
            },
        };

        // The awaiter may have timed out already; a failed send is fine.
        let _ = sender.send(params);
    }

    /// Cancel the pending attempt, resolving it with `{openid.mode: "cancel"}`.
    /// No-op when idle; an already-open browser tab cannot be closed.
    pub fn cancel(&self) {
        if let Some(sender) = self.lock_pending().ok().and_then(|mut slot| slot.take()) {
            tracing::info!("Authentication cancelled");
            let _ = sender.send(CallbackParams::from_pairs([("openid.mode", "cancel")]));
        }
    }

    fn lock_pending(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Option<oneshot::Sender<CallbackParams>>>> {
        self.pending
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("pending-callback lock poisoned")))
    }
}
