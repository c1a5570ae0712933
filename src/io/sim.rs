//! Scripted location provider for the demo binary and tests
//!
//! Replays a timed script of fixes and errors after `start_updates`,
//! and records lifecycle calls so tests can assert ordering (e.g. that
//! the provider was stopped before the completion callback fired).

use crate::domain::types::{AuthorizationLevel, AuthorizationStatus, LocationFix, ProviderError};
use crate::io::provider::{LocationProvider, ProviderEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// One scripted event, delivered `after` the stream starts
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    pub after: Duration,
    pub event: ProviderEvent,
}

#[derive(Debug, Default)]
struct CallRecord {
    starts: u32,
    stops: u32,
    authorization_requests: Vec<AuthorizationLevel>,
}

/// In-process provider replaying a scripted event stream
pub struct SimulatedProvider {
    status: Mutex<AuthorizationStatus>,
    /// Status reported after an authorization prompt
    grant: Mutex<AuthorizationStatus>,
    script: Mutex<Vec<ScriptedEvent>>,
    /// Drop the event sender once the script is exhausted instead of
    /// keeping the session open (models a crashing provider)
    end_stream_after_script: Mutex<bool>,
    start_failure: Mutex<Option<String>>,
    calls: Mutex<CallRecord>,
    feeder: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(AuthorizationStatus::NotDetermined),
            grant: Mutex::new(AuthorizationStatus::WhileInForeground),
            script: Mutex::new(Vec::new()),
            end_stream_after_script: Mutex::new(false),
            start_failure: Mutex::new(None),
            calls: Mutex::new(CallRecord::default()),
            feeder: Mutex::new(None),
        }
    }

    /// Set the current authorization status (skips the prompt path)
    pub fn with_status(self, status: AuthorizationStatus) -> Self {
        *self.status.lock() = status;
        self
    }

    /// Set the status reported when authorization is requested
    pub fn with_grant(self, grant: AuthorizationStatus) -> Self {
        *self.grant.lock() = grant;
        self
    }

    /// Append a fix delivered `after_ms` after updates start
    pub fn with_fix(self, after_ms: u64, fix: LocationFix) -> Self {
        self.script.lock().push(ScriptedEvent {
            after: Duration::from_millis(after_ms),
            event: ProviderEvent::Fix(fix),
        });
        self
    }

    /// Append an error delivered `after_ms` after updates start
    pub fn with_error(self, after_ms: u64, error: ProviderError) -> Self {
        self.script.lock().push(ScriptedEvent {
            after: Duration::from_millis(after_ms),
            event: ProviderEvent::Error(error),
        });
        self
    }

    /// Close the event stream once the script is exhausted
    pub fn with_stream_end(self) -> Self {
        *self.end_stream_after_script.lock() = true;
        self
    }

    /// Make the next `start_updates` fail outright
    pub fn with_start_failure(self, message: impl Into<String>) -> Self {
        *self.start_failure.lock() = Some(message.into());
        self
    }

    /// Replace the script (for reuse across sequential requests)
    pub fn set_script(&self, events: Vec<ScriptedEvent>) {
        *self.script.lock() = events;
    }

    pub fn start_count(&self) -> u32 {
        self.calls.lock().starts
    }

    pub fn stop_count(&self) -> u32 {
        self.calls.lock().stops
    }

    pub fn was_started(&self) -> bool {
        self.start_count() > 0
    }

    pub fn was_stopped(&self) -> bool {
        self.stop_count() > 0
    }

    pub fn authorization_requests(&self) -> Vec<AuthorizationLevel> {
        self.calls.lock().authorization_requests.clone()
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for SimulatedProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    async fn request_authorization(&self, level: AuthorizationLevel) -> AuthorizationStatus {
        self.calls.lock().authorization_requests.push(level);
        let granted = *self.grant.lock();
        *self.status.lock() = granted;
        debug!(
            level = %level.as_str(),
            status = %granted.as_str(),
            "sim_authorization_resolved"
        );
        granted
    }

    async fn start_updates(&self, events: mpsc::Sender<ProviderEvent>) -> anyhow::Result<()> {
        self.calls.lock().starts += 1;

        if let Some(message) = self.start_failure.lock().take() {
            anyhow::bail!("{message}");
        }

        let script = std::mem::take(&mut *self.script.lock());
        let end_stream = *self.end_stream_after_script.lock();
        let handle = tokio::spawn(async move {
            let mut elapsed = Duration::ZERO;
            for scripted in script {
                if scripted.after > elapsed {
                    tokio::time::sleep(scripted.after - elapsed).await;
                    elapsed = scripted.after;
                }
                if events.send(scripted.event).await.is_err() {
                    // Receiver dropped, request already resolved
                    return;
                }
            }
            if !end_stream {
                // A real provider keeps the session open after these
                // readings; hold the sender until stop aborts us
                std::future::pending::<()>().await;
            }
            drop(events);
        });
        *self.feeder.lock() = Some(handle);
        Ok(())
    }

    async fn stop_updates(&self) {
        self.calls.lock().stops += 1;
        if let Some(handle) = self.feeder.lock().take() {
            handle.abort();
        }
    }
}
