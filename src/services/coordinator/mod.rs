//! Single-shot location acquisition coordinator
//!
//! Turns a continuous, multi-update, possibly-failing provider stream
//! into one terminal result delivered exactly once: negotiate
//! authorization, start updates, accept the first fix that meets the
//! accuracy and freshness policy, fall back to the best fix seen when
//! the acquisition window closes, stop the provider, fire the
//! completion callback, return to idle.


use crate::domain::types::{
    AuthorizationLevel, AuthorizationStatus, LocationFix, ProviderError, ProviderErrorKind,
    RequestFailure, RequestId,
};
use crate::infra::config::Config;
use crate::io::provider::{LocationProvider, ProviderEvent};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Completion callback, invoked exactly once per accepted request
pub type Completion = Box<dyn FnOnce(Result<LocationFix, RequestFailure>) + Send + 'static>;

/// Phase of the coordinator; drives all transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    AwaitingAuthorization,
    Acquiring,
    Resolving,
}

impl CoordinatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorState::Idle => "idle",
            CoordinatorState::AwaitingAuthorization => "awaiting_authorization",
            CoordinatorState::Acquiring => "acquiring",
            CoordinatorState::Resolving => "resolving",
        }
    }
}

/// The single in-flight request
struct PendingRequest {
    id: RequestId,
    authorization: AuthorizationLevel,
    completion: Completion,
    started_at: Instant,
    /// Best fix seen so far that did not meet immediate acceptance
    best_fix: Option<LocationFix>,
}

static SHARED: OnceLock<Arc<SingleRequestLocationCoordinator>> = OnceLock::new();

/// Coordinates one-shot location requests against a continuous provider.
///
/// At most one request is in flight at a time; a request arriving while
/// another is outstanding fails immediately with [`RequestFailure::Busy`]
/// and does not disturb the in-flight request. Must be used from within
/// a tokio runtime (each accepted request runs on a spawned task).
pub struct SingleRequestLocationCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn LocationProvider>,
    config: Config,
    state: Mutex<CoordinatorState>,
}

impl SingleRequestLocationCoordinator {
    pub fn new(provider: Arc<dyn LocationProvider>, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                state: Mutex::new(CoordinatorState::Idle),
            }),
        }
    }

    /// Process-wide instance, lazily constructed on first call.
    /// Later calls return the existing instance and ignore the arguments.
    pub fn shared_with(provider: Arc<dyn LocationProvider>, config: Config) -> Arc<Self> {
        SHARED
            .get_or_init(|| Arc::new(Self::new(provider, config)))
            .clone()
    }

    /// Process-wide instance if one has been constructed
    pub fn shared() -> Option<Arc<Self>> {
        SHARED.get().cloned()
    }

    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.lock()
    }

    /// Request the current location with the default authorization level
    /// (`WhileInForeground`)
    pub fn request_current_location(&self, completion: Completion) {
        self.request_current_location_with_authorization(
            AuthorizationLevel::WhileInForeground,
            completion,
        );
    }

    /// Request the current location, negotiating the given authorization
    /// level. The completion callback fires exactly once, after the
    /// provider session has been stopped.
    pub fn request_current_location_with_authorization(
        &self,
        authorization: AuthorizationLevel,
        completion: Completion,
    ) {
        let admitted = {
            let mut state = self.inner.state.lock();
            if *state == CoordinatorState::Idle {
                *state = CoordinatorState::AwaitingAuthorization;
                true
            } else {
                false
            }
        };

        if !admitted {
            warn!(
                state = %self.state().as_str(),
                "location_request_rejected_busy"
            );
            completion(Err(RequestFailure::Busy));
            return;
        }

        let pending = PendingRequest {
            id: RequestId::new(),
            authorization,
            completion,
            started_at: Instant::now(),
            best_fix: None,
        };

        info!(
            request_id = %pending.id,
            authorization = %authorization.as_str(),
            "location_request_accepted"
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run_request(pending).await;
        });
    }

    /// Async wrapper over the callback API
    pub async fn current_location(
        &self,
        authorization: AuthorizationLevel,
    ) -> Result<LocationFix, RequestFailure> {
        let (tx, rx) = oneshot::channel();
        self.request_current_location_with_authorization(
            authorization,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await.unwrap_or_else(|_| {
            Err(RequestFailure::ProviderUnavailable(ProviderError::capability(
                "coordinator task dropped before resolution",
            )))
        })
    }
}

impl Inner {
    /// Drive one accepted request to resolution. Sole owner of the
    /// pending request; resolution happens exactly once by construction.
    async fn run_request(self: Arc<Self>, mut pending: PendingRequest) {
        let request_id = pending.id;

        let mut status = self.provider.authorization_status();
        if status == AuthorizationStatus::NotDetermined {
            info!(
                request_id = %request_id,
                level = %pending.authorization.as_str(),
                "authorization_prompt"
            );
            status = self.provider.request_authorization(pending.authorization).await;
        }

        if !status.is_granted() {
            warn!(
                request_id = %request_id,
                status = %status.as_str(),
                "authorization_denied"
            );
            // Provider was never started; nothing to stop
            self.resolve(pending, Err(RequestFailure::AuthorizationDenied), false).await;
            return;
        }

        *self.state.lock() = CoordinatorState::Acquiring;

        let (events_tx, mut events_rx) = mpsc::channel(self.config.event_buffer());
        if let Err(e) = self.provider.start_updates(events_tx).await {
            error!(request_id = %request_id, error = %e, "provider_start_failed");
            let failure =
                RequestFailure::ProviderUnavailable(ProviderError::capability(e.to_string()));
            self.resolve(pending, Err(failure), true).await;
            return;
        }

        debug!(
            request_id = %request_id,
            timeout_ms = %self.config.timeout_ms(),
            "acquisition_started"
        );

        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);

        // The timer and fix delivery race; whichever breaks the loop
        // first is authoritative and the other is never observed.
        let outcome = loop {
            tokio::select! {
                _ = &mut deadline => {
                    break match pending.best_fix.take() {
                        Some(best) => {
                            info!(
                                request_id = %request_id,
                                accuracy_m = %best.horizontal_accuracy_m,
                                "acquisition_timeout_best_effort"
                            );
                            Ok(best)
                        }
                        None => {
                            warn!(request_id = %request_id, "acquisition_timeout_no_fix");
                            Err(RequestFailure::Timeout)
                        }
                    };
                }
                event = events_rx.recv() => match event {
                    Some(ProviderEvent::Fix(fix)) => {
                        if let Some(accepted) = self.evaluate_fix(&mut pending, fix) {
                            break Ok(accepted);
                        }
                    }
                    Some(ProviderEvent::Error(e))
                        if e.kind == ProviderErrorKind::Capability =>
                    {
                        error!(request_id = %request_id, error = %e, "provider_capability_error");
                        break Err(RequestFailure::ProviderUnavailable(e));
                    }
                    Some(ProviderEvent::Error(e)) => {
                        warn!(request_id = %request_id, error = %e, "provider_transient_error");
                    }
                    None => {
                        // Provider closed its stream mid-acquisition
                        break match pending.best_fix.take() {
                            Some(best) => {
                                warn!(
                                    request_id = %request_id,
                                    "provider_stream_closed_best_effort"
                                );
                                Ok(best)
                            }
                            None => {
                                error!(request_id = %request_id, "provider_stream_closed");
                                Err(RequestFailure::ProviderUnavailable(
                                    ProviderError::capability("provider event stream closed"),
                                ))
                            }
                        };
                    }
                }
            }
        };

        self.resolve(pending, outcome, true).await;
    }

    /// Apply the acceptance policy to one delivered fix. Returns the fix
    /// when it resolves the request immediately; otherwise retains it as
    /// best-so-far when it improves on the retained accuracy.
    fn evaluate_fix(&self, pending: &mut PendingRequest, fix: LocationFix) -> Option<LocationFix> {
        let request_id = pending.id;

        // Providers report an invalid reading as a negative accuracy radius
        if fix.horizontal_accuracy_m < 0.0 {
            debug!(
                request_id = %request_id,
                accuracy_m = %fix.horizontal_accuracy_m,
                "fix_invalid_discarded"
            );
            return None;
        }

        let age = fix.age();
        let accurate = fix.horizontal_accuracy_m <= self.config.accuracy_threshold_m();
        let fresh = age <= self.config.staleness_bound();

        if accurate && fresh {
            info!(
                request_id = %request_id,
                accuracy_m = %fix.horizontal_accuracy_m,
                age_ms = %age.as_millis(),
                "fix_accepted"
            );
            return Some(fix);
        }

        let improves = pending
            .best_fix
            .as_ref()
            .map_or(true, |best| fix.horizontal_accuracy_m < best.horizontal_accuracy_m);

        if improves {
            debug!(
                request_id = %request_id,
                accuracy_m = %fix.horizontal_accuracy_m,
                age_ms = %age.as_millis(),
                "best_fix_updated"
            );
            pending.best_fix = Some(fix);
        } else {
            debug!(
                request_id = %request_id,
                accuracy_m = %fix.horizontal_accuracy_m,
                "fix_discarded"
            );
        }
        None
    }

    /// Terminal path for every request: stop the provider session (when
    /// one was started), fire the completion callback once, return to idle.
    async fn resolve(
        &self,
        pending: PendingRequest,
        outcome: Result<LocationFix, RequestFailure>,
        stop_provider: bool,
    ) {
        *self.state.lock() = CoordinatorState::Resolving;

        // Must complete before the callback fires so no fix is
        // observable after completion
        if stop_provider {
            self.provider.stop_updates().await;
        }

        let elapsed_ms = pending.started_at.elapsed().as_millis() as u64;
        match &outcome {
            Ok(fix) => info!(
                request_id = %pending.id,
                accuracy_m = %fix.horizontal_accuracy_m,
                elapsed_ms = %elapsed_ms,
                "location_request_resolved"
            ),
            Err(failure) => warn!(
                request_id = %pending.id,
                failure = %failure.as_str(),
                elapsed_ms = %elapsed_ms,
                "location_request_failed"
            ),
        }

        (pending.completion)(outcome);

        *self.state.lock() = CoordinatorState::Idle;
    }
}
