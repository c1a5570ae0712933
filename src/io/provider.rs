//! Location provider seam
//!
//! The coordinator drives a continuous location provider through this
//! trait: check/request authorization, start updates into an mpsc
//! channel, stop updates when the request resolves. Platform backends
//! (CoreLocation, GeoClue, a GNSS daemon) implement it out of tree; the
//! in-tree [`SimulatedProvider`](crate::io::sim::SimulatedProvider)
//! backs the demo binary and tests.

use crate::domain::types::{AuthorizationLevel, AuthorizationStatus, LocationFix, ProviderError};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Raw event delivered on the provider's update stream
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Fix(LocationFix),
    Error(ProviderError),
}

/// Continuous location-sensing provider
///
/// Contract: after `stop_updates` returns, the provider must not send
/// further events on the channel handed to `start_updates`. Events are
/// delivered in capture order.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current authorization state, without prompting
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Request authorization at the given level. May involve an
    /// arbitrarily delayed user interaction; resolves with the new status.
    async fn request_authorization(&self, level: AuthorizationLevel) -> AuthorizationStatus;

    /// Begin continuous updates, delivering events into `events`.
    /// Fails if the sensing capability cannot be started at all.
    async fn start_updates(&self, events: mpsc::Sender<ProviderEvent>) -> anyhow::Result<()>;

    /// Stop continuous updates. Idempotent.
    async fn stop_updates(&self);
}
