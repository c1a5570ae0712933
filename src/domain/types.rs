//! Core value types for single-shot location acquisition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Newtype wrapper for request IDs to provide type safety in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Generate a new time-sortable request ID (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorization scope requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationLevel {
    /// Location only while the application is in the foreground
    WhileInForeground,
    /// Location at any time, including backgrounded
    Always,
}

impl AuthorizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationLevel::WhileInForeground => "while_in_foreground",
            AuthorizationLevel::Always => "always",
        }
    }
}

/// Authorization state reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    WhileInForeground,
    Always,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    /// Whether this status permits starting location updates
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::WhileInForeground | AuthorizationStatus::Always
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "not_determined",
            AuthorizationStatus::WhileInForeground => "while_in_foreground",
            AuthorizationStatus::Always => "always",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Restricted => "restricted",
        }
    }
}

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One location reading delivered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    /// Horizontal accuracy radius in meters (smaller is better)
    pub horizontal_accuracy_m: f64,
    /// When the provider captured this reading
    pub captured_at: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, horizontal_accuracy_m: f64) -> Self {
        Self {
            coordinates: Coordinates { latitude, longitude },
            horizontal_accuracy_m,
            captured_at: Utc::now(),
        }
    }

    /// Elapsed time since capture. Clock skew can put the capture
    /// timestamp in the future; treat that as zero age.
    pub fn age(&self) -> Duration {
        let age_ms = Utc::now()
            .signed_duration_since(self.captured_at)
            .num_milliseconds();
        Duration::from_millis(age_ms.max(0) as u64)
    }
}

/// Classification of raw provider errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Single-reading glitch; acquisition continues
    Transient,
    /// Sensing capability unusable (hardware off, permission revoked mid-flight)
    Capability,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Transient => "transient",
            ProviderErrorKind::Capability => "capability",
        }
    }
}

/// Raw error delivered on the provider event stream
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self { kind: ProviderErrorKind::Transient, message: message.into() }
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self { kind: ProviderErrorKind::Capability, message: message.into() }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Terminal failure reported through the completion callback
#[derive(Debug, Clone, PartialEq)]
pub enum RequestFailure {
    /// The requested authorization level was denied or restricted
    AuthorizationDenied,
    /// Sensing capability disabled or failed at the hardware level
    ProviderUnavailable(ProviderError),
    /// No usable fix within the acquisition window
    Timeout,
    /// A request was already in flight
    Busy,
}

impl RequestFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestFailure::AuthorizationDenied => "authorization_denied",
            RequestFailure::ProviderUnavailable(_) => "provider_unavailable",
            RequestFailure::Timeout => "timeout",
            RequestFailure::Busy => "busy",
        }
    }
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestFailure::AuthorizationDenied => {
                write!(f, "location authorization denied or restricted")
            }
            RequestFailure::ProviderUnavailable(e) => {
                write!(f, "location provider unavailable: {}", e.message)
            }
            RequestFailure::Timeout => write!(f, "no location fix within the acquisition window"),
            RequestFailure::Busy => write!(f, "a location request is already in flight"),
        }
    }
}

impl std::error::Error for RequestFailure {}
