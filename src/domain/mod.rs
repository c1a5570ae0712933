//! Domain models - core value types for location acquisition
//!
//! This module contains the canonical data types used throughout the crate:
//! - `LocationFix` - one sensor reading (coordinates, accuracy, capture time)
//! - `AuthorizationLevel` / `AuthorizationStatus` - permission scope and state
//! - `ProviderError` - raw errors from the sensing provider
//! - `RequestFailure` - terminal failures surfaced to the caller
//! - `RequestId` - per-request correlation id for log events

pub mod types;

pub use types::{
    AuthorizationLevel, AuthorizationStatus, Coordinates, LocationFix, ProviderError,
    ProviderErrorKind, RequestFailure, RequestId,
};
