//! locfix - single-shot location acquisition
//!
//! Coordinates a continuous location-sensing provider to answer one
//! question: where are we right now? One request at a time, one
//! completion callback per request, provider stopped before the
//! callback fires.
//!
//! Module structure:
//! - `domain/` - Core value types (LocationFix, RequestFailure, ...)
//! - `io/` - Provider seam (LocationProvider trait, simulated provider)
//! - `services/` - The acquisition coordinator
//! - `infra/` - Configuration

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
