//! Services - the acquisition coordinator
//!
//! - `coordinator` - single-shot request state machine over the provider

pub mod coordinator;

pub use coordinator::{Completion, CoordinatorState, SingleRequestLocationCoordinator};
