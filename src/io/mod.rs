//! External interfaces
//!
//! - `provider` - the `LocationProvider` trait and its event stream type
//! - `sim` - scripted in-process provider for the demo binary and tests

pub mod provider;
pub mod sim;

pub use provider::{LocationProvider, ProviderEvent};
pub use sim::SimulatedProvider;
