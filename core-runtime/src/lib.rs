//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the Model Card Portal client core:
//! - Logging and tracing infrastructure
//! - Client configuration (API base URL, redirect timing)
//! - Event bus used to broadcast auth state changes
//!
//! Other crates depend on this one for their logging conventions and for the
//! broadcast channel that UI fragments subscribe to.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use events::{AuthEvent, CoreEvent, EventBus};
