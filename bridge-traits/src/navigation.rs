//! Navigation Abstraction
//!
//! Lets the core move the host to another route without knowing whether the
//! host is a browser tab or a native shell.

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Host navigation trait
///
/// - Web: assigns `window.location.href`
/// - Desktop: records the route so the shell can render it
pub trait Navigator: PlatformSendSync {
    /// Navigate to an application-relative path such as `/` or `/cards`.
    fn navigate(&self, path: &str) -> Result<()>;
}
