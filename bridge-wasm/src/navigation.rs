//! Browser navigation through `window.location`.

use bridge_traits::{error::Result as BridgeResult, Navigator};
use tracing::debug;

use crate::error::{js_error, window};

/// Navigates by assigning `window.location.href`.
///
/// This is a full page load, matching how the portal leaves the callback
/// route.
#[derive(Clone)]
pub struct WindowNavigator {
    window: web_sys::Window,
}

impl WindowNavigator {
    /// Bind to the current window.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self { window: window()? })
    }

    /// Current `location.href`.
    pub fn current_href(&self) -> BridgeResult<String> {
        self.window
            .location()
            .href()
            .map_err(|err| js_error("location.href", err))
    }
}

impl Navigator for WindowNavigator {
    fn navigate(&self, path: &str) -> BridgeResult<()> {
        debug!(path, "Assigning window.location");
        self.window
            .location()
            .set_href(path)
            .map_err(|err| js_error("location.set_href", err))
    }
}
