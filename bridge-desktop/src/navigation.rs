//! Navigation for native shells.

use bridge_traits::{
    error::{BridgeError, Result},
    Navigator,
};
use std::sync::Mutex;
use tracing::info;

/// Records every route change so the shell can render the current route.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent route, if any navigation happened.
    pub fn current(&self) -> Option<String> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
    }

    /// All routes visited, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) -> Result<()> {
        if !path.starts_with('/') {
            return Err(BridgeError::OperationFailed(format!(
                "Navigation path must be absolute: {}",
                path
            )));
        }

        info!(path, "Navigating");
        self.history
            .lock()
            .map_err(|_| BridgeError::OperationFailed("Navigation history poisoned".to_string()))?
            .push(path.to_string());
        Ok(())
    }
}
