//! Delayed post-login redirect.
//!
//! After a successful callback the host stays on the success screen for a
//! short delay, then moves to the application root. The redirect runs as a
//! detached task: tokio on native hosts, `spawn_local` with `gloo-timers` in
//! the browser.

use bridge_traits::Navigator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Handle to a scheduled redirect.
///
/// Dropping the handle leaves the redirect scheduled; call
/// [`cancel`](RedirectHandle::cancel) to stop it.
#[derive(Debug, Clone)]
pub struct RedirectHandle {
    cancelled: Arc<AtomicBool>,
    path: String,
    delay: Duration,
}

impl RedirectHandle {
    /// Prevent the redirect if it has not fired yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Navigate to `path` once `delay` has elapsed, unless cancelled first.
pub fn schedule_redirect(
    navigator: Arc<dyn Navigator>,
    path: impl Into<String>,
    delay: Duration,
) -> RedirectHandle {
    let handle = RedirectHandle {
        cancelled: Arc::new(AtomicBool::new(false)),
        path: path.into(),
        delay,
    };

    let cancelled = handle.cancelled.clone();
    let path = handle.path.clone();
    let fire = move || {
        if cancelled.load(Ordering::SeqCst) {
            debug!(%path, "Redirect cancelled");
            return;
        }
        debug!(%path, "Redirecting");
        if let Err(e) = navigator.navigate(&path) {
            error!(%path, error = %e, "Redirect failed");
        }
    };

    spawn_delayed(delay, fire);
    handle
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_delayed<F>(delay: Duration, fire: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                fire();
            });
        }
        Err(_) => {
            // Called outside a runtime, e.g. from a synchronous shell
            std::thread::spawn(move || {
                std::thread::sleep(delay);
                fire();
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn_delayed<F>(delay: Duration, fire: F)
where
    F: FnOnce() + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::sleep(delay).await;
        fire();
    });
}
