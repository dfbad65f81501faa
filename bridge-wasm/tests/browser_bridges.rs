#![cfg(target_arch = "wasm32")]
//! Integration tests for the browser bridges.
//!
//! Run with `wasm-pack test --headless --chrome bridge-wasm`.

use bridge_traits::http::{HttpMethod, HttpRequest};
use bridge_traits::{HttpClient, SessionStorage};
use bridge_wasm::{build_wasm_bridges, LocalSessionStorage, WindowNavigator};
use std::time::Duration;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_build_bridges() {
    let bridges = build_wasm_bridges().unwrap();
    bridges.storage().set_item("bridges-test", "1").unwrap();
    assert_eq!(
        bridges.storage().get_item("bridges-test").unwrap().as_deref(),
        Some("1")
    );
    bridges.storage().remove_item("bridges-test").unwrap();
}

#[wasm_bindgen_test]
fn test_storage_is_shared_across_handles() {
    let first = LocalSessionStorage::new().unwrap();
    let second = LocalSessionStorage::new().unwrap();

    first.set_item("isAuthenticated", "true").unwrap();
    assert_eq!(
        second.get_item("isAuthenticated").unwrap().as_deref(),
        Some("true")
    );

    second.remove_items(&["isAuthenticated"]).unwrap();
    assert!(!first.contains_key("isAuthenticated").unwrap());
}

#[wasm_bindgen_test]
fn test_navigator_reads_location() {
    let navigator = WindowNavigator::new().unwrap();
    let href = navigator.current_href().unwrap();
    assert!(href.starts_with("http"));
}

#[wasm_bindgen_test]
async fn test_fetch_unreachable_host_is_error() {
    let bridges = build_wasm_bridges().unwrap();
    let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/unreachable")
        .timeout(Duration::from_secs(5));

    assert!(bridges.http().execute(request).await.is_err());
}
