#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::{Navigator, SessionStorage};
use bytes::Bytes;
use core_auth::SessionStore;
use core_runtime::config::ClientConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mock! {
    pub HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    rejected_key: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Make every later write to `key` fail as a full quota would.
    pub fn reject_writes_to(&self, key: &str) {
        *self.rejected_key.lock().unwrap() = Some(key.to_string());
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        if self.rejected_key.lock().unwrap().as_deref() == Some(key) {
            return Err(BridgeError::Storage(format!("quota exceeded writing '{}'", key)));
        }
        self.put(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) -> BridgeResult<()> {
        self.visited.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::builder()
        .api_base_url("https://api.example.com")
        .build()
        .unwrap()
}

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub bus: EventBus,
    pub store: SessionStore,
    pub events: Receiver<CoreEvent>,
}

impl Harness {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::default());
        let bus = EventBus::new(16);
        let events = bus.subscribe();
        Self {
            store: SessionStore::new(storage.clone(), bus.clone()),
            storage,
            navigator: Arc::new(RecordingNavigator::default()),
            bus,
            events,
        }
    }

    /// Every event published so far.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}
