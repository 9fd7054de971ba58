//! Shared fixtures for provisioning tests.

use async_trait::async_trait;
use auth_init::Provisioner;
use auth_init::auth::StaticTokenCredential;
use auth_init::config::Config;
use auth_init::env_store::EnvStore;
use httpmock::MockServer;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";

/// Env store double that records every write in order.
#[derive(Default)]
pub struct RecordingEnvStore {
    entries: Mutex<Vec<(String, String)>>,
}

impl RecordingEnvStore {
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnvStore for RecordingEnvStore {
    async fn set(&self, name: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
    }
}

pub fn config_for(base_url: String) -> Config {
    let mut config = Config::default();
    config.graph.base_url = base_url;
    config
}

pub fn graph_url(server: &MockServer) -> String {
    format!("{}/v1.0", server.base_url())
}

pub fn provisioner(config: Config, token: &str) -> (Provisioner, Arc<RecordingEnvStore>) {
    let store = Arc::new(RecordingEnvStore::default());
    let provisioner = Provisioner::new(
        config,
        Arc::new(StaticTokenCredential::new(token)),
        store.clone(),
    )
    .unwrap();
    (provisioner, store)
}

pub fn provisioner_for(server: &MockServer) -> (Provisioner, Arc<RecordingEnvStore>) {
    provisioner(config_for(graph_url(server)), TOKEN)
}
